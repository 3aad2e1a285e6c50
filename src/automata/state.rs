//! DFA states and their items.

use smallvec::SmallVec;

use super::{ActionIndex, LeafIndex, StateIndex};

/// An item: a canonically ordered set of regex leaf positions. Two states
/// are the same state exactly when their items are equal, and the
/// lexicographic order over items is the canonical state order used for
/// index assignment.
pub type Item = Vec<LeafIndex>;

/// A deterministic transition on the half-open character range
/// `[begin, end)`. Targets are dense state indices, valid for the owning
/// generator's lifetime; the state graph they form may contain cycles.
///
/// Action transitions carry the invalid sentinel bounds and an action
/// index instead of a character range: the scanner fires the action (which
/// consumes input on its own) and continues in the target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub begin: i32,
    pub end: i32,
    pub target: StateIndex,
    pub action: Option<ActionIndex>,
}

impl Transition {
    /// Whether `character` falls inside this transition's range. Always
    /// false for action transitions — their sentinel range is empty.
    pub fn matches(&self, character: i32) -> bool {
        self.begin <= character && character < self.end
    }

    pub fn is_action(&self) -> bool {
        self.action.is_some()
    }
}

/// One generated DFA state.
///
/// `S` is the caller's opaque symbol type; accepting states hold a clone of
/// the winning token's symbol handle. Most states have a handful of
/// outgoing ranges, so transitions are stored inline.
#[derive(Debug, Clone)]
pub struct LexerState<S> {
    /// The position set this state was interned under.
    pub item: Item,
    /// Outgoing transitions: sorted, pairwise disjoint half-open character
    /// ranges, followed by any action transitions.
    pub transitions: SmallVec<[Transition; 4]>,
    /// The accept symbol, if any end marker is present in the item.
    pub symbol: Option<S>,
    /// Dense index, assigned once after both automata are built.
    pub index: StateIndex,
    /// Set once the subset-construction loop has expanded this state.
    pub processed: bool,
    /// Whether accept-symbol assignment raised a conflict diagnostic here.
    pub conflicted: bool,
}

impl<S> LexerState<S> {
    /// Look up the target state for `character`, if any. At most one
    /// transition can match.
    pub fn transition_on(&self, character: i32) -> Option<StateIndex> {
        self.transitions
            .iter()
            .find(|transition| transition.matches(character))
            .map(|transition| transition.target)
    }

    /// Whether this state accepts.
    pub fn is_accepting(&self) -> bool {
        self.symbol.is_some()
    }
}
