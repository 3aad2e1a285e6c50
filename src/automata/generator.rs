//! Subset construction over position-set items.
//!
//! The generator runs the position method twice — once over the ordinary
//! token definitions and once over the whitespace definitions — producing
//! two disjoint state sets that share one action table. Each run:
//!
//! 1. parses its tokens into a combined syntax tree ([`RegexParser`]);
//! 2. seeds the start state with `firstpos(root)`;
//! 3. for each unprocessed state, refines the outgoing character ranges
//!    with a [`RangeSet`] and computes `goto` per refined span — the union
//!    of `followpos` over every position whose range covers the span;
//! 4. interns each non-empty goto item in a canonical map keyed by the
//!    item itself, so two states never share an item;
//! 5. assigns the accept symbol of every new state, resolving competing
//!    end markers by token priority.
//!
//! Termination is guaranteed: items are subsets of a finite leaf universe.
//! Dense state indices are assigned once after both runs, token states
//! first, in the canonical (item-lexicographic) order — making the indices
//! a pure function of the token inputs.
//!
//! A run whose tokens fail to parse is refused: its state set stays empty
//! and its start state is `None`, while the other run is unaffected.

use std::collections::{BTreeMap, BTreeSet};

use super::actions::{ActionTable, LexerAction};
use super::ranges::RangeSet;
use super::regex::RegexParser;
use super::state::{Item, LexerState, Transition};
use super::tree::RegexTree;
use super::{ActionIndex, StateIndex, INVALID_BEGIN_CHARACTER, INVALID_END_CHARACTER};
use crate::error::{ErrorSink, LexerError};
use crate::token::{Token, TokenType};

/// Generates the token and whitespace automata for a set of token
/// definitions.
///
/// `S` is the caller's opaque symbol type; accepting states carry a clone
/// of the winning token's symbol handle.
pub struct LexerGenerator<S> {
    actions: ActionTable,
    states: Vec<LexerState<S>>,
    whitespace_states: Vec<LexerState<S>>,
    start_state: Option<StateIndex>,
    whitespace_start_state: Option<StateIndex>,
}

impl<S: Clone> LexerGenerator<S> {
    /// Generate both automata. Diagnostics are reported to `sink`; a `None`
    /// sink suppresses them. This never fails: malformed regexes leave the
    /// affected automaton empty.
    pub fn new(
        tokens: &[Token<S>],
        whitespace_tokens: &[Token<S>],
        mut sink: Option<&mut dyn ErrorSink>,
    ) -> Self {
        let mut actions = ActionTable::new();
        let token_run = construct_run(tokens, &mut actions, &mut sink);
        let whitespace_run = construct_run(whitespace_tokens, &mut actions, &mut sink);

        let (states, start_state) = finish_run(token_run, tokens, 0);
        let base = states.len() as StateIndex;
        let (whitespace_states, whitespace_start_state) =
            finish_run(whitespace_run, whitespace_tokens, base);

        LexerGenerator {
            actions,
            states,
            whitespace_states,
            start_state,
            whitespace_start_state,
        }
    }

    /// Generate an automaton recognizing a single token.
    pub fn from_token(token: &Token<S>, sink: Option<&mut dyn ErrorSink>) -> Self {
        LexerGenerator::new(std::slice::from_ref(token), &[], sink)
    }

    /// The interned lexer actions, in insertion order.
    pub fn actions(&self) -> &[LexerAction] {
        self.actions.actions()
    }

    /// The token automaton's states, in canonical order. `states()[i]` has
    /// index `i`.
    pub fn states(&self) -> &[LexerState<S>] {
        &self.states
    }

    /// The whitespace automaton's states, in canonical order, indexed
    /// contiguously after the token states.
    pub fn whitespace_states(&self) -> &[LexerState<S>] {
        &self.whitespace_states
    }

    /// The token automaton's start state, or `None` if the token list was
    /// empty or failed to parse.
    pub fn start_state(&self) -> Option<StateIndex> {
        self.start_state
    }

    /// The whitespace automaton's start state, or `None` if the whitespace
    /// list was empty or failed to parse.
    pub fn whitespace_start_state(&self) -> Option<StateIndex> {
        self.whitespace_start_state
    }

    /// Look up any state — token or whitespace — by its dense index.
    pub fn state(&self, index: StateIndex) -> Option<&LexerState<S>> {
        let index = index as usize;
        if index < self.states.len() {
            self.states.get(index)
        } else {
            self.whitespace_states.get(index - self.states.len())
        }
    }
}

/// A state under construction: transitions still target arena positions
/// and the accept token is still an index into the run's token slice.
struct BuildState {
    item: Item,
    transitions: Vec<(i32, i32, usize, Option<ActionIndex>)>,
    accept: Option<u32>,
    conflicted: bool,
    processed: bool,
}

/// One run's worth of interned states. The canonical map is ordered by
/// item, which fixes the iteration order used for index assignment.
struct RunStates {
    arena: Vec<BuildState>,
    canonical: BTreeMap<Item, usize>,
    start: Option<usize>,
}

/// Reborrow `sink` for a lifetime tied only to this call, not to the full
/// remaining lifetime of `sink` itself — `Option::as_deref_mut` ties its
/// result to the invariant inner reference's lifetime, which prevents the
/// borrow checker from seeing that repeated reborrows here don't overlap.
fn reborrow_sink<'a>(
    sink: &'a mut Option<&mut dyn ErrorSink>,
) -> Option<&'a mut dyn ErrorSink> {
    match sink {
        Some(sink) => Some(&mut **sink),
        None => None,
    }
}

fn construct_run<S>(
    tokens: &[Token<S>],
    actions: &mut ActionTable,
    sink: &mut Option<&mut dyn ErrorSink>,
) -> RunStates {
    let mut run = RunStates {
        arena: Vec::new(),
        canonical: BTreeMap::new(),
        start: None,
    };

    let parser = RegexParser::new(tokens, actions, reborrow_sink(sink));
    if parser.is_empty() || parser.errors() > 0 {
        return run;
    }
    let tree = parser.into_tree();

    let mut ranges = RangeSet::new();
    let mut conflicts: BTreeSet<(u32, u32)> = BTreeSet::new();
    let mut worklist: Vec<usize> = Vec::new();

    let start_item: Item = tree.first_positions().to_vec();
    let mut reborrow = reborrow_sink(sink);
    let start = intern(
        &mut run,
        &tree,
        tokens,
        &mut conflicts,
        &mut reborrow,
        start_item,
        &mut worklist,
    );
    run.start = Some(start);

    while let Some(current) = worklist.pop() {
        run.arena[current].processed = true;
        let item = run.arena[current].item.clone();

        // Refine the distinct character ranges this state can leave on.
        ranges.clear();
        for &position in &item {
            let leaf = tree.leaf(position);
            if !leaf.is_marker() {
                ranges.insert(leaf.begin, leaf.end);
            }
        }

        // One goto per refined span; equal items intern to one state.
        for (begin, end) in ranges.spans() {
            let goto = goto_item(&tree, &item, begin, end);
            if goto.is_empty() {
                continue;
            }
            let mut reborrow = reborrow_sink(sink);
            let target = intern(
                &mut run,
                &tree,
                tokens,
                &mut conflicts,
                &mut reborrow,
                goto,
                &mut worklist,
            );
            run.arena[current]
                .transitions
                .push((begin, end, target, None));
        }

        // Action positions produce action-labelled transitions on the
        // sentinel range: the scanner fires the action, which consumes
        // input on its own, then continues in the target state.
        let mut action_gotos: BTreeMap<ActionIndex, Item> = BTreeMap::new();
        for &position in &item {
            let leaf = tree.leaf(position);
            if let Some(action) = leaf.action {
                action_gotos
                    .entry(action)
                    .or_default()
                    .extend_from_slice(tree.followpos(position));
            }
        }
        for (action, mut goto) in action_gotos {
            goto.sort_unstable();
            goto.dedup();
            if goto.is_empty() {
                continue;
            }
            let mut reborrow = reborrow_sink(sink);
            let target = intern(
                &mut run,
                &tree,
                tokens,
                &mut conflicts,
                &mut reborrow,
                goto,
                &mut worklist,
            );
            run.arena[current].transitions.push((
                INVALID_BEGIN_CHARACTER,
                INVALID_END_CHARACTER,
                target,
                Some(action),
            ));
        }
    }

    if let Some(sink) = reborrow_sink(sink) {
        sink.lexer_message(&format!(
            "lexer: generated {} states from {} token definitions",
            run.arena.len(),
            tokens.len()
        ));
    }

    run
}

/// Return the interned state for `item`, creating it (and computing its
/// accept symbol) if no canonically equal state exists yet.
fn intern<S>(
    run: &mut RunStates,
    tree: &RegexTree,
    tokens: &[Token<S>],
    conflicts: &mut BTreeSet<(u32, u32)>,
    sink: &mut Option<&mut dyn ErrorSink>,
    item: Item,
    worklist: &mut Vec<usize>,
) -> usize {
    if let Some(&existing) = run.canonical.get(&item) {
        return existing;
    }
    let (accept, conflicted) = resolve_accept(&item, tree, tokens, conflicts, sink);
    let id = run.arena.len();
    run.arena.push(BuildState {
        item: item.clone(),
        transitions: Vec::new(),
        accept,
        conflicted,
        processed: false,
    });
    run.canonical.insert(item, id);
    worklist.push(id);
    id
}

/// The item reached from `item` on any character in `[begin, end)`: the
/// union of `followpos` over every position whose range covers the span.
/// The span comes from the refined partition, so a position's range either
/// covers it entirely or misses it entirely.
fn goto_item(tree: &RegexTree, item: &Item, begin: i32, end: i32) -> Item {
    debug_assert!(begin != INVALID_BEGIN_CHARACTER && begin != INVALID_END_CHARACTER);
    debug_assert!(begin < end);

    let mut goto = Vec::new();
    for &position in item {
        let leaf = tree.leaf(position);
        if leaf.is_marker() {
            continue;
        }
        if leaf.begin <= begin && end <= leaf.end {
            goto.extend_from_slice(tree.followpos(position));
        }
    }
    goto.sort_unstable();
    goto.dedup();
    goto
}

/// Pick the accept symbol for a state from the end markers in its item.
///
/// Higher token type wins; on equal type the lower declaration line wins;
/// on equal type and line the first-seen token stays and a conflict is
/// reported — once per token pair, not once per state.
fn resolve_accept<S>(
    item: &Item,
    tree: &RegexTree,
    tokens: &[Token<S>],
    conflicts: &mut BTreeSet<(u32, u32)>,
    sink: &mut Option<&mut dyn ErrorSink>,
) -> (Option<u32>, bool) {
    let mut line = i32::MAX;
    let mut token_type = TokenType::Null;
    let mut accept: Option<u32> = None;
    let mut conflicted = false;

    for &position in item {
        let leaf = tree.leaf(position);
        if !leaf.is_end() {
            continue;
        }
        let index = leaf.token.expect("end marker carries its token");
        let token = &tokens[index as usize];

        if token.token_type() > token_type {
            line = token.line();
            token_type = token.token_type();
            accept = Some(index);
        } else if token.token_type() == token_type && token.line() < line {
            line = token.line();
            accept = Some(index);
        } else if token.token_type() == token_type && token.line() == line {
            if let Some(current) = accept {
                conflicted = true;
                let pair = (current.min(index), current.max(index));
                if conflicts.insert(pair) {
                    if let Some(sink) = sink.as_deref_mut() {
                        sink.lexer_error(
                            token.line(),
                            &LexerError::SymbolConflict {
                                first: tokens[current as usize].identifier().to_string(),
                                second: token.identifier().to_string(),
                            },
                        );
                    }
                }
            }
        }
    }

    (accept, conflicted)
}

/// Rewrite one run's arena into canonically ordered states with dense
/// indices starting at `base`, and resolve accept tokens to their symbols.
fn finish_run<S: Clone>(
    run: RunStates,
    tokens: &[Token<S>],
    base: StateIndex,
) -> (Vec<LexerState<S>>, Option<StateIndex>) {
    let mut dense: Vec<StateIndex> = vec![0; run.arena.len()];
    for (position, &arena_id) in run.canonical.values().enumerate() {
        dense[arena_id] = base + position as StateIndex;
    }

    let mut arena: Vec<Option<BuildState>> = run.arena.into_iter().map(Some).collect();
    let mut states = Vec::with_capacity(arena.len());
    for (_, arena_id) in run.canonical {
        let built = arena[arena_id]
            .take()
            .expect("every interned state appears once in canonical order");
        states.push(LexerState {
            item: built.item,
            transitions: built
                .transitions
                .iter()
                .map(|&(begin, end, target, action)| Transition {
                    begin,
                    end,
                    target: dense[target],
                    action,
                })
                .collect(),
            symbol: built
                .accept
                .map(|index| tokens[index as usize].symbol().clone()),
            index: dense[arena_id],
            processed: built.processed,
            conflicted: built.conflicted,
        });
    }

    let start = run.start.map(|id| dense[id]);
    (states, start)
}
