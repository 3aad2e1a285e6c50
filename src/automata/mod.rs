//! Automata infrastructure for lexer generation.
//!
//! Provides the position-set DFA construction pipeline:
//! `Tokens -> RegexParser -> syntax tree -> subset construction -> states`

pub mod actions;
pub mod generator;
pub mod ranges;
pub mod regex;
pub mod state;
pub mod tree;

/// Identifier for a regex leaf position. Dense, assigned in parse order,
/// scoped to one parser run (the token and whitespace automata each get
/// their own leaf space).
pub type LeafIndex = u32;

/// Identifier for a generated DFA state. Dense and contiguous over the
/// union of token states and whitespace states, token states first.
pub type StateIndex = u32;

/// Identifier for an interned lexer action.
pub type ActionIndex = u32;

/// First character of the transition alphabet.
pub const BEGIN_CHARACTER: i32 = 0;

/// One past the last character of the transition alphabet (`U+10FFFF + 1`).
pub const END_CHARACTER: i32 = 0x11_0000;

/// Begin bound used by end-of-stream and action markers. Never a legal
/// ordinary range bound.
pub const INVALID_BEGIN_CHARACTER: i32 = -1;

/// End bound used by end-of-stream and action markers. Never a legal
/// ordinary range bound.
pub const INVALID_END_CHARACTER: i32 = -2;
