//! # scangen — lexical analyzer generator core
//!
//! Turns a set of named regular-expression token definitions into a pair of
//! deterministic finite automata suitable for driving a table-based scanner:
//! one automaton for ordinary tokens and one for whitespace/comment tokens,
//! so the scanner can skip whitespace without re-entering the token DFA.
//!
//! ## Pipeline
//!
//! ```text
//! Vec<Token> ──▶ RegexParser ──▶ syntax tree + firstpos/lastpos/followpos
//!                                      │
//!                                      ▼
//!                  subset construction over position-set items
//!                  (RangeSet partitions each state's alphabet)
//!                                      │
//!                                      ▼
//!        canonical state set ──▶ accept-symbol assignment ──▶ dense indices
//! ```
//!
//! The construction is the classical position method ("syntax-tree → DFA"):
//! no intermediate NFA is built. Each regex leaf gets a position index;
//! a DFA state is an interned set of positions; `goto` follows `followpos`
//! across the minimal refinement of the state's outgoing character ranges.
//!
//! ## Example
//!
//! ```
//! use scangen::{LexerGenerator, Token, TokenType};
//!
//! let tokens = vec![
//!     Token::literal("if", "if", 1, 0u32),
//!     Token::regular("id", "[a-zA-Z_][a-zA-Z0-9_]*", 2, 1u32),
//! ];
//! let whitespace = vec![Token::new("ws", "[ \\t\\n]+", TokenType::Null, 3, 2u32)];
//!
//! let generator = LexerGenerator::new(&tokens, &whitespace, None);
//! assert!(generator.start_state().is_some());
//! assert!(generator.whitespace_start_state().is_some());
//! ```
//!
//! Callers retain ownership of their symbol objects: `Token<S>` carries an
//! opaque `S: Clone` handle (an id, an `Rc`, an interned key) that accepting
//! states hand back unchanged. Diagnostics flow through the [`ErrorSink`]
//! trait; a `None` sink suppresses them. Malformed regexes never panic —
//! they are reported and the affected automaton is left empty.

pub mod automata;
pub mod error;
pub mod token;

#[cfg(test)]
mod tests;

pub use automata::actions::{ActionTable, LexerAction};
pub use automata::generator::LexerGenerator;
pub use automata::ranges::RangeSet;
pub use automata::state::{Item, LexerState, Transition};
pub use automata::{
    ActionIndex, LeafIndex, StateIndex, BEGIN_CHARACTER, END_CHARACTER,
    INVALID_BEGIN_CHARACTER, INVALID_END_CHARACTER,
};
pub use error::{ErrorSink, LexerError};
pub use token::{Token, TokenType};
