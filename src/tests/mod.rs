//! Pipeline-level tests: end-to-end generation scenarios, diagnostic
//! behavior, and the invariants the construction guarantees.

mod property_tests;

use crate::error::{ErrorSink, LexerError};
use crate::{LexerGenerator, StateIndex};

/// Sink that records every diagnostic and progress message.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub errors: Vec<(i32, LexerError)>,
    pub messages: Vec<String>,
}

impl ErrorSink for CollectingSink {
    fn lexer_error(&mut self, line: i32, error: &LexerError) {
        self.errors.push((line, error.clone()));
    }

    fn lexer_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Drive the token automaton over `input` character by character, starting
/// from `start`. Returns the final state's index, or `None` if a character
/// has no transition.
pub fn walk<S: Clone>(
    generator: &LexerGenerator<S>,
    start: StateIndex,
    input: &str,
) -> Option<StateIndex> {
    let mut state = start;
    for c in input.chars() {
        state = generator.state(state)?.transition_on(c as i32)?;
    }
    Some(state)
}

/// The symbol accepted after scanning exactly `input` from the token
/// automaton's start state.
pub fn scan<S: Clone>(generator: &LexerGenerator<S>, input: &str) -> Option<S> {
    let start = generator.start_state()?;
    let state = walk(generator, start, input)?;
    generator.state(state)?.symbol.clone()
}
