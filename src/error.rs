//! Diagnostics: error kinds and the reporting sink.
//!
//! The generator never returns `Err` across its public contract. Recoverable
//! problems — malformed regexes, symbol conflicts — are reported through an
//! [`ErrorSink`] with the offending token's line, and generation either
//! continues (conflicts) or leaves the affected automaton empty (parse
//! errors). A `None` sink suppresses diagnostics entirely.

use thiserror::Error;

/// A diagnostic raised during lexer generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    /// A regular expression could not be parsed.
    #[error("syntax error: {message}")]
    SyntaxError { message: String },

    /// Two tokens of equal type, declared on the same line, accept in the
    /// same DFA state and cannot be distinguished.
    #[error("'{first}' and '{second}' conflict but are both defined on the same line")]
    SymbolConflict { first: String, second: String },

    /// A bracket expression contained a reversed (`z-a`) or empty range.
    #[error("character range error: {message}")]
    CharacterRange { message: String },
}

impl LexerError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        LexerError::SyntaxError {
            message: message.into(),
        }
    }

    pub(crate) fn character_range(message: impl Into<String>) -> Self {
        LexerError::CharacterRange {
            message: message.into(),
        }
    }
}

/// Receiver for generator diagnostics.
///
/// Two capabilities: error reports carrying the declaring line of the token
/// involved, and free-form progress messages. Implementations decide what to
/// do with each; `lexer_message` defaults to discarding.
pub trait ErrorSink {
    /// An error or conflict was detected. `line` is the source line of the
    /// token the diagnostic is about.
    fn lexer_error(&mut self, line: i32, error: &LexerError);

    /// Progress text from the generator (state counts and the like).
    fn lexer_message(&mut self, message: &str) {
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = LexerError::SymbolConflict {
            first: "kw1".to_string(),
            second: "kw2".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "'kw1' and 'kw2' conflict but are both defined on the same line"
        );

        let error = LexerError::syntax("unterminated group '('");
        assert_eq!(error.to_string(), "syntax error: unterminated group '('");
    }
}
