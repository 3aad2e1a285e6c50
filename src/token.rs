//! Token definitions consumed by the generator.

use std::fmt;

/// Classification of a token definition. The ordinal doubles as the
/// conflict-resolution priority: when two tokens accept in the same DFA
/// state, the higher type wins, so literals (keywords, operators) outrank
/// regular expressions and `Null` ranks below both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenType {
    /// No classification; used for whitespace definitions that produce no
    /// symbol of their own.
    Null,
    /// A regular-expression token (`[a-z]+`, `[0-9]+`, ...).
    Regular,
    /// A literal token matched character for character (`if`, `==`, ...).
    Literal,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Null => write!(f, "null"),
            TokenType::Regular => write!(f, "regular expression"),
            TokenType::Literal => write!(f, "literal"),
        }
    }
}

/// A single token definition: an identifier, the regex (or literal) source,
/// a type, the declaring line, and the caller's opaque symbol handle.
///
/// The generator never interprets `S` — it clones the handle into accepting
/// states and returns it through [`LexerState::symbol`]. Callers typically
/// pass an index into their own symbol table or a reference-counted pointer.
///
/// Tokens are immutable once handed to the generator.
///
/// [`LexerState::symbol`]: crate::LexerState
#[derive(Debug, Clone)]
pub struct Token<S> {
    identifier: String,
    regex: String,
    token_type: TokenType,
    line: i32,
    symbol: S,
}

impl<S> Token<S> {
    /// Create a token definition.
    pub fn new(
        identifier: impl Into<String>,
        regex: impl Into<String>,
        token_type: TokenType,
        line: i32,
        symbol: S,
    ) -> Self {
        Token {
            identifier: identifier.into(),
            regex: regex.into(),
            token_type,
            line,
            symbol,
        }
    }

    /// Shorthand for a [`TokenType::Regular`] token.
    pub fn regular(
        identifier: impl Into<String>,
        regex: impl Into<String>,
        line: i32,
        symbol: S,
    ) -> Self {
        Token::new(identifier, regex, TokenType::Regular, line, symbol)
    }

    /// Shorthand for a [`TokenType::Literal`] token. The source is matched
    /// character for character with no metacharacter interpretation.
    pub fn literal(
        identifier: impl Into<String>,
        lexeme: impl Into<String>,
        line: i32,
        symbol: S,
    ) -> Self {
        Token::new(identifier, lexeme, TokenType::Literal, line, symbol)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The regex (or literal) source text.
    pub fn regex(&self) -> &str {
        &self.regex
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// The line this token was declared on. Earlier declarations win ties
    /// between tokens of equal type.
    pub fn line(&self) -> i32 {
        self.line
    }

    /// The caller's opaque symbol handle.
    pub fn symbol(&self) -> &S {
        &self.symbol
    }
}
