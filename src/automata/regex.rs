//! Regular-expression parsing into the annotated syntax tree.
//!
//! [`RegexParser`] parses each token's pattern with a recursive-descent
//! grammar (precedence low-to-high: alternation, concatenation, repetition,
//! atom), appends an end marker carrying the token's identity, and unions
//! every token's tree under a single root whose `firstpos` becomes the
//! DFA's initial item.
//!
//! ## Supported surface
//!
//! | Feature | Syntax |
//! |---------|--------|
//! | Literal character | `a`, `1`, `_` (any code point) |
//! | Escapes | `\n` `\r` `\t`; any other `\x` is the literal `x` |
//! | Dot | `.` — any character except newline |
//! | Character class | `[abc]`, `[a-z]`, `[a-zA-Z0-9_]` |
//! | Negated class | `[^abc]` — complement over the whole alphabet |
//! | POSIX class items | `[[:alpha:]]`, `[[:digit:]]`, ... inside `[]` |
//! | Grouping | `(...)` |
//! | Alternation | `a\|b` |
//! | Quantifiers | `*` `+` `?` |
//! | Action reference | `:identifier:` — interned, fired by the scanner |
//!
//! Not supported: backreferences, lookaround, captures, anchors, bounded
//! repetition. LITERAL tokens bypass all of the above: every character is
//! matched exactly.
//!
//! Errors are reported through the sink with the token's line and counted;
//! parsing continues so one pass collects every diagnostic, but a parser
//! with `errors() > 0` must not be used to build an automaton.

use super::actions::ActionTable;
use super::tree::{NodeIndex, RegexTree};
use super::{BEGIN_CHARACTER, END_CHARACTER};
use crate::error::{ErrorSink, LexerError};
use crate::token::{Token, TokenType};

/// Parses a list of token definitions into one combined syntax tree.
pub struct RegexParser {
    tree: RegexTree,
    errors: usize,
    token_count: usize,
}

impl RegexParser {
    /// Parse every token in `tokens`. Action references are interned into
    /// `actions`; diagnostics go to `sink`.
    pub fn new<S>(
        tokens: &[Token<S>],
        actions: &mut ActionTable,
        mut sink: Option<&mut dyn ErrorSink>,
    ) -> Self {
        let mut tree = RegexTree::new();
        let mut errors = 0usize;
        let mut root: Option<NodeIndex> = None;

        for (index, token) in tokens.iter().enumerate() {
            let expression = match token.token_type() {
                TokenType::Literal => parse_literal(&mut tree, token.regex()),
                TokenType::Regular | TokenType::Null => {
                    let parser = PatternParser {
                        tree: &mut tree,
                        actions: &mut *actions,
                        sink: &mut sink,
                        errors: &mut errors,
                        line: token.line(),
                        chars: token.regex().chars().collect(),
                        pos: 0,
                    };
                    parser.parse()
                }
            };

            // Terminate the token's expression with its end marker, then
            // union it with the trees parsed so far.
            let end = tree.end_marker(index as u32);
            let wrapped = match expression {
                Some(expression) => tree.concatenate(expression, end),
                None => end,
            };
            root = Some(match root {
                Some(root) => tree.or(root, wrapped),
                None => wrapped,
            });
        }

        if let Some(root) = root {
            tree.calculate(root);
        }

        RegexParser {
            tree,
            errors,
            token_count: tokens.len(),
        }
    }

    /// Whether no tokens were supplied.
    pub fn is_empty(&self) -> bool {
        self.token_count == 0
    }

    /// How many syntax errors were reported. Non-zero means the tree must
    /// not be used for subset construction.
    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn tree(&self) -> &RegexTree {
        &self.tree
    }

    pub fn into_tree(self) -> RegexTree {
        self.tree
    }
}

/// Parse a LITERAL token: every character matched exactly, no
/// metacharacter interpretation.
fn parse_literal(tree: &mut RegexTree, lexeme: &str) -> Option<NodeIndex> {
    let mut node: Option<NodeIndex> = None;
    for c in lexeme.chars() {
        let leaf = tree.character(c as i32, c as i32 + 1);
        node = Some(match node {
            Some(node) => tree.concatenate(node, leaf),
            None => leaf,
        });
    }
    node
}

/// Recursive-descent parser over one REGULAR token's pattern.
struct PatternParser<'a, 'e> {
    tree: &'a mut RegexTree,
    actions: &'a mut ActionTable,
    sink: &'a mut Option<&'e mut dyn ErrorSink>,
    errors: &'a mut usize,
    line: i32,
    chars: Vec<char>,
    pos: usize,
}

impl PatternParser<'_, '_> {
    fn parse(mut self) -> Option<NodeIndex> {
        let mut node = self.or_expression();
        // Only an unmatched ')' can stop the top-level expression; report
        // it, skip it, and keep parsing so later errors surface too.
        while let Some(c) = self.peek() {
            self.bump();
            self.report(LexerError::syntax(format!("unexpected '{c}'")));
            let rest = self.or_expression();
            node = match (node, rest) {
                (Some(left), Some(right)) => Some(self.tree.concatenate(left, right)),
                (left, right) => left.or(right),
            };
        }
        node
    }

    fn or_expression(&mut self) -> Option<NodeIndex> {
        let mut left = self.cat_expression();
        while self.eat('|') {
            let right = self.cat_expression();
            left = match (left, right) {
                (Some(left), Some(right)) => Some(self.tree.or(left, right)),
                (one, other) => {
                    self.report(LexerError::syntax("empty alternation arm"));
                    one.or(other)
                }
            };
        }
        left
    }

    fn cat_expression(&mut self) -> Option<NodeIndex> {
        let mut left: Option<NodeIndex> = None;
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            if let Some(node) = self.repeat_expression() {
                left = Some(match left {
                    Some(left) => self.tree.concatenate(left, node),
                    None => node,
                });
            }
        }
        left
    }

    fn repeat_expression(&mut self) -> Option<NodeIndex> {
        let mut node = self.atom()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.bump();
                    node = self.tree.star(node);
                }
                Some('+') => {
                    self.bump();
                    node = self.tree.plus(node);
                }
                Some('?') => {
                    self.bump();
                    node = self.tree.optional(node);
                }
                _ => break,
            }
        }
        Some(node)
    }

    fn atom(&mut self) -> Option<NodeIndex> {
        match self.peek()? {
            '(' => {
                self.bump();
                let inner = self.or_expression();
                if !self.eat(')') {
                    self.report(LexerError::syntax("unterminated group '('"));
                }
                if inner.is_none() {
                    self.report(LexerError::syntax("empty group '()'"));
                }
                inner
            }
            '[' => self.bracket_expression(),
            '.' => {
                self.bump();
                let below = self.tree.character(BEGIN_CHARACTER, '\n' as i32);
                let above = self.tree.character('\n' as i32 + 1, END_CHARACTER);
                Some(self.tree.or(below, above))
            }
            '\\' => {
                let c = self.escape_character()?;
                Some(self.tree.character(c, c + 1))
            }
            ':' => self.action_expression(),
            c @ ('*' | '+' | '?') => {
                self.bump();
                self.report(LexerError::syntax(format!(
                    "quantifier '{c}' without preceding atom"
                )));
                None
            }
            c => {
                self.bump();
                Some(self.tree.character(c as i32, c as i32 + 1))
            }
        }
    }

    /// `\x` — consume the backslash and the escaped character.
    fn escape_character(&mut self) -> Option<i32> {
        debug_assert_eq!(self.peek(), Some('\\'));
        self.bump();
        match self.bump() {
            None => {
                self.report(LexerError::syntax("trailing backslash"));
                None
            }
            Some('n') => Some('\n' as i32),
            Some('r') => Some('\r' as i32),
            Some('t') => Some('\t' as i32),
            // Unknown escapes are the literal second character.
            Some(c) => Some(c as i32),
        }
    }

    /// `:identifier:` — intern the action and produce an action leaf.
    fn action_expression(&mut self) -> Option<NodeIndex> {
        debug_assert_eq!(self.peek(), Some(':'));
        self.bump();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        let identifier: String = self.chars[start..self.pos].iter().collect();
        if !self.eat(':') {
            self.report(LexerError::syntax("unterminated lexer action ':'"));
            return None;
        }
        if identifier.is_empty() {
            self.report(LexerError::syntax("empty lexer action identifier"));
            return None;
        }
        let index = self.actions.add(&identifier).index();
        Some(self.tree.action(index))
    }

    /// `[...]` — evaluate items into a character set, then emit one leaf
    /// per resulting interval, joined under alternation.
    fn bracket_expression(&mut self) -> Option<NodeIndex> {
        debug_assert_eq!(self.peek(), Some('['));
        self.bump();
        let negated = self.eat('^');

        let mut set = CharacterSet::new();
        if negated {
            set.insert(BEGIN_CHARACTER, END_CHARACTER);
        }

        let mut closed = false;
        while let Some(c) = self.peek() {
            if c == ']' {
                self.bump();
                closed = true;
                break;
            }
            if c == '[' && self.peek_at(1) == Some(':') {
                self.posix_item(&mut set, negated);
                continue;
            }
            let Some(begin) = self.bracket_character() else {
                continue;
            };
            if self.peek() == Some('-') && !matches!(self.peek_at(1), None | Some(']')) {
                self.bump();
                let Some(last) = self.bracket_character() else {
                    continue;
                };
                if last < begin {
                    self.report(LexerError::character_range(format!(
                        "range [{}-{}] is out of order",
                        display_character(begin),
                        display_character(last)
                    )));
                    continue;
                }
                apply_item(&mut set, negated, begin, last + 1);
            } else {
                apply_item(&mut set, negated, begin, begin + 1);
            }
        }

        if !closed {
            self.report(LexerError::syntax("unterminated character class '['"));
        }

        let intervals = set.intervals().to_vec();
        if intervals.is_empty() {
            self.report(LexerError::character_range("empty character class"));
            return None;
        }
        let mut node: Option<NodeIndex> = None;
        for (begin, end) in intervals {
            let leaf = self.tree.character(begin, end);
            node = Some(match node {
                Some(node) => self.tree.or(node, leaf),
                None => leaf,
            });
        }
        node
    }

    /// One item inside `[...]`: a raw or escaped character.
    fn bracket_character(&mut self) -> Option<i32> {
        match self.peek()? {
            '\\' => self.escape_character(),
            c => {
                self.bump();
                Some(c as i32)
            }
        }
    }

    /// `[:name:]` inside a bracket expression.
    fn posix_item(&mut self, set: &mut CharacterSet, negated: bool) {
        debug_assert!(self.peek() == Some('[') && self.peek_at(1) == Some(':'));
        self.bump();
        self.bump();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if !(self.eat(':') && self.eat(']')) {
            self.report(LexerError::syntax(format!(
                "unterminated character class item '[:{name}'"
            )));
            return;
        }
        match posix_ranges(&name) {
            Some(ranges) => {
                for &(begin, end) in ranges {
                    apply_item(set, negated, begin, end);
                }
            }
            None => self.report(LexerError::syntax(format!(
                "unknown character class item '[:{name}:]'"
            ))),
        }
    }

    fn report(&mut self, error: LexerError) {
        *self.errors += 1;
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.lexer_error(self.line, &error);
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

/// In a positive class, items are inserted; in a negated class, the set
/// starts as the full alphabet and items are erased.
fn apply_item(set: &mut CharacterSet, negated: bool, begin: i32, end: i32) {
    if negated {
        set.erase(begin, end);
    } else {
        set.insert(begin, end);
    }
}

fn display_character(c: i32) -> String {
    match char::from_u32(c as u32) {
        Some(c) if !c.is_control() => c.to_string(),
        _ => format!("U+{c:04X}"),
    }
}

/// The POSIX bracket items, as half-open ASCII code-point ranges.
fn posix_ranges(name: &str) -> Option<&'static [(i32, i32)]> {
    Some(match name {
        "alnum" => &[(0x30, 0x3A), (0x41, 0x5B), (0x61, 0x7B)],
        "word" => &[(0x30, 0x3A), (0x41, 0x5B), (0x5F, 0x60), (0x61, 0x7B)],
        "alpha" => &[(0x41, 0x5B), (0x61, 0x7B)],
        "blank" => &[(0x09, 0x0A), (0x20, 0x21)],
        "cntrl" => &[(0x00, 0x20), (0x7F, 0x80)],
        "digit" => &[(0x30, 0x3A)],
        "graph" => &[(0x21, 0x7F)],
        "lower" => &[(0x61, 0x7B)],
        "print" => &[(0x20, 0x7F)],
        "punct" => &[(0x21, 0x30), (0x3A, 0x41), (0x5B, 0x61), (0x7B, 0x7F)],
        "space" => &[(0x09, 0x0E), (0x20, 0x21)],
        "upper" => &[(0x41, 0x5B)],
        "xdigit" => &[(0x30, 0x3A), (0x41, 0x47), (0x61, 0x67)],
        _ => return None,
    })
}

/// Working set of characters for one bracket expression: sorted, disjoint,
/// merged half-open intervals supporting insert and erase.
#[derive(Debug, Default)]
pub struct CharacterSet {
    intervals: Vec<(i32, i32)>,
}

impl CharacterSet {
    pub fn new() -> Self {
        CharacterSet::default()
    }

    /// Insert `[begin, end)`, merging overlapping and adjacent intervals.
    pub fn insert(&mut self, begin: i32, end: i32) {
        debug_assert!(begin < end, "empty interval [{begin}, {end})");
        let mut merged_begin = begin;
        let mut merged_end = end;
        let mut first = 0;
        while first < self.intervals.len() && self.intervals[first].1 < begin {
            first += 1;
        }
        let mut last = first;
        while last < self.intervals.len() && self.intervals[last].0 <= end {
            merged_begin = merged_begin.min(self.intervals[last].0);
            merged_end = merged_end.max(self.intervals[last].1);
            last += 1;
        }
        self.intervals
            .splice(first..last, [(merged_begin, merged_end)]);
    }

    /// Erase `[begin, end)`, splitting intervals that straddle a bound.
    pub fn erase(&mut self, begin: i32, end: i32) {
        debug_assert!(begin < end, "empty interval [{begin}, {end})");
        let mut result = Vec::with_capacity(self.intervals.len() + 1);
        for &(b, e) in &self.intervals {
            if e <= begin || end <= b {
                result.push((b, e));
                continue;
            }
            if b < begin {
                result.push((b, begin));
            }
            if end < e {
                result.push((end, e));
            }
        }
        self.intervals = result;
    }

    pub fn intervals(&self) -> &[(i32, i32)] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
