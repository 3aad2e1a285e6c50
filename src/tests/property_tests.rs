//! Invariants of the construction, checked over sample grammars, plus
//! property tests for the RangeSet algebra.

use proptest::prelude::*;

use crate::automata::actions::ActionTable;
use crate::automata::regex::RegexParser;
use crate::{LexerGenerator, RangeSet, Token, TokenType};

fn sample_tokens() -> Vec<Token<u32>> {
    vec![
        Token::literal("let", "let", 1, 1),
        Token::literal("le", "le", 2, 2),
        Token::literal("==", "==", 3, 3),
        Token::literal("=", "=", 4, 4),
        Token::regular("id", "[a-zA-Z_][a-zA-Z0-9_]*", 5, 5),
        Token::regular("int", "[0-9]+", 6, 6),
        Token::regular("float", "[0-9]+\\.[0-9]+", 7, 7),
        Token::regular("string", "'[^'\\n]*'", 8, 8),
    ]
}

fn sample_whitespace() -> Vec<Token<u32>> {
    vec![
        Token::new("blank", "[ \\t\\r\\n]+", TokenType::Null, 9, 9),
        Token::new("comment", "#[^\\n]*", TokenType::Null, 10, 10),
    ]
}

fn sample_generator() -> LexerGenerator<u32> {
    LexerGenerator::new(&sample_tokens(), &sample_whitespace(), None)
}

#[test]
fn test_determinism() {
    // For every state and character, at most one transition matches:
    // character transitions are sorted and pairwise disjoint.
    let generator = sample_generator();
    for state in generator.states().iter().chain(generator.whitespace_states()) {
        let ranges: Vec<(i32, i32)> = state
            .transitions
            .iter()
            .filter(|transition| !transition.is_action())
            .map(|transition| (transition.begin, transition.end))
            .collect();
        for window in ranges.windows(2) {
            assert!(
                window[0].1 <= window[1].0,
                "state {} has overlapping or unsorted transitions: {ranges:?}",
                state.index
            );
        }
    }
}

#[test]
fn test_partition_totality() {
    // The union of a state's outgoing ranges equals the union of the
    // character ranges of the non-marker positions in its item.
    let tokens = sample_tokens();
    let mut actions = ActionTable::new();
    let parser = RegexParser::new(&tokens, &mut actions, None);
    let tree = parser.into_tree();

    let generator = sample_generator();
    for state in generator.states() {
        let mut expected = RangeSet::new();
        for &position in &state.item {
            let leaf = tree.leaf(position);
            if !leaf.is_marker() {
                expected.insert(leaf.begin, leaf.end);
            }
        }
        let expected: Vec<(i32, i32)> = expected.spans().collect();
        let actual: Vec<(i32, i32)> = state
            .transitions
            .iter()
            .filter(|transition| !transition.is_action())
            .map(|transition| (transition.begin, transition.end))
            .collect();
        assert_eq!(
            actual, expected,
            "state {} transitions must cover exactly its item's ranges",
            state.index
        );
    }
}

#[test]
fn test_canonicality() {
    // Two distinct states never have equal items.
    let generator = sample_generator();
    for states in [generator.states(), generator.whitespace_states()] {
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                assert_ne!(a.item, b.item, "states {} and {} share an item", a.index, b.index);
            }
        }
    }
}

#[test]
fn test_reachability() {
    // Every state other than a start state is the target of at least one
    // transition.
    let generator = sample_generator();
    let mut reachable: Vec<bool> =
        vec![false; generator.states().len() + generator.whitespace_states().len()];
    if let Some(start) = generator.start_state() {
        reachable[start as usize] = true;
    }
    if let Some(start) = generator.whitespace_start_state() {
        reachable[start as usize] = true;
    }
    for state in generator.states().iter().chain(generator.whitespace_states()) {
        for transition in &state.transitions {
            reachable[transition.target as usize] = true;
        }
    }
    for (index, seen) in reachable.iter().enumerate() {
        assert!(seen, "state {index} is unreachable");
    }
}

#[test]
fn test_priority_monotonicity() {
    // For every accept state, no rejected end-marker candidate has a
    // higher type, or an equal type and a smaller line, than the winner.
    let tokens = sample_tokens();
    let mut actions = ActionTable::new();
    let parser = RegexParser::new(&tokens, &mut actions, None);
    let tree = parser.into_tree();

    let generator = sample_generator();
    for state in generator.states() {
        let candidates: Vec<&Token<u32>> = state
            .item
            .iter()
            .map(|&position| tree.leaf(position))
            .filter(|leaf| leaf.is_end())
            .map(|leaf| &tokens[leaf.token.unwrap() as usize])
            .collect();
        let Some(symbol) = state.symbol else {
            assert!(candidates.is_empty());
            continue;
        };
        let winner = tokens
            .iter()
            .find(|token| *token.symbol() == symbol)
            .expect("accept symbol belongs to a token");
        for candidate in candidates {
            assert!(
                candidate.token_type() < winner.token_type()
                    || (candidate.token_type() == winner.token_type()
                        && candidate.line() >= winner.line()),
                "state {}: '{}' should not have lost to '{}'",
                state.index,
                candidate.identifier(),
                winner.identifier()
            );
        }
    }
}

#[test]
fn test_reproducibility() {
    // Indices, items, transitions and symbols are a pure function of the
    // token inputs.
    let first = sample_generator();
    let second = sample_generator();

    assert_eq!(first.start_state(), second.start_state());
    assert_eq!(first.whitespace_start_state(), second.whitespace_start_state());
    assert_eq!(first.states().len(), second.states().len());
    for (a, b) in first.states().iter().zip(second.states()) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.item, b.item);
        assert_eq!(a.symbol, b.symbol);
        assert_eq!(a.transitions, b.transitions);
    }
}

#[test]
fn test_regular_outranks_null() {
    let tokens = vec![
        Token::new("skip", "x", TokenType::Null, 1, 1u32),
        Token::regular("letter", "x", 9, 2u32),
    ];
    let generator = LexerGenerator::new(&tokens, &[], None);
    assert_eq!(super::scan(&generator, "x"), Some(2));
}

/// Reference partition: consecutive boundary pairs whose interval is
/// covered by at least one inserted range.
fn reference_spans(ranges: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut bounds: Vec<i32> = ranges.iter().flat_map(|&(b, e)| [b, e]).collect();
    bounds.sort_unstable();
    bounds.dedup();
    let mut spans = Vec::new();
    for window in bounds.windows(2) {
        let (begin, end) = (window[0], window[1]);
        if ranges.iter().any(|&(b, e)| b <= begin && end <= e) {
            spans.push((begin, end));
        }
    }
    spans
}

fn spans_of(ranges: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut set = RangeSet::new();
    for &(begin, end) in ranges {
        set.insert(begin, end);
    }
    set.spans().collect()
}

proptest::proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_rangeset_matches_reference(
        raw in proptest::collection::vec((0i32..200, 1i32..50), 1..12)
    ) {
        let ranges: Vec<(i32, i32)> =
            raw.iter().map(|&(begin, len)| (begin, begin + len)).collect();
        prop_assert_eq!(spans_of(&ranges), reference_spans(&ranges));
    }

    #[test]
    fn prop_rangeset_insertion_order_invariant(
        raw in proptest::collection::vec((0i32..200, 1i32..50), 1..12).prop_shuffle()
    ) {
        let ranges: Vec<(i32, i32)> =
            raw.iter().map(|&(begin, len)| (begin, begin + len)).collect();
        let mut sorted = ranges.clone();
        sorted.sort_unstable();
        prop_assert_eq!(spans_of(&ranges), spans_of(&sorted));
    }
}
