//! Token-overlap fuzzy matching.

use std::collections::HashSet;

/// Threshold used by the selector when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Share of the smaller token set that also appears in the other set.
///
/// Tokens are the lower-cased whitespace-separated words of each input, with
/// duplicates collapsed. Returns `None` when either side has no tokens.
pub fn similarity(pattern: &str, message: &str) -> Option<f64> {
    let pattern_tokens = token_set(pattern);
    let message_tokens = token_set(message);

    if pattern_tokens.is_empty() || message_tokens.is_empty() {
        return None;
    }

    let overlap = pattern_tokens.intersection(&message_tokens).count();
    let smaller = pattern_tokens.len().min(message_tokens.len());
    Some(overlap as f64 / smaller as f64)
}

/// Whether `pattern` and `message` overlap by at least `threshold`.
///
/// The denominator is the smaller set, so a one-word message sharing its word
/// with any pattern always matches.
pub fn matches(pattern: &str, message: &str, threshold: f64) -> bool {
    similarity(pattern, message).is_some_and(|score| score >= threshold)
}

fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_side_never_matches() {
        assert!(!matches("", "hello", DEFAULT_THRESHOLD));
        assert!(!matches("hello", "", DEFAULT_THRESHOLD));
        assert!(!matches("   ", "  ", 0.0));
        assert_eq!(similarity("", "hello"), None);
    }

    #[test]
    fn min_size_denominator() {
        assert_eq!(similarity("a b", "a"), Some(1.0));
        assert_eq!(similarity("a b c", "a"), Some(1.0));
        assert!(matches("a b c", "a", DEFAULT_THRESHOLD));
    }

    #[test]
    fn single_shared_token_matches_at_any_threshold() {
        assert!(matches("hello", "hello", 1.0));
        assert!(matches("python", "PYTHON", 1.0));
    }

    #[test]
    fn duplicates_are_collapsed() {
        // {"hi"} vs {"hi", "there"}: 1 / 1
        assert_eq!(similarity("hi hi hi", "hi there"), Some(1.0));
    }

    #[test]
    fn below_threshold_fails() {
        // {"what","is","python"} vs {"what","is","rust","exactly"}: 2 / 3
        let score = similarity("what is python", "what is rust exactly").unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
        assert!(matches("what is python", "what is rust exactly", DEFAULT_THRESHOLD));
        assert!(!matches("what is python", "what is rust exactly", 0.7));

        assert!(!matches("tell me a joke", "how is the weather", DEFAULT_THRESHOLD));
    }

    #[test]
    fn punctuation_is_part_of_the_token() {
        assert_eq!(similarity("hello,", "hello"), Some(0.0));
    }
}
