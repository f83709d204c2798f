//! Response selection over the knowledge base.
//!
//! [`select`] walks categories, groups, and patterns in stored order and stops
//! at the first pattern that hits. A pattern hits when its normalized form is
//! contained in the normalized message (or the other way round), or when the
//! raw lower-cased texts pass the token-overlap check in [`super::similarity`].
//! This is first-match, not best-match: a later, closer pattern never wins.

use rand::seq::SliceRandom;
use rand::Rng;

use super::normalize::normalize;
use super::similarity;
use crate::store::types::{KnowledgeBase, PatternGroup};

/// Where in the knowledge base a message matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub category: &'a str,
    /// Position of the group within its category.
    pub group_index: usize,
    /// The stored pattern (as written in the file) that hit.
    pub pattern: &'a str,
    pub group: &'a PatternGroup,
}

/// Prepared forms of the incoming message, computed once per lookup.
struct PreparedMessage {
    normalized: String,
    lowered: String,
}

impl PreparedMessage {
    fn new(message: &str) -> Self {
        let lowered = message.to_lowercase();
        Self {
            normalized: normalize(&lowered),
            lowered,
        }
    }

    fn hits(&self, pattern: &str, threshold: f64) -> bool {
        let normalized_pattern = normalize(pattern);

        // An empty side is contained in everything; never let that count as a hit.
        let contained = !normalized_pattern.is_empty()
            && !self.normalized.is_empty()
            && (self.normalized.contains(&normalized_pattern)
                || normalized_pattern.contains(&self.normalized));

        contained || similarity::matches(&pattern.to_lowercase(), &self.lowered, threshold)
    }
}

/// Locate the first pattern in `knowledge_base` that hits `message`.
pub fn find_match<'a>(
    message: &str,
    knowledge_base: &'a KnowledgeBase,
    threshold: f64,
) -> Option<Match<'a>> {
    let prepared = PreparedMessage::new(message);

    for (category, groups) in knowledge_base {
        for (group_index, group) in groups.iter().enumerate() {
            if !group.is_matchable() {
                continue;
            }
            if let Some(pattern) = group.patterns.iter().find(|p| prepared.hits(p, threshold)) {
                return Some(Match {
                    category,
                    group_index,
                    pattern,
                    group,
                });
            }
        }
    }

    None
}

/// Pick a reply for `message`, or `None` when nothing in the knowledge base hits.
///
/// Matching is deterministic; the only randomness is the uniform choice among
/// the matched group's responses, drawn from `rng`.
pub fn select<'a, R>(
    message: &str,
    knowledge_base: &'a KnowledgeBase,
    threshold: f64,
    rng: &mut R,
) -> Option<&'a str>
where
    R: Rng + ?Sized,
{
    let Some(found) = find_match(message, knowledge_base, threshold) else {
        tracing::debug!(message = %message, "no knowledge base match");
        return None;
    };

    tracing::debug!(
        category = %found.category,
        pattern = %found.pattern,
        "knowledge base match"
    );

    found.group.responses.choose(rng).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::similarity::DEFAULT_THRESHOLD;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn kb(entries: Vec<(&str, Vec<&str>, Vec<&str>)>) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        for (category, patterns, responses) in entries {
            kb.entry(category.to_string())
                .or_default()
                .push(PatternGroup::new(patterns, responses));
        }
        kb
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn pattern_contained_in_message() {
        let kb = kb(vec![("greetings", vec!["hello"], vec!["Hi there!"])]);
        let reply = select("Hello there, friend!", &kb, DEFAULT_THRESHOLD, &mut rng());
        assert_eq!(reply, Some("Hi there!"));
    }

    #[test]
    fn message_contained_in_pattern() {
        let kb = kb(vec![("tech", vec!["what is python"], vec!["A programming language."])]);
        let found = find_match("Python?", &kb, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.category, "tech");
        assert_eq!(found.pattern, "what is python");
    }

    #[test]
    fn fuzzy_overlap_catches_reordered_words() {
        let kb = kb(vec![("fun", vec!["joke sunao"], vec!["Ek joke..."])]);
        // Neither normalized string contains the other.
        assert!(find_match("sunao ek joke", &kb, DEFAULT_THRESHOLD).is_some());
    }

    #[test]
    fn fuzzy_uses_raw_lowercased_tokens() {
        let kb = kb(vec![("fun", vec!["joke sunao"], vec!["Ek joke..."])]);
        // "joke!" and "sunao," keep their punctuation as tokens, so only the
        // substring check could hit, and it does not.
        assert!(find_match("sunao, ek joke!", &kb, DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn first_category_wins() {
        let kb = kb(vec![
            ("first", vec!["hello"], vec!["from first"]),
            ("second", vec!["hello world"], vec!["from second"]),
        ]);
        let reply = select("hello world", &kb, DEFAULT_THRESHOLD, &mut rng());
        assert_eq!(reply, Some("from first"));
    }

    #[test]
    fn first_group_and_pattern_win_within_category() {
        let kb = kb(vec![
            ("c", vec!["nothing related", "tumhe kisne banaya"], vec!["group zero"]),
            ("c", vec!["kisne banaya"], vec!["group one"]),
        ]);
        let found = find_match("Tumhe kisne banaya?", &kb, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.group_index, 0);
        assert_eq!(found.pattern, "tumhe kisne banaya");
    }

    #[test]
    fn groups_without_responses_are_skipped() {
        let mut kb = kb(vec![("real", vec!["hello"], vec!["reply"])]);
        kb.shift_insert(0, "empty".into(), vec![PatternGroup::new(["hello"], Vec::<String>::new())]);

        let found = find_match("hello", &kb, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found.category, "real");
    }

    #[test]
    fn no_match_returns_none() {
        let kb = kb(vec![
            ("greetings", vec!["hello"], vec!["Hi!"]),
            ("fun", vec!["joke sunao"], vec!["Haha"]),
        ]);
        assert_eq!(select("weather forecast tomorrow", &kb, DEFAULT_THRESHOLD, &mut rng()), None);
    }

    #[test]
    fn punctuation_only_message_does_not_match_everything() {
        let kb = kb(vec![("greetings", vec!["hello"], vec!["Hi!"])]);
        assert!(find_match("?!", &kb, DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn empty_knowledge_base_returns_none() {
        assert_eq!(select("hello", &KnowledgeBase::new(), DEFAULT_THRESHOLD, &mut rng()), None);
    }

    #[test]
    fn any_response_may_be_returned() {
        let responses = ["one", "two", "three"];
        let kb = kb(vec![("c", vec!["hello"], responses.to_vec())]);

        let mut rng = rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let reply = select("hello", &kb, DEFAULT_THRESHOLD, &mut rng).unwrap();
            assert!(responses.contains(&reply));
            seen.insert(reply);
        }
        assert_eq!(seen.len(), responses.len());
    }

    #[test]
    fn seeded_choice_is_reproducible() {
        let kb = kb(vec![("c", vec!["hello"], vec!["a", "b", "c", "d"])]);
        let first = select("hello", &kb, DEFAULT_THRESHOLD, &mut StdRng::seed_from_u64(42));
        let second = select("hello", &kb, DEFAULT_THRESHOLD, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
