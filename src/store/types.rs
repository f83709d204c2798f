//! Store data model and load-time validation.
//!
//! Defines [`StoreFile`] (the whole durable document), [`KnowledgeBase`]
//! (categories of [`PatternGroup`]s), and [`ConversationRecord`] (one logged
//! exchange). Raw JSON is checked once at load by [`parse_store_file`]; entries
//! with the wrong shape are set aside there so the matcher never has to
//! re-check. Set-aside entries are written back verbatim, at their original
//! positions, whenever the store is persisted.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category name → ordered pattern groups. Iteration follows the file's key order.
pub type KnowledgeBase = IndexMap<String, Vec<PatternGroup>>;

/// A bundle of interchangeable trigger patterns and candidate replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGroup {
    /// Surface forms that should trigger this group.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Candidate replies; one is chosen at random per match.
    #[serde(default)]
    pub responses: Vec<String>,
}

impl PatternGroup {
    pub fn new<P, R>(patterns: P, responses: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    /// A group only takes part in matching when it has both patterns and responses.
    pub fn is_matchable(&self) -> bool {
        !self.patterns.is_empty() && !self.responses.is_empty()
    }
}

/// One logged exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub user_id: String,
    pub user_message: String,
    pub ai_response: String,
    /// ISO 8601 timestamp of the exchange.
    pub timestamp: String,
}

impl ConversationRecord {
    pub fn new(user_id: &str, user_message: &str, ai_response: &str, at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            user_message: user_message.to_string(),
            ai_response: ai_response.to_string(),
            timestamp: at.to_rfc3339(),
        }
    }
}

/// The durable document: conversation log plus knowledge base.
///
/// Entries that failed validation at load are not visible through the public
/// fields but are kept alongside them and serialized back in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreFile {
    pub messages: Vec<ConversationRecord>,
    pub knowledge_base: KnowledgeBase,
    preserved: Preserved,
}

impl StoreFile {
    /// Whether any entries were set aside at load and will be written back untouched.
    pub fn has_preserved_entries(&self) -> bool {
        !self.preserved.messages.is_empty()
            || !self.preserved.categories.is_empty()
            || self.preserved.groups.values().any(|g| !g.is_empty())
    }
}

/// Raw JSON for entries that failed validation, keyed by their position in the file.
#[derive(Debug, Clone, Default, PartialEq)]
struct Preserved {
    messages: Vec<(usize, Value)>,
    categories: Vec<(usize, (String, Value))>,
    groups: IndexMap<String, Vec<(usize, Value)>>,
}

enum Slot<'a, K, R> {
    Kept(K),
    Raw(&'a R),
}

impl<K: Serialize, R: Serialize> Serialize for Slot<'_, K, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Kept(item) => item.serialize(serializer),
            Slot::Raw(value) => value.serialize(serializer),
        }
    }
}

/// Merge validated items with set-aside raw entries so every raw entry lands
/// back at its recorded position. Items appended since load go after them.
fn interleave<'a, K, R>(
    kept: impl IntoIterator<Item = K>,
    raw: &'a [(usize, R)],
) -> Vec<Slot<'a, K, R>> {
    let mut raw = raw.iter().peekable();
    let mut out = Vec::new();
    for item in kept {
        while let Some((_, value)) = raw.next_if(|(at, _)| *at <= out.len()) {
            out.push(Slot::Raw(value));
        }
        out.push(Slot::Kept(item));
    }
    out.extend(raw.map(|(_, value)| Slot::Raw(value)));
    out
}

struct KnowledgeBaseOut<'a>(&'a StoreFile);

impl Serialize for KnowledgeBaseOut<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let StoreFile {
            knowledge_base,
            preserved,
            ..
        } = self.0;
        let entries = interleave(knowledge_base.iter(), &preserved.categories);

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for entry in entries {
            match entry {
                Slot::Kept((category, groups)) => {
                    let raw = preserved
                        .groups
                        .get(category)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    map.serialize_entry(category, &interleave(groups, raw))?;
                }
                Slot::Raw((category, value)) => map.serialize_entry(category, value)?,
            }
        }
        map.end()
    }
}

impl Serialize for StoreFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StoreFile", 2)?;
        state.serialize_field(
            "messages",
            &interleave(&self.messages, &self.preserved.messages),
        )?;
        state.serialize_field("knowledge_base", &KnowledgeBaseOut(self))?;
        state.end()
    }
}

/// Counts of entries set aside while validating a store file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Categories whose value was not an array of groups.
    pub skipped_categories: usize,
    /// Group entries that were not objects of string arrays.
    pub skipped_groups: usize,
    /// Conversation records missing fields or holding non-string values.
    pub skipped_messages: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_categories == 0 && self.skipped_groups == 0 && self.skipped_messages == 0
    }
}

/// Loosely-typed top level, checked entry by entry in [`RawStoreFile::validate`].
#[derive(Debug, Deserialize)]
struct RawStoreFile {
    #[serde(default)]
    messages: Vec<Value>,
    #[serde(default)]
    knowledge_base: IndexMap<String, Value>,
}

impl RawStoreFile {
    fn validate(self) -> (StoreFile, LoadReport) {
        let mut report = LoadReport::default();
        let mut preserved = Preserved::default();

        let mut messages = Vec::with_capacity(self.messages.len());
        for (index, raw) in self.messages.into_iter().enumerate() {
            match ConversationRecord::deserialize(&raw) {
                Ok(record) => messages.push(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed conversation record");
                    report.skipped_messages += 1;
                    preserved.messages.push((index, raw));
                }
            }
        }

        let mut knowledge_base = KnowledgeBase::with_capacity(self.knowledge_base.len());
        for (position, (category, raw)) in self.knowledge_base.into_iter().enumerate() {
            let items = match raw {
                Value::Array(items) => items,
                other => {
                    tracing::warn!(category = %category, "skipping category: value is not an array");
                    report.skipped_categories += 1;
                    preserved.categories.push((position, (category, other)));
                    continue;
                }
            };

            let mut groups = Vec::with_capacity(items.len());
            let mut raw_groups = Vec::new();
            for (index, item) in items.into_iter().enumerate() {
                match PatternGroup::deserialize(&item) {
                    Ok(group) => {
                        if !group.is_matchable() {
                            tracing::warn!(
                                category = %category,
                                index,
                                "pattern group lacks patterns or responses; it will never match"
                            );
                        }
                        groups.push(group);
                    }
                    Err(e) => {
                        tracing::warn!(
                            category = %category,
                            index,
                            error = %e,
                            "skipping malformed pattern group"
                        );
                        report.skipped_groups += 1;
                        raw_groups.push((index, item));
                    }
                }
            }
            if !raw_groups.is_empty() {
                preserved.groups.insert(category.clone(), raw_groups);
            }
            knowledge_base.insert(category, groups);
        }

        (
            StoreFile {
                messages,
                knowledge_base,
                preserved,
            },
            report,
        )
    }
}

/// Parse and validate the JSON text of a store file.
///
/// Fails only when the top level is not an object with array-valued `messages`
/// and object-valued `knowledge_base`. Anything finer-grained is counted and
/// set aside, then written back unchanged on the next persist.
pub fn parse_store_file(contents: &str) -> Result<(StoreFile, LoadReport), serde_json::Error> {
    let raw: RawStoreFile = serde_json::from_str(contents)?;
    Ok(raw.validate())
}
