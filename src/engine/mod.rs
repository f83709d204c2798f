//! Matching engine: normalization, fuzzy scoring, response selection,
//! conversation logging, and statistics over a [`crate::store::KnowledgeStore`].

pub mod conversation;
pub mod normalize;
pub mod select;
pub mod similarity;
pub mod stats;

pub use normalize::normalize;
pub use select::{find_match, select, Match};
pub use similarity::DEFAULT_THRESHOLD;
