use serde::Serialize;
use std::path::Path;

use crate::store::types::StoreFile;
use crate::store::{read_store_file, StoreError};

/// Aggregate counts over a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_conversations: usize,
    pub total_patterns: usize,
    pub total_responses: usize,
    pub categories: usize,
    /// Current size of the store file in kilobytes, 0 when it does not exist.
    pub database_size_kb: f64,
}

/// Compute store statistics.
///
/// `store_path` is used for the file size; pass None for a store with no file.
/// Groups that cannot match still contribute their patterns and responses.
pub fn statistics(store: &StoreFile, store_path: Option<&Path>) -> Stats {
    let (total_patterns, total_responses) = store
        .knowledge_base
        .values()
        .flatten()
        .fold((0, 0), |(patterns, responses), group| {
            (patterns + group.patterns.len(), responses + group.responses.len())
        });

    let database_size_kb = store_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len() as f64 / 1024.0)
        .unwrap_or(0.0);

    Stats {
        total_conversations: store.messages.len(),
        total_patterns,
        total_responses,
        categories: store.knowledge_base.len(),
        database_size_kb,
    }
}

/// Read the store file at `path` and compute its statistics without
/// modifying it. A missing or malformed file is an error here, not a reset.
pub fn file_statistics(path: &Path) -> Result<(StoreFile, Stats), StoreError> {
    let (store, _) = read_store_file(path)?;
    let stats = statistics(&store, Some(path));
    Ok((store, stats))
}
