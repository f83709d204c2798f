//! Append-only conversation log, persisted through the store's file.

use chrono::{DateTime, Utc};

use crate::store::types::ConversationRecord;
use crate::store::KnowledgeStore;

/// Append one exchange and rewrite the store file.
///
/// Persistence is best-effort: a write failure is logged and the record stays
/// in memory, so the caller's request still succeeds. Privacy mode is the
/// caller's business; skipping this call is all it takes.
pub fn record<'a>(
    store: &'a mut KnowledgeStore,
    user_id: &str,
    user_message: &str,
    ai_response: &str,
    now: DateTime<Utc>,
) -> &'a ConversationRecord {
    store.push_message(ConversationRecord::new(user_id, user_message, ai_response, now));

    match store.persist() {
        Ok(()) => tracing::debug!(user_id = %user_id, "conversation recorded"),
        Err(e) => tracing::error!(error = %e, "failed to persist conversation; keeping it in memory"),
    }

    let last = store.messages().len() - 1;
    &store.messages()[last]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::read_store_file;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn record_appends_and_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.json");
        let mut store = KnowledgeStore::open(&path);

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let rec = record(&mut store, "u1", "hello", "Hi!", at);
        assert_eq!(rec.user_id, "u1");
        assert_eq!(rec.timestamp, "2024-05-01T12:30:00+00:00");

        let (on_disk, _) = read_store_file(&path).unwrap();
        assert_eq!(on_disk.messages.len(), 1);
        assert_eq!(on_disk.messages[0].ai_response, "Hi!");
    }

    #[test]
    fn persistence_failure_keeps_record_in_memory() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        // Parent "directory" is a regular file, so every write fails.
        let mut store = KnowledgeStore::open(blocker.join("db.json"));
        assert!(!store.is_connected());

        record(&mut store, "u1", "hello", "Hi!", Utc::now());
        assert_eq!(store.messages().len(), 1);
    }
}
