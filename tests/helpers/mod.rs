#![allow(dead_code)]

use rejoinder::store::types::{KnowledgeBase, PatternGroup, StoreFile};
use rejoinder::store::write_store_file;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small bilingual knowledge base in file order: greetings, identity, jokes, tech.
pub fn sample_knowledge_base() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.insert(
        "greetings".into(),
        vec![
            PatternGroup::new(["hello", "hi there", "namaste"], ["Hello! How can I help?", "Hi!"]),
            PatternGroup::new(["kaise ho", "how are you"], ["Main theek hun!", "Doing great."]),
        ],
    );
    kb.insert(
        "identity".into(),
        vec![PatternGroup::new(
            ["who created you", "tumhe kisne banaya"],
            ["I was built by a small team."],
        )],
    );
    kb.insert(
        "jokes".into(),
        vec![PatternGroup::new(["joke sunao", "tell me a joke"], ["Why did the chicken..."])],
    );
    kb.insert(
        "tech".into(),
        vec![PatternGroup::new(["what is python"], ["Python is a programming language."])],
    );
    kb
}

/// A store file holding [`sample_knowledge_base`] and no messages.
pub fn sample_store() -> StoreFile {
    let mut store = StoreFile::default();
    store.knowledge_base = sample_knowledge_base();
    store
}

/// Create a temp dir with `db.json` written from `store`. Keep the TempDir alive.
pub fn store_on_disk(store: &StoreFile) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("db.json");
    write_store_file(&path, store).unwrap();
    (tmp, path)
}

/// Create a temp dir with `db.json` containing raw text.
pub fn raw_store_on_disk(contents: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("db.json");
    std::fs::write(&path, contents).unwrap();
    (tmp, path)
}

/// Parse the file at `path` as plain JSON.
pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
