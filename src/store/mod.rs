pub mod types;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::stats::{self, Stats};
use types::{ConversationRecord, KnowledgeBase, LoadReport, StoreFile};

/// Failures reading or writing the store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store file {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write store file {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::Unreadable { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Read and validate the store file at `path`.
pub fn read_store_file(path: &Path) -> Result<(StoreFile, LoadReport), StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    types::parse_store_file(&contents).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrite the whole store file. Uses a temp file + rename so a concurrent
/// reader sees either the old document or the new one.
pub fn write_store_file(path: &Path, store: &StoreFile) -> Result<(), StoreError> {
    let persist_err = |source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(persist_err)?;
    }

    let json = serde_json::to_string_pretty(store)?;

    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, json).map_err(persist_err)?;
    std::fs::rename(&tmp_path, path).map_err(persist_err)?;

    tracing::debug!(path = %path.display(), "store persisted");
    Ok(())
}

/// Load the store at `path`, falling back to a freshly persisted empty store.
pub fn load(path: impl AsRef<Path>) -> StoreFile {
    KnowledgeStore::open(path).into_data()
}

/// File-backed knowledge store with write-through persistence.
///
/// Owns the in-memory copy of the store file. Callers sharing it across
/// requests wrap it in a mutex so load-modify-persist runs one at a time.
#[derive(Debug)]
pub struct KnowledgeStore {
    path: PathBuf,
    data: StoreFile,
    report: LoadReport,
    connected: bool,
}

impl KnowledgeStore {
    /// Open the store file, never failing.
    ///
    /// A missing or malformed file is replaced by an empty store written back
    /// to disk. A file that exists but cannot be read is left untouched and the
    /// store starts empty in memory, reporting itself as disconnected.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        match read_store_file(&path) {
            Ok((data, report)) => {
                tracing::info!(
                    path = %path.display(),
                    categories = data.knowledge_base.len(),
                    messages = data.messages.len(),
                    "store loaded"
                );
                Self {
                    path,
                    data,
                    report,
                    connected: true,
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(path = %path.display(), "store file not found, creating a new one");
                Self::synthesize(path)
            }
            Err(e @ StoreError::Malformed { .. }) => {
                tracing::warn!(error = %e, "replacing malformed store with an empty one");
                Self::synthesize(path)
            }
            Err(e) => {
                tracing::error!(error = %e, "store unavailable, continuing with an empty in-memory store");
                Self {
                    path,
                    data: StoreFile::default(),
                    report: LoadReport::default(),
                    connected: false,
                }
            }
        }
    }

    fn synthesize(path: PathBuf) -> Self {
        let data = StoreFile::default();
        let connected = match write_store_file(&path, &data) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "empty store created");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create store file");
                false
            }
        };
        Self {
            path,
            data,
            report: LoadReport::default(),
            connected,
        }
    }

    /// Write the whole in-memory store back to its file.
    pub fn persist(&self) -> Result<(), StoreError> {
        write_store_file(&self.path, &self.data)
    }

    /// Aggregate counts over the store plus the current file size.
    pub fn statistics(&self) -> Stats {
        stats::statistics(&self.data, Some(&self.path))
    }

    pub(crate) fn push_message(&mut self, record: ConversationRecord) {
        self.data.messages.push(record);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &StoreFile {
        &self.data
    }

    pub fn into_data(self) -> StoreFile {
        self.data
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.data.knowledge_base
    }

    pub fn messages(&self) -> &[ConversationRecord] {
        &self.data.messages
    }

    /// Entries dropped while validating the file at open time.
    pub fn load_report(&self) -> LoadReport {
        self.report
    }

    /// Whether initialization left a well-formed store file on disk.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
