//! Triage history storage.
//!
//! The orchestrator appends one [`HistoryRecord`] per evaluation through the [`HistoryStore`]
//! trait. Appends are serialised by the store's lock; reads return snapshots.

use crate::patient::PatientInput;
use crate::result::TriageResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise history record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("history store lock poisoned")]
    LockPoisoned,
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// One evaluated patient and its outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub patient: PatientInput,
    pub result: TriageResult,
}

impl HistoryRecord {
    pub fn new(patient: PatientInput, result: TriageResult) -> Self {
        Self::at(Utc::now(), patient, result)
    }

    pub fn at(timestamp: DateTime<Utc>, patient: PatientInput, result: TriageResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            patient,
            result,
        }
    }
}

pub trait HistoryStore: Send + Sync {
    fn append(&self, record: HistoryRecord) -> HistoryResult<()>;

    /// Every record, oldest first.
    fn all(&self) -> HistoryResult<Vec<HistoryRecord>>;

    /// Records at or after `cutoff`.
    fn since(&self, cutoff: DateTime<Utc>) -> HistoryResult<Vec<HistoryRecord>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|r| r.timestamp >= cutoff)
            .collect())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, record: HistoryRecord) -> HistoryResult<()> {
        self.records
            .write()
            .map_err(|_| HistoryError::LockPoisoned)?
            .push(record);
        Ok(())
    }

    fn all(&self) -> HistoryResult<Vec<HistoryRecord>> {
        Ok(self
            .records
            .read()
            .map_err(|_| HistoryError::LockPoisoned)?
            .clone())
    }
}

// ============================================================================
// JSON-lines file store
// ============================================================================

/// One JSON record per line.
///
/// A missing file is an empty history. Lines that fail to parse are skipped with a warning so a
/// single damaged write does not hide the rest of the log.
#[derive(Debug)]
pub struct JsonlHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStore for JsonlHistoryStore {
    fn append(&self, record: HistoryRecord) -> HistoryResult<()> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| HistoryError::LockPoisoned)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn all(&self) -> HistoryResult<Vec<HistoryRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    "skipping unreadable history line: {e}"
                ),
            }
        }
        Ok(records)
    }
}
