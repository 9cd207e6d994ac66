use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::TrashError;

/// Persisted metadata for one trashed file.
///
/// Entries are immutable once built: fields are only reachable through
/// accessors. `original_path` and `holding_location` together are enough to
/// put the file back without consulting anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "UUID")]
    identity: Uuid,
    #[serde(rename = "FileName")]
    display_name: String,
    #[serde(rename = "FilePath")]
    original_path: PathBuf,
    #[serde(rename = "BackupFileLocation")]
    holding_location: PathBuf,
    /// Unix seconds.
    #[serde(rename = "DeletedDate")]
    deleted_at: i64,
    /// Byte length observed at deletion time, when it could be observed.
    #[serde(rename = "FileSize", default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

impl Entry {
    pub(crate) fn new(
        identity: Uuid,
        original_path: PathBuf,
        holding_location: PathBuf,
        deleted_at: i64,
        size: Option<u64>,
    ) -> Self {
        let display_name = original_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            identity,
            display_name,
            original_path,
            holding_location,
            deleted_at,
            size,
        }
    }

    pub fn identity(&self) -> Uuid {
        self.identity
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn holding_location(&self) -> &Path {
        &self.holding_location
    }

    pub fn deleted_at(&self) -> i64 {
        self.deleted_at
    }

    pub fn deleted_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.deleted_at, 0)
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }
}

/// Result of a deletion that did not fail.
#[derive(Debug)]
pub enum DeletionOutcome {
    /// Bytes are in holding storage and the original is gone.
    Trashed(Entry),
    /// Bytes are in holding storage but the original could not be removed.
    OriginalRetained { entry: Entry, error: TrashError },
}

impl DeletionOutcome {
    pub fn entry(&self) -> &Entry {
        match self {
            Self::Trashed(entry) => entry,
            Self::OriginalRetained { entry, .. } => entry,
        }
    }

    pub fn warning(&self) -> Option<&TrashError> {
        match self {
            Self::Trashed(_) => None,
            Self::OriginalRetained { error, .. } => Some(error),
        }
    }
}

/// State of the trash as seen by a reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Records whose holding file exists.
    pub live: Vec<Entry>,
    /// Records whose holding file was never created (or is gone).
    pub stale: Vec<Entry>,
    /// Records that could not be read, decoded, or point outside holding storage.
    pub invalid: Vec<(PathBuf, TrashError)>,
    /// Holding files with no matching record.
    pub untracked: Vec<PathBuf>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.stale.is_empty() && self.invalid.is_empty() && self.untracked.is_empty()
    }
}

/// Result of pruning stale records. Failures do not stop the pass.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub pruned: Vec<Entry>,
    pub failed: Vec<(Entry, TrashError)>,
}
