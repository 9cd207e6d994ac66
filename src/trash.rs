//! End-to-end deletion: build the entry, persist its record, relocate the bytes.
//!
//! The record is always written before any byte is moved. A crash between the
//! two steps leaves the original in place and a stale record whose holding
//! file does not exist, which [`TrashCan::reconcile`] reports and
//! [`TrashCan::prune_stale`] can discard. The reverse order could leave bytes
//! in holding storage with no way back to their original path.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::builder::RecordBuilder;
use crate::config::TrashConfig;
use crate::errors::TrashError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::identity::{IdentitySource, RandomIdentity};
use crate::models::{DeletionOutcome, Entry, PruneReport, ReconcileReport};
use crate::relocator::Relocator;
use crate::store::MetadataStore;

pub struct TrashCan<F = RealFileSystem, I = RandomIdentity> {
    config: TrashConfig,
    fs: F,
    identities: I,
}

impl TrashCan {
    pub fn new(config: TrashConfig) -> Self {
        Self::with_parts(config, RealFileSystem, RandomIdentity)
    }
}

impl<F: FileSystem, I: IdentitySource> TrashCan<F, I> {
    pub fn with_parts(config: TrashConfig, fs: F, identities: I) -> Self {
        Self {
            config,
            fs,
            identities,
        }
    }

    pub fn config(&self) -> &TrashConfig {
        &self.config
    }

    pub fn builder(&self) -> RecordBuilder<'_, F, I> {
        RecordBuilder::new(&self.config, &self.fs, &self.identities)
    }

    pub fn store(&self) -> MetadataStore<'_, F> {
        MetadataStore::new(&self.config, &self.fs)
    }

    pub fn relocator(&self) -> Relocator<'_, F> {
        Relocator::new(&self.fs)
    }

    /// Moves `path` into the trash.
    ///
    /// A failed removal of the original after a complete copy is not an
    /// error: it comes back as [`DeletionOutcome::OriginalRetained`].
    pub fn put(&self, path: &Path) -> crate::Result<DeletionOutcome> {
        let entry = self.builder().create_entry(path)?;
        self.store().persist(&entry)?;

        match self.relocator().relocate(&entry) {
            Ok(bytes) => {
                info!(
                    identity = %entry.identity(),
                    original = %entry.original_path().display(),
                    bytes,
                    "moved file to trash"
                );
                Ok(DeletionOutcome::Trashed(entry))
            }
            Err(error) if error.is_content_safe() => {
                debug!(
                    identity = %entry.identity(),
                    error = %error,
                    "file is in the trash but the original is still in place"
                );
                Ok(DeletionOutcome::OriginalRetained { entry, error })
            }
            Err(error) => {
                debug!(
                    identity = %entry.identity(),
                    error = %error,
                    "relocation failed; record is stale until reconciled"
                );
                Err(error)
            }
        }
    }

    /// Cross-checks records against holding storage.
    ///
    /// A record is only accepted when it sits at the path derived from its own
    /// identity and points at the holding location derived from it. A missing
    /// `files/` directory counts as empty.
    pub fn reconcile(&self) -> crate::Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut tracked = HashSet::new();
        let files_dir = self.fs.canonicalize(self.config.files_dir()).ok();

        for (path, entry) in self.store().list()? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    report.invalid.push((path, err));
                    continue;
                }
            };
            let identity = entry.identity();
            let record = self.config.record_path(&identity);
            if path != record {
                let err = inconsistent(
                    &path,
                    format!("record for {identity} belongs at {}", record.display()),
                );
                report.invalid.push((path, err));
                continue;
            }
            let expected = self.config.holding_location(&identity);
            if !self.holds_at(&entry, &expected, files_dir.as_deref()) {
                let err = inconsistent(
                    &path,
                    format!(
                        "holding location {} does not match {}",
                        entry.holding_location().display(),
                        expected.display()
                    ),
                );
                report.invalid.push((path, err));
                continue;
            }
            let exists = self.fs.exists(&expected);
            tracked.insert(expected);
            if exists {
                report.live.push(entry);
            } else {
                report.stale.push(entry);
            }
        }

        let holding_files = match self.fs.list_dir(self.config.files_dir()) {
            Ok(paths) => paths,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                return Err(TrashError::HoldingRead(
                    self.config.files_dir().to_path_buf(),
                    err,
                ))
            }
        };
        report.untracked = holding_files
            .into_iter()
            .filter(|path| !tracked.contains(path))
            .collect();
        report.untracked.sort();

        Ok(report)
    }

    /// Removes the records of stale entries deleted at least `min_age` ago.
    ///
    /// Younger stale records may belong to a deletion still in flight in
    /// another process and are left alone. A record that cannot be removed is
    /// reported and the pass moves on.
    pub fn prune_stale(&self, report: &ReconcileReport, min_age: Duration) -> PruneReport {
        let now = DateTime::<Utc>::from(self.fs.now()).timestamp();
        let min_age = i64::try_from(min_age.as_secs()).unwrap_or(i64::MAX);
        let store = self.store();
        let mut outcome = PruneReport::default();

        for entry in &report.stale {
            if now.saturating_sub(entry.deleted_at()) < min_age {
                continue;
            }
            // Re-check: the bytes may have landed since the report was taken.
            if self.fs.exists(&self.config.holding_location(&entry.identity())) {
                continue;
            }
            match store.remove(&entry.identity()) {
                Ok(()) => {
                    info!(
                        identity = %entry.identity(),
                        original = %entry.original_path().display(),
                        "pruned stale trash record"
                    );
                    outcome.pruned.push(entry.clone());
                }
                Err(err) => {
                    warn!(
                        identity = %entry.identity(),
                        error = %err,
                        "could not prune stale record"
                    );
                    outcome.failed.push((entry.clone(), err));
                }
            }
        }
        outcome
    }

    /// True when the recorded holding location names `expected`, allowing for
    /// a differently spelled path to the same holding directory.
    fn holds_at(&self, entry: &Entry, expected: &Path, files_dir: Option<&Path>) -> bool {
        let recorded = entry.holding_location();
        if recorded == expected {
            return true;
        }
        if recorded.file_name() != expected.file_name() {
            return false;
        }
        let parent = recorded
            .parent()
            .and_then(|parent| self.fs.canonicalize(parent).ok());
        files_dir.is_some() && parent.as_deref() == files_dir
    }
}

fn inconsistent(record: &Path, message: String) -> TrashError {
    TrashError::MetadataRead(
        record.to_path_buf(),
        io::Error::new(io::ErrorKind::InvalidData, message),
    )
}
