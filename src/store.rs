//! Metadata store: one JSON record per trashed file, keyed by identity.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::TrashConfig;
use crate::errors::TrashError;
use crate::fs::FileSystem;
use crate::helpers::METADATA_EXTENSION;
use crate::models::Entry;

/// Suffix of the hidden staging file a record is written to before it is renamed.
const STAGING_SUFFIX: &str = ".partial";

pub struct MetadataStore<'a, F: ?Sized> {
    config: &'a TrashConfig,
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> MetadataStore<'a, F> {
    pub fn new(config: &'a TrashConfig, fs: &'a F) -> Self {
        Self { config, fs }
    }

    /// Durably writes the record for `entry` and returns its path.
    ///
    /// The record is staged, synced and renamed into place, so a record file
    /// is either absent or complete. An existing record is never replaced.
    pub fn persist(&self, entry: &Entry) -> crate::Result<PathBuf> {
        let identity = entry.identity();
        let path = self.config.record_path(&identity);
        let bytes = serde_json::to_vec_pretty(entry)
            .map_err(|err| TrashError::MetadataEncode(path.clone(), err))?;

        if self.fs.exists(&path) {
            return Err(TrashError::persist(
                &path,
                io::Error::new(io::ErrorKind::AlreadyExists, "record already exists"),
            ));
        }

        let staging = self
            .config
            .info_dir()
            .join(format!(".{identity}{METADATA_EXTENSION}{STAGING_SUFFIX}"));
        let written = self
            .write_synced(&staging, &bytes)
            .and_then(|()| self.fs.rename(&staging, &path));
        if let Err(err) = written {
            self.discard(&staging);
            return Err(TrashError::persist(&path, err));
        }

        debug!(%identity, record = %path.display(), "persisted metadata record");
        Ok(path)
    }

    pub fn load(&self, identity: &Uuid) -> crate::Result<Entry> {
        self.read_record(&self.config.record_path(identity))
    }

    pub fn read_record(&self, path: &Path) -> crate::Result<Entry> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|err| TrashError::MetadataRead(path.to_path_buf(), err))?;
        serde_json::from_str(&content)
            .map_err(|err| TrashError::MetadataDecode(path.to_path_buf(), err))
    }

    /// Reads every record in the store, sorted by record path.
    ///
    /// Records that fail to read or decode are returned as errors alongside
    /// the rest; staging files are skipped.
    pub fn list(&self) -> crate::Result<Vec<(PathBuf, crate::Result<Entry>)>> {
        let mut paths: Vec<PathBuf> = self
            .fs
            .list_dir(self.config.info_dir())
            .map_err(|err| TrashError::MetadataRead(self.config.info_dir().to_path_buf(), err))?
            .into_iter()
            .filter(|path| is_record_file(path))
            .collect();
        paths.sort();

        Ok(paths
            .into_iter()
            .map(|path| {
                let entry = self.read_record(&path);
                (path, entry)
            })
            .collect())
    }

    /// Removes the record for `identity`.
    pub fn remove(&self, identity: &Uuid) -> crate::Result<()> {
        let path = self.config.record_path(identity);
        self.fs
            .remove_file(&path)
            .map_err(|err| TrashError::persist(&path, err))
    }

    fn write_synced(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = self.fs.create_new(path)?;
        file.write_all(bytes)?;
        file.sync()
    }

    fn discard(&self, path: &Path) {
        match self.fs.remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), error = %err, "could not discard staged record"),
        }
    }
}

fn is_record_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| !name.starts_with('.') && name.ends_with(METADATA_EXTENSION))
        .unwrap_or(false)
}
