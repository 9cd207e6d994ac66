//! Trash layout: where file bytes and metadata records live.

use crate::errors::TrashError;
use crate::fs::FileSystem;
use crate::helpers::METADATA_EXTENSION;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Directory name used for holding storage under the trash root.
pub const FILES_DIR_NAME: &str = "files";

/// Directory name used for metadata records under the trash root.
pub const INFO_DIR_NAME: &str = "info";

/// Default trash root, relative to the working directory.
pub const DEFAULT_TRASH_DIR: &str = "Trash";

/// Holding-storage root and metadata root, built once at start-up and passed
/// explicitly to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashConfig {
    root: PathBuf,
    files_dir: PathBuf,
    info_dir: PathBuf,
}

impl TrashConfig {
    /// Builds a config from an already absolute root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            files_dir: root.join(FILES_DIR_NAME),
            info_dir: root.join(INFO_DIR_NAME),
            root,
        }
    }

    /// Builds a config, joining a relative root to the working directory.
    ///
    /// An existing root is canonicalized; a missing one is kept as joined
    /// until [`TrashConfig::canonicalize`] is called after the layout exists.
    pub fn resolve<F: FileSystem>(root: &Path, fs: &F) -> crate::Result<Self> {
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            fs.current_dir()
                .map_err(|err| TrashError::path_resolution(root, err))?
                .join(root)
        };
        let root = fs.canonicalize(&absolute).unwrap_or(absolute);
        Ok(Self::new(root))
    }

    /// Re-roots the config at the canonical form of its root, which must exist.
    ///
    /// Holding locations are recorded from this root, so every spelling of
    /// the same trash directory yields the same paths.
    pub fn canonicalize<F: FileSystem>(self, fs: &F) -> crate::Result<Self> {
        let root = fs
            .canonicalize(&self.root)
            .map_err(|err| TrashError::path_resolution(&self.root, err))?;
        Ok(Self::new(root))
    }

    /// Creates the holding and metadata directories if they are missing.
    pub fn ensure_layout<F: FileSystem>(&self, fs: &F) -> crate::Result<()> {
        fs.create_dir_all(&self.files_dir)
            .map_err(|err| TrashError::holding_write(&self.files_dir, err))?;
        fs.create_dir_all(&self.info_dir)
            .map_err(|err| TrashError::persist(&self.info_dir, err))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn info_dir(&self) -> &Path {
        &self.info_dir
    }

    /// Holding-storage path for an identity: `files/<identity>`.
    pub fn holding_location(&self, identity: &Uuid) -> PathBuf {
        self.files_dir.join(identity.to_string())
    }

    /// Metadata record path for an identity: `info/<identity>.json`.
    pub fn record_path(&self, identity: &Uuid) -> PathBuf {
        self.info_dir.join(format!("{identity}{METADATA_EXTENSION}"))
    }
}
