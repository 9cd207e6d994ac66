use std::{io, path::PathBuf};

/// Error type shared by the record builder, metadata store and relocator.
#[derive(thiserror::Error, Debug)]
pub enum TrashError {
    /// The input path could not be made absolute.
    #[error("cannot resolve path {0}")]
    PathResolution(PathBuf, #[source] io::Error),

    /// No unused identity could be produced.
    #[error("cannot generate a unique identity: {0}")]
    IdentityGeneration(String),

    /// The metadata record could not be written.
    #[error("cannot persist metadata record {0}")]
    MetadataPersist(PathBuf, #[source] io::Error),

    /// The metadata record could not be serialized.
    #[error("cannot encode metadata record {0}")]
    MetadataEncode(PathBuf, #[source] serde_json::Error),

    #[error("cannot read metadata record {0}")]
    MetadataRead(PathBuf, #[source] io::Error),

    #[error("malformed metadata record {0}")]
    MetadataDecode(PathBuf, #[source] serde_json::Error),

    /// Holding storage could not be listed.
    #[error("cannot read holding storage {0}")]
    HoldingRead(PathBuf, #[source] io::Error),

    /// The original file is missing or unreadable.
    #[error("source file {0} is unavailable")]
    SourceUnavailable(PathBuf, #[source] io::Error),

    /// The holding-storage file could not be created or written.
    #[error("cannot write holding file {0}")]
    HoldingWrite(PathBuf, #[source] io::Error),

    /// The copy is complete but the original is still in place.
    #[error("file was copied to the trash but {0} could not be removed")]
    OriginalRemoval(PathBuf, #[source] io::Error),
}

impl TrashError {
    pub fn path_resolution(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::PathResolution(path.into(), error)
    }

    pub fn identity(message: impl Into<String>) -> Self {
        Self::IdentityGeneration(message.into())
    }

    pub fn persist(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::MetadataPersist(path.into(), error)
    }

    pub fn source_unavailable(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::SourceUnavailable(path.into(), error)
    }

    pub fn holding_write(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::HoldingWrite(path.into(), error)
    }

    /// True when the file content is already safe in holding storage despite the error.
    pub fn is_content_safe(&self) -> bool {
        matches!(self, Self::OriginalRemoval(..))
    }
}

/// Shared result alias for the crate.
pub type Result<T> = std::result::Result<T, TrashError>;
