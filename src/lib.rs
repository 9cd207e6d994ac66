//! Recoverable file deletion.
//!
//! A deleted file gets a fresh identity and a JSON record under `info/`
//! describing where it came from, then its bytes are copied into `files/`
//! and the original is removed. Everything needed to put the file back is
//! in the record.

pub mod builder;
pub mod config;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod identity;
pub mod models;
pub mod relocator;
pub mod store;
pub mod trash;

pub use builder::{resolve_original_path, RecordBuilder};
pub use config::{TrashConfig, DEFAULT_TRASH_DIR};
pub use errors::{Result, TrashError};
pub use fs::{FileSystem, RealFileSystem, SyncWrite};
pub use helpers::{
    describe_error,
    format_deleted_at,
    print_size,
    sanitize_user_path,
    DELETED_AT_FORMAT,
    METADATA_EXTENSION,
};
pub use identity::{IdentitySource, RandomIdentity};
pub use models::{DeletionOutcome, Entry, PruneReport, ReconcileReport};
pub use relocator::Relocator;
pub use store::MetadataStore;
pub use trash::TrashCan;

/// Re-export a small stable API surface for the binaries.
pub mod prelude {
    pub use crate::{
        config::TrashConfig,
        errors::{Result, TrashError},
        fs::{FileSystem, RealFileSystem},
        helpers::*,
        models::*,
        trash::TrashCan,
    };
}
