//! Record builder: turns a user-supplied path into an [`Entry`].
//!
//! Building an entry has no filesystem side effects. It resolves the path,
//! draws an identity, stamps the deletion time and observes the file size;
//! nothing is created until the entry is persisted.

use chrono::{DateTime, Utc};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::config::TrashConfig;
use crate::errors::TrashError;
use crate::fs::FileSystem;
use crate::identity::IdentitySource;
use crate::models::Entry;

pub struct RecordBuilder<'a, F: ?Sized, I: ?Sized> {
    config: &'a TrashConfig,
    fs: &'a F,
    identities: &'a I,
}

impl<'a, F, I> RecordBuilder<'a, F, I>
where
    F: FileSystem + ?Sized,
    I: IdentitySource + ?Sized,
{
    pub fn new(config: &'a TrashConfig, fs: &'a F, identities: &'a I) -> Self {
        Self {
            config,
            fs,
            identities,
        }
    }

    /// Builds the entry for `path`. The returned value is owned by the caller.
    pub fn create_entry(&self, path: &Path) -> crate::Result<Entry> {
        let original_path = resolve_original_path(path, self.fs)?;
        let identity = self.fresh_identity()?;
        let holding_location = self.config.holding_location(&identity);
        let deleted_at = DateTime::<Utc>::from(self.fs.now()).timestamp();
        let size = self
            .fs
            .symlink_metadata(&original_path)
            .ok()
            .filter(|metadata| metadata.is_file())
            .map(|metadata| metadata.len());

        debug!(
            %identity,
            original = %original_path.display(),
            ?size,
            "built trash entry"
        );
        Ok(Entry::new(
            identity,
            original_path,
            holding_location,
            deleted_at,
            size,
        ))
    }

    fn fresh_identity(&self) -> crate::Result<Uuid> {
        let identity = self.identities.next_identity()?;
        if identity.is_nil() {
            return Err(TrashError::identity("identity source produced the nil UUID"));
        }
        if self.fs.exists(&self.config.holding_location(&identity))
            || self.fs.exists(&self.config.record_path(&identity))
        {
            return Err(TrashError::identity(format!(
                "identity {identity} is already in use"
            )));
        }
        Ok(identity)
    }
}

/// Makes `path` absolute without following a symlink in its last component.
///
/// Relative paths are joined to the working directory, the parent directory is
/// canonicalized and the final name is appended as given. The file itself does
/// not have to exist; its parent does.
pub fn resolve_original_path<F: FileSystem + ?Sized>(
    path: &Path,
    fs: &F,
) -> crate::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        fs.current_dir()
            .map_err(|err| TrashError::path_resolution(path, err))?
            .join(path)
    };

    let name = match absolute.components().next_back() {
        Some(Component::Normal(name)) => name.to_os_string(),
        _ => {
            return Err(TrashError::path_resolution(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "path does not name a file"),
            ))
        }
    };
    let parent = absolute.parent().ok_or_else(|| {
        TrashError::path_resolution(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory"),
        )
    })?;
    let parent = fs
        .canonicalize(parent)
        .map_err(|err| TrashError::path_resolution(path, err))?;

    Ok(parent.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::testing::FaultyFileSystem;
    use crate::identity::testing::{ExhaustedIdentity, FixedIdentity};
    use crate::identity::RandomIdentity;
    use crate::RealFileSystem;
    use std::fs;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, TrashConfig) {
        let temp = TempDir::new().unwrap();
        let base = temp.path().canonicalize().unwrap();
        let config = TrashConfig::new(base.join("Trash"));
        config.ensure_layout(&RealFileSystem).unwrap();
        (temp, base, config)
    }

    #[test]
    fn relative_path_is_resolved_against_working_directory() {
        let (_temp, base, config) = setup();
        fs::write(base.join("report.txt"), b"hello\n").unwrap();
        let fs = FaultyFileSystem {
            cwd: Some(base.clone()),
            clock: Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
            ..Default::default()
        };

        let entry = RecordBuilder::new(&config, &fs, &RandomIdentity)
            .create_entry(Path::new("report.txt"))
            .unwrap();

        assert_eq!(entry.original_path(), base.join("report.txt"));
        assert_eq!(entry.display_name(), "report.txt");
        assert_eq!(entry.deleted_at(), 1_700_000_000);
        assert_eq!(entry.size(), Some(6));
        assert_eq!(
            entry.holding_location(),
            config.holding_location(&entry.identity())
        );
        assert!(entry.holding_location().starts_with(config.files_dir()));
    }

    #[test]
    fn building_has_no_side_effects() {
        let (_temp, base, config) = setup();
        let original = base.join("report.txt");
        fs::write(&original, b"hello\n").unwrap();

        let entry = RecordBuilder::new(&config, &RealFileSystem, &RandomIdentity)
            .create_entry(&original)
            .unwrap();

        assert!(original.exists());
        assert!(!entry.holding_location().exists());
        assert!(!config.record_path(&entry.identity()).exists());
    }

    #[test]
    fn dot_segments_are_resolved_in_the_parent() {
        let (_temp, base, config) = setup();
        fs::create_dir(base.join("sub")).unwrap();
        fs::write(base.join("a.txt"), b"a").unwrap();

        let entry = RecordBuilder::new(&config, &RealFileSystem, &RandomIdentity)
            .create_entry(&base.join("sub").join("..").join("a.txt"))
            .unwrap();

        assert_eq!(entry.original_path(), base.join("a.txt"));
    }

    #[test]
    fn missing_file_in_existing_directory_still_builds() {
        let (_temp, base, config) = setup();

        let entry = RecordBuilder::new(&config, &RealFileSystem, &RandomIdentity)
            .create_entry(&base.join("missing.txt"))
            .unwrap();

        assert_eq!(entry.original_path(), base.join("missing.txt"));
        assert_eq!(entry.size(), None);
    }

    #[test]
    fn missing_parent_directory_fails_resolution() {
        let (_temp, base, config) = setup();

        let err = RecordBuilder::new(&config, &RealFileSystem, &RandomIdentity)
            .create_entry(&base.join("nope").join("file.txt"))
            .unwrap_err();

        assert!(matches!(err, TrashError::PathResolution(..)), "{err:?}");
    }

    #[test]
    fn root_and_parent_dir_do_not_name_a_file() {
        let (_temp, base, config) = setup();
        let builder = RecordBuilder::new(&config, &RealFileSystem, &RandomIdentity);

        for path in [PathBuf::from("/"), base.join("..")] {
            let err = builder.create_entry(&path).unwrap_err();
            assert!(matches!(err, TrashError::PathResolution(..)), "{path:?}");
        }
    }

    #[test]
    fn identity_already_in_use_is_rejected() {
        let (_temp, base, config) = setup();
        fs::write(base.join("a.txt"), b"a").unwrap();
        let taken = Uuid::new_v4();
        fs::write(config.record_path(&taken), b"{}").unwrap();

        let err = RecordBuilder::new(&config, &RealFileSystem, &FixedIdentity(taken))
            .create_entry(&base.join("a.txt"))
            .unwrap_err();

        assert!(matches!(err, TrashError::IdentityGeneration(_)), "{err:?}");
    }

    #[test]
    fn nil_and_exhausted_identities_fail() {
        let (_temp, base, config) = setup();
        let path = base.join("a.txt");

        let err = RecordBuilder::new(&config, &RealFileSystem, &FixedIdentity(Uuid::nil()))
            .create_entry(&path)
            .unwrap_err();
        assert!(matches!(err, TrashError::IdentityGeneration(_)));

        let err = RecordBuilder::new(&config, &RealFileSystem, &ExhaustedIdentity)
            .create_entry(&path)
            .unwrap_err();
        assert!(matches!(err, TrashError::IdentityGeneration(_)));
    }
}
