//! Relocator: copy-then-delete of a file's bytes into holding storage.

use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::errors::TrashError;
use crate::fs::FileSystem;
use crate::models::Entry;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

pub struct Relocator<'a, F: ?Sized> {
    fs: &'a F,
}

/// Which side of the copy failed.
enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

impl<'a, F: FileSystem + ?Sized> Relocator<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Moves the bytes at `entry.original_path()` to `entry.holding_location()`.
    ///
    /// The caller must have persisted the entry's record first. The original
    /// is removed only after the holding copy is complete and synced; if that
    /// removal fails the copy is kept and `OriginalRemoval` is returned. Any
    /// failure before that point leaves no holding file behind.
    pub fn relocate(&self, entry: &Entry) -> crate::Result<u64> {
        let original = entry.original_path();
        let holding = entry.holding_location();

        let copied = self.copy_to_holding(original, holding)?;
        debug!(
            identity = %entry.identity(),
            bytes = copied,
            holding = %holding.display(),
            "copied file into holding storage"
        );

        self.fs
            .remove_file(original)
            .map_err(|err| TrashError::OriginalRemoval(original.to_path_buf(), err))?;
        Ok(copied)
    }

    /// Copies and verifies. Both handles are closed before this returns.
    fn copy_to_holding(&self, original: &Path, holding: &Path) -> crate::Result<u64> {
        let mut source = self
            .fs
            .open_file(original)
            .map_err(|err| TrashError::source_unavailable(original, err))?;
        let mut dest = self
            .fs
            .create_new(holding)
            .map_err(|err| TrashError::holding_write(holding, err))?;

        let result = match copy_stream(&mut source, &mut dest) {
            Ok(copied) => dest
                .flush()
                .and_then(|()| dest.sync())
                .map(|()| copied)
                .map_err(|err| TrashError::holding_write(holding, err)),
            Err(CopyError::Read(err)) => Err(TrashError::source_unavailable(original, err)),
            Err(CopyError::Write(err)) => Err(TrashError::holding_write(holding, err)),
        };
        drop(dest);
        drop(source);

        let result = result.and_then(|copied| self.verify_length(holding, copied));
        if result.is_err() {
            self.discard_partial(holding);
        }
        result
    }

    fn verify_length(&self, holding: &Path, copied: u64) -> crate::Result<u64> {
        let on_disk = self
            .fs
            .symlink_metadata(holding)
            .map_err(|err| TrashError::holding_write(holding, err))?
            .len();
        if on_disk != copied {
            return Err(TrashError::holding_write(
                holding,
                io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("holding file has {on_disk} bytes, expected {copied}"),
                ),
            ));
        }
        Ok(copied)
    }

    fn discard_partial(&self, holding: &Path) {
        match self.fs.remove_file(holding) {
            Ok(()) => debug!(holding = %holding.display(), "removed partial holding file"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                holding = %holding.display(),
                error = %err,
                "could not remove partial holding file"
            ),
        }
    }
}

fn copy_stream<R, W>(reader: &mut R, writer: &mut W) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(CopyError::Read(err)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
    }
}
