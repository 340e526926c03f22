//! Scoped backup and restore of a directory tree.
//!
//! [`with_snapshot`] copies a directory to temporary storage, hands the
//! directory to a closure, and puts the original contents back afterwards
//! whatever the closure returned. If the closure panics, [`DirSnapshot`]'s
//! `Drop` performs the restoration while unwinding.

use crate::error::{CheckError, Result};
use crate::fs_utils::{clear_dir, copy_dir_recursive};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error, warn};

const SNAPSHOT_DIR_NAME: &str = "snapshot";

/// A full copy of a directory held in temporary storage until it is restored.
#[must_use = "dropping a snapshot restores the directory immediately"]
pub struct DirSnapshot {
    source: PathBuf,
    /// `source` with symlinks resolved; restoration rewrites this directory
    /// and leaves any link in front of it alone.
    dir: PathBuf,
    storage: Option<TempDir>,
}

impl DirSnapshot {
    pub fn capture(source: &Path) -> Result<Self> {
        if !source.is_dir() {
            return Err(CheckError::Snapshot {
                message: format!("not a directory: {}", source.display()),
            });
        }

        let dir = fs::canonicalize(source).map_err(|err| CheckError::Snapshot {
            message: format!("resolve {}: {err}", source.display()),
        })?;

        let storage = tempfile::Builder::new()
            .prefix("plan-check-snapshot-")
            .tempdir()?;
        let copy = storage.path().join(SNAPSHOT_DIR_NAME);
        copy_dir_recursive(&dir, &copy).map_err(|err| CheckError::Snapshot {
            message: format!("copy {} -> {}: {err}", dir.display(), copy.display()),
        })?;

        debug!(
            source = %source.display(),
            dir = %dir.display(),
            storage = %storage.path().display(),
            "captured directory snapshot"
        );

        Ok(Self {
            source: source.to_path_buf(),
            dir,
            storage: Some(storage),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Location of the copied tree, while the snapshot is still held.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.storage
            .as_ref()
            .map(|storage| storage.path().join(SNAPSHOT_DIR_NAME))
    }

    /// Replaces the directory's contents with the snapshot and removes the
    /// temporary storage.
    pub fn restore(mut self) -> Result<()> {
        match self.storage.take() {
            Some(storage) => restore_from(&self.dir, storage),
            None => Ok(()),
        }
    }
}

impl Drop for DirSnapshot {
    fn drop(&mut self) {
        let Some(storage) = self.storage.take() else {
            return;
        };
        if let Err(err) = restore_from(&self.dir, storage) {
            error!(source = %self.source.display(), error = %err, "snapshot restore failed during drop");
            eprintln!(
                "{}",
                t!(
                    "snapshot.drop_restore_failed",
                    path = self.source.display().to_string(),
                    error = err.to_string()
                )
            );
        }
    }
}

fn restore_from(dir: &Path, storage: TempDir) -> Result<()> {
    let copy = storage.path().join(SNAPSHOT_DIR_NAME);
    let restored = replace_contents(dir, &copy).map_err(|err| CheckError::Restore {
        path: dir.to_path_buf(),
        source: err,
    });

    let storage_path = storage.path().to_path_buf();
    if let Err(err) = storage.close() {
        warn!(
            storage = %storage_path.display(),
            error = %err,
            "failed to remove snapshot storage"
        );
    }

    restored?;
    debug!(dir = %dir.display(), "restored directory snapshot");
    Ok(())
}

fn replace_contents(dir: &Path, copy: &Path) -> io::Result<()> {
    // Never touch the directory unless there is something to put back.
    if !copy.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("snapshot copy missing at {}", copy.display()),
        ));
    }

    // `dir` is already resolved, so anything other than a directory here was
    // put in its place by the enclosed code.
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => clear_dir(dir)?,
        Ok(_) => fs::remove_file(dir)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    copy_dir_recursive(copy, dir)
}

/// Runs `body` with `source` snapshotted, restoring it on every exit path.
///
/// Restoration always runs before an error from `body` is returned. When both
/// fail, the returned error carries both.
pub fn with_snapshot<T, F>(source: &Path, body: F) -> Result<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    let snapshot = DirSnapshot::capture(source)?;
    let outcome = body(snapshot.source());
    let restored = snapshot.restore();
    settle(outcome, restored)
}

fn settle<T>(outcome: Result<T>, restored: Result<()>) -> Result<T> {
    match (outcome, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(err), Ok(())) => Err(err),
        (Ok(_), Err(restore)) => Err(restore),
        (Err(original), Err(restore)) => Err(CheckError::RestoreAfterFailure {
            original: Box::new(original),
            restore: Box::new(restore),
        }),
    }
}
