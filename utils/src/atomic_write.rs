//! Crash-safe file replacement.
//!
//! Writes go to a temp file in the destination directory and are renamed into
//! place. Where rename cannot replace an existing file, the old file is moved
//! to `<name>.bak` first and restored if the second rename fails; a crash in
//! that window leaves the `.bak` behind for [`recover_bak_file`].

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Whether data is flushed to stable storage before the rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// `sync_all` the temp file, then best-effort sync the parent directory.
    #[default]
    Synced,
    /// Skip syncing. Suitable for tests and scratch data.
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    pub durability: Durability,
    /// Unix permission bits applied to the written file.
    pub mode: Option<u32>,
}

impl WriteOptions {
    /// Owner read/write only.
    #[must_use]
    pub fn private() -> Self {
        Self {
            durability: Durability::Synced,
            mode: Some(0o600),
        }
    }
}

/// Path of the backup sibling used during replacement.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Restore `<path>.bak` if `path` went missing mid-replacement.
///
/// Returns `true` when a backup was moved back into place.
pub fn recover_bak_file(path: &Path) -> bool {
    let backup = backup_path(path);
    if path.exists() || !backup.exists() {
        return false;
    }
    match fs::rename(&backup, path) {
        Ok(()) => {
            tracing::warn!(path = %path.display(), "Restored snapshot from interrupted write");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Could not restore .bak file: {e}");
            false
        }
    }
}

pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with_options(path, bytes, WriteOptions::default())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

fn sync_parent_dir(parent: &Path) {
    #[cfg(unix)]
    if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
        tracing::debug!(path = %parent.display(), "Parent directory sync failed: {e}");
    }
    #[cfg(not(unix))]
    let _ = parent;
}

pub fn atomic_write_with_options(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: WriteOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let parent = parent_dir(path);

    let mut tmp = NamedTempFile::new_in(parent)?;
    apply_mode(tmp.path(), options.mode)?;
    tmp.write_all(bytes)?;
    if options.durability == Durability::Synced {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }
        let backup = backup_path(path);
        let _ = fs::remove_file(&backup);
        fs::rename(path, &backup)?;
        if let Err(retry) = err.file.persist(path) {
            let _ = fs::rename(&backup, path);
            return Err(retry.error);
        }
        if let Err(e) = fs::remove_file(&backup) {
            tracing::warn!(path = %backup.display(), "Could not remove .bak after write: {e}");
        }
    }

    if options.durability == Durability::Synced {
        sync_parent_dir(parent);
    }
    Ok(())
}
