//! Idempotent directory provisioning.

use std::io;
use std::path::Path;

use bootmount_common::constants::DEFAULT_DIR_MODE;
use bootmount_common::error::{BootError, Result};

use crate::sys::SystemOps;

/// Ensures `path` exists, creating it and any missing ancestors with `mode`.
///
/// A path that already exists is left untouched and counts as success.
///
/// # Errors
///
/// Returns [`BootError::Create`] for any creation failure other than
/// "already exists".
pub fn ensure_directory(sys: &dyn SystemOps, path: &Path, mode: u32) -> Result<()> {
    match sys.create_dir_all(path, mode) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), mode = format_args!("{mode:04o}"), "directory ensured");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "directory already exists");
            Ok(())
        }
        Err(e) => Err(BootError::Create {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Ensures a mount point exists with no permission bits, so nothing can
/// use it before a filesystem is mounted over it.
///
/// # Errors
///
/// Returns [`BootError::Create`] if the directory cannot be created.
pub fn ensure_mount_point(sys: &dyn SystemOps, path: &Path) -> Result<()> {
    ensure_directory(sys, path, DEFAULT_DIR_MODE)
}
