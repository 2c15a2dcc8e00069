//! Atomic relocation of mounted subtrees.
//!
//! The move itself is a single `MS_MOVE` mount, so the subtree is never
//! observably unmounted. Afterwards the vacated source directory is removed
//! if, and only if, it is empty.

use std::path::Path;

use bootmount_common::error::{BootError, Result};

use super::provision::ensure_mount_point;
use crate::sys::SystemOps;

/// What happened to the source directory after a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The source was empty and has been removed.
    SourceRemoved,
    /// The source still had entries and was left in place.
    SourceKept {
        /// Number of entries found in the source.
        entries: usize,
    },
}

/// Moves the mount at `source` to `target` and cleans up `source`.
///
/// # Errors
///
/// Returns [`BootError::Move`] if the move-mount fails, or
/// [`BootError::Io`] if the source cannot be listed or removed.
pub fn move_subtree(sys: &dyn SystemOps, source: &Path, target: &Path) -> Result<MoveOutcome> {
    sys.mount_move(source, target).map_err(|e| BootError::Move {
        from: source.to_path_buf(),
        to: target.to_path_buf(),
        source: e,
    })?;
    tracing::info!(from = %source.display(), to = %target.display(), "subtree moved");

    let entries = sys.read_dir(source).map_err(|e| BootError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    if !entries.is_empty() {
        tracing::warn!(
            path = %source.display(),
            entries = entries.len(),
            "source not empty after move, leaving it in place"
        );
        return Ok(MoveOutcome::SourceKept {
            entries: entries.len(),
        });
    }

    sys.remove_dir(source).map_err(|e| BootError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %source.display(), "vacated mount point removed");
    Ok(MoveOutcome::SourceRemoved)
}

/// Provisions `target`, then moves the mount at `source` onto it.
///
/// # Errors
///
/// Returns [`BootError::Create`] if `target` cannot be provisioned, in which
/// case no move is attempted; otherwise the errors of [`move_subtree`].
pub fn move_create(sys: &dyn SystemOps, source: &Path, target: &Path) -> Result<MoveOutcome> {
    ensure_mount_point(sys, target)?;
    move_subtree(sys, source, target)
}
