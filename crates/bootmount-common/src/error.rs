//! Unified error types for the bootmount workspace.
//!
//! Every failure the boot helper can report to its caller is a variant of
//! [`BootError`]. Only two conditions are tolerated silently by the core:
//! "already exists" when provisioning a directory, and a non-empty source
//! directory after a subtree move.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BootError {
    /// Directory provisioning failed for a reason other than pre-existence.
    #[error("cannot create directory {path}: {source}")]
    Create {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No device could be resolved from a path or a device binding.
    #[error("{name} filesystem not defined")]
    UndefinedDevice {
        /// Binding name (or `undefined` for a missing device path).
        name: String,
    },

    /// The underlying `mount(2)` primitive failed.
    #[error("mounting {device} on {target} failed: {source}")]
    Mount {
        /// Device that was being mounted.
        device: PathBuf,
        /// Mount point.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A move-mount of an existing subtree failed.
    #[error("moving mount {from} to {to} failed: {source}")]
    Move {
        /// Existing mount point.
        from: PathBuf,
        /// New location of the subtree.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The home directory handed to init does not exist.
    #[error("{path} not found")]
    HomeNotFound {
        /// Home directory path.
        path: PathBuf,
    },

    /// The home directory has no `init` entry.
    #[error("{path} not found")]
    InitNotFound {
        /// Expected init executable path.
        path: PathBuf,
    },

    /// The init entry exists but is not a regular file.
    #[error("{path} is not a file")]
    NotAFile {
        /// Init path that is not a regular file.
        path: PathBuf,
    },

    /// The init executable is not owned by the owner of its home.
    #[error("{home} uid & gid don't match with its init")]
    OwnershipMismatch {
        /// Home directory path.
        home: PathBuf,
        /// Owner of the home directory as `(uid, gid)`.
        home_owner: (u32, u32),
        /// Owner of the init executable as `(uid, gid)`.
        init_owner: (u32, u32),
    },

    /// The validated init executable could not be started.
    #[error("cannot spawn {path}: {source}")]
    Spawn {
        /// Executable that failed to start.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Any other I/O operation failed (stat, readdir, rmdir).
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl BootError {
    /// Returns `true` for the handoff validation failures that reject a home
    /// before anything is spawned.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::HomeNotFound { .. }
                | Self::InitNotFound { .. }
                | Self::NotAFile { .. }
                | Self::OwnershipMismatch { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BootError>;
