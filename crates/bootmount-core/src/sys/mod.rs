//! Operating-system capability set consumed by the orchestration core.
//!
//! The core never calls the kernel directly. It asks a [`SystemOps`]
//! implementation to stat, create, mount, move, list, remove, and spawn,
//! and interprets the resulting [`std::io::Error`] kinds itself
//! (`NotFound`, `AlreadyExists`).

pub mod linux;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use bootmount_common::types::MountFlags;

pub use linux::HostSystem;

/// The subset of `stat(2)` the core relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Owning user ID.
    pub uid: u32,
    /// Owning group ID.
    pub gid: u32,
    /// Whether the path is a regular file.
    pub is_file: bool,
    /// Whether the path is a directory.
    pub is_dir: bool,
}

/// Everything needed to launch a detached process under a given identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments after the program name.
    pub args: Vec<String>,
    /// Working directory of the child.
    pub cwd: PathBuf,
    /// User ID the child runs as.
    pub uid: u32,
    /// Group ID the child runs as.
    pub gid: u32,
    /// Environment variables removed from the inherited environment.
    pub env_remove: Vec<String>,
}

/// Host primitives used by provisioning, mounting, relocation, and handoff.
///
/// Implementors must report "path missing" as [`io::ErrorKind::NotFound`]
/// and "path present" on creation as [`io::ErrorKind::AlreadyExists`].
pub trait SystemOps: Send + Sync {
    /// Returns ownership and type information for `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be stat'ed.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Creates `path` and any missing ancestors with permission `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if any directory cannot be created.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Mounts `device` of type `fs_type` on `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `mount(2)` call fails.
    fn mount(
        &self,
        device: &Path,
        target: &Path,
        fs_type: &str,
        flags: &MountFlags,
        data: &str,
    ) -> io::Result<()>;

    /// Atomically moves the mount at `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the move-mount fails.
    fn mount_move(&self, source: &Path, target: &Path) -> io::Result<()>;

    /// Lists the entry names of a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>>;

    /// Removes an empty directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Starts a process without waiting on it and returns its PID.
    ///
    /// The child is never reaped; a long-lived caller must reap exited
    /// children itself or they remain zombies.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started.
    fn spawn_detached(&self, spec: &SpawnSpec) -> io::Result<u32>;
}
