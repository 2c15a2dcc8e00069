//! Privileged handoff to per-user init processes.
//!
//! A home directory receives an init process only when `<home>/init` is a
//! regular file owned by exactly the same uid and gid as the home itself.
//! That ownership match is the sole authorization gate: it keeps a user from
//! planting an init that would run under someone else's identity.
//!
//! Once validation passes the init is launched detached and forgotten. A
//! spawn failure is logged and returned in the [`Launch`] report instead of
//! failing the call, because the caller has nothing left to roll back.

use std::io;
use std::path::{Path, PathBuf};

use bootmount_common::constants::INIT_FILE_NAME;
use bootmount_common::error::{BootError, Result};
use bootmount_common::types::HomeDescriptor;

use crate::sys::{FileStat, SpawnSpec, SystemOps};

/// Result of a validated handoff.
#[derive(Debug)]
pub enum Launch {
    /// The init process was started and is no longer tracked.
    Detached {
        /// PID of the started process.
        pid: u32,
    },
    /// The init process could not be started.
    SpawnFailed(BootError),
}

impl Launch {
    /// PID of the detached process, if it started.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        match self {
            Self::Detached { pid } => Some(*pid),
            Self::SpawnFailed(_) => None,
        }
    }

    /// The spawn error, if the process did not start.
    #[must_use]
    pub const fn spawn_error(&self) -> Option<&BootError> {
        match self {
            Self::Detached { .. } => None,
            Self::SpawnFailed(err) => Some(err),
        }
    }
}

/// Checks `home` and its init executable and describes who may run it.
///
/// # Errors
///
/// Returns [`BootError::HomeNotFound`], [`BootError::InitNotFound`],
/// [`BootError::NotAFile`], or [`BootError::OwnershipMismatch`] when the
/// home is rejected, and [`BootError::Io`] for any other stat failure.
pub fn validate_home(sys: &dyn SystemOps, home: &Path) -> Result<HomeDescriptor> {
    let home_stat = stat_or(sys, home, |path| BootError::HomeNotFound { path })?;

    let init = home.join(INIT_FILE_NAME);
    let init_stat = stat_or(sys, &init, |path| BootError::InitNotFound { path })?;

    if !init_stat.is_file {
        return Err(BootError::NotAFile { path: init });
    }

    if (home_stat.uid, home_stat.gid) != (init_stat.uid, init_stat.gid) {
        return Err(BootError::OwnershipMismatch {
            home: home.to_path_buf(),
            home_owner: (home_stat.uid, home_stat.gid),
            init_owner: (init_stat.uid, init_stat.gid),
        });
    }

    Ok(HomeDescriptor {
        home: home.to_path_buf(),
        uid: home_stat.uid,
        gid: home_stat.gid,
        init,
    })
}

/// Validates `home` and launches its init as the home's owner.
///
/// The child runs in `home` with inherited standard streams, in its own
/// process group, without the variables listed in `env_remove`.
///
/// # Errors
///
/// Returns the validation errors of [`validate_home`]. Spawn failures are
/// not errors; they are reported through [`Launch::SpawnFailed`].
pub fn exec_init(
    sys: &dyn SystemOps,
    home: &Path,
    args: &[String],
    env_remove: &[String],
) -> Result<Launch> {
    let descriptor = validate_home(sys, home)?;
    let spec = SpawnSpec {
        program: descriptor.init.clone(),
        args: args.to_vec(),
        cwd: descriptor.home.clone(),
        uid: descriptor.uid,
        gid: descriptor.gid,
        env_remove: env_remove.to_vec(),
    };

    match sys.spawn_detached(&spec) {
        Ok(pid) => {
            tracing::info!(
                init = %descriptor.init.display(),
                pid,
                uid = descriptor.uid,
                gid = descriptor.gid,
                "init launched"
            );
            Ok(Launch::Detached { pid })
        }
        Err(e) => {
            tracing::error!(init = %descriptor.init.display(), error = %e, "init spawn failed");
            Ok(Launch::SpawnFailed(BootError::Spawn {
                path: descriptor.init,
                source: e,
            }))
        }
    }
}

/// Lists the directories inside `dir`, sorted, as candidate homes.
///
/// Entries that vanish before they can be stat'ed, such as dangling
/// symlinks, are skipped.
///
/// # Errors
///
/// Returns [`BootError::Io`] if `dir` or one of its entries cannot be read.
pub fn discover_homes(sys: &dyn SystemOps, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut homes = Vec::new();
    for name in sys.read_dir(dir).map_err(io_error(dir))? {
        let candidate = dir.join(name);
        match sys.stat(&candidate) {
            Ok(stat) if stat.is_dir => homes.push(candidate),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(entry = %candidate.display(), "stale home entry skipped");
            }
            Err(e) => return Err(io_error(&candidate)(e)),
        }
    }
    homes.sort();
    tracing::debug!(dir = %dir.display(), count = homes.len(), "homes discovered");
    Ok(homes)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BootError {
    let path = path.to_path_buf();
    move |source| BootError::Io { path, source }
}

fn stat_or(
    sys: &dyn SystemOps,
    path: &Path,
    not_found: impl FnOnce(PathBuf) -> BootError,
) -> Result<FileStat> {
    sys.stat(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            not_found(path.to_path_buf())
        } else {
            io_error(path)(e)
        }
    })
}
