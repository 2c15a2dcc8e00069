//! [`SystemOps`] backed by the running kernel.

use std::ffi::OsString;
use std::io;
use std::os::unix::fs::{DirBuilderExt, MetadataExt};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

use bootmount_common::types::MountFlags;

use super::{FileStat, SpawnSpec, SystemOps};

/// Host implementation using `std::fs`, `std::process`, and `mount(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSystem;

impl HostSystem {
    /// Creates a handle to the host system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SystemOps for HostSystem {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = std::fs::metadata(path)?;
        Ok(FileStat {
            uid: meta.uid(),
            gid: meta.gid(),
            is_file: meta.is_file(),
            is_dir: meta.is_dir(),
        })
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(mode)
            .create(path)
    }

    #[cfg(target_os = "linux")]
    fn mount(
        &self,
        device: &Path,
        target: &Path,
        fs_type: &str,
        flags: &MountFlags,
        data: &str,
    ) -> io::Result<()> {
        let ms_flags = ms_flags(flags)?;
        nix::mount::mount(Some(device), target, Some(fs_type), ms_flags, Some(data))?;
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn mount(
        &self,
        _device: &Path,
        _target: &Path,
        _fs_type: &str,
        _flags: &MountFlags,
        _data: &str,
    ) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "mount requires Linux",
        ))
    }

    #[cfg(target_os = "linux")]
    fn mount_move(&self, source: &Path, target: &Path) -> io::Result<()> {
        use nix::mount::MsFlags;

        nix::mount::mount(
            Some(source),
            target,
            None::<&str>,
            MsFlags::MS_MOVE,
            None::<&str>,
        )?;
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn mount_move(&self, _source: &Path, _target: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "move-mount requires Linux",
        ))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect()
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir(path)
    }

    fn spawn_detached(&self, spec: &SpawnSpec) -> io::Result<u32> {
        let mut cmd = Command::new(&spec.program);
        for name in &spec.env_remove {
            let _ = cmd.env_remove(name);
        }
        // Own process group: signals aimed at the booting parent do not
        // reach the user's init.
        let child = cmd
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .uid(spec.uid)
            .gid(spec.gid)
            .process_group(0)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;
        // Dropping `Child` does not wait; the process is reaped by whoever
        // inherits it.
        Ok(child.id())
    }
}

/// Translates workspace mount flags into the kernel bitmask.
#[cfg(target_os = "linux")]
fn ms_flags(flags: &MountFlags) -> io::Result<nix::mount::MsFlags> {
    use bootmount_common::types::MountOption;
    use nix::mount::MsFlags;

    match flags {
        MountFlags::Options(options) => Ok(options
            .iter()
            .map(|opt| match opt {
                MountOption::ReadOnly => MsFlags::MS_RDONLY,
                MountOption::NoSuid => MsFlags::MS_NOSUID,
                MountOption::NoDev => MsFlags::MS_NODEV,
                MountOption::NoExec => MsFlags::MS_NOEXEC,
                MountOption::Synchronous => MsFlags::MS_SYNCHRONOUS,
                MountOption::Remount => MsFlags::MS_REMOUNT,
                MountOption::MandatoryLock => MsFlags::MS_MANDLOCK,
                MountOption::DirSync => MsFlags::MS_DIRSYNC,
                MountOption::NoAtime => MsFlags::MS_NOATIME,
                MountOption::NoDirAtime => MsFlags::MS_NODIRATIME,
                MountOption::Bind => MsFlags::MS_BIND,
                MountOption::Recursive => MsFlags::MS_REC,
                MountOption::Silent => MsFlags::MS_SILENT,
                MountOption::RelAtime => MsFlags::MS_RELATIME,
                MountOption::StrictAtime => MsFlags::MS_STRICTATIME,
                MountOption::LazyTime => MsFlags::MS_LAZYTIME,
            })
            .fold(MsFlags::empty(), |acc, flag| acc | flag)),
        MountFlags::Bits(bits) => {
            let raw = std::ffi::c_ulong::try_from(*bits).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("mount flag bitmask out of range: {bits:#x}"),
                )
            })?;
            Ok(MsFlags::from_bits_retain(raw))
        }
    }
}
