//! Device mounts for early boot.
//!
//! Each mount is gated by the [`DockerGuard`], provisions its mount point,
//! then calls the `mount(2)` primitive. Devices come either from a path or
//! from a named binding in a [`DeviceTable`]; a binding is consumed only
//! when its mount succeeds, so a failed mount can be retried with the same
//! table.

use std::path::Path;

use bootmount_common::error::{BootError, Result};
use bootmount_common::types::{DeviceSource, DeviceTable, MountData, MountFlags, MountRequest};

use super::provision::ensure_mount_point;
use crate::guard::DockerGuard;
use crate::sys::SystemOps;

/// Name reported when a mount is requested without any device path.
const UNDEFINED_DEVICE: &str = "undefined";

/// Whether a requested mount was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The device is mounted on the target.
    Mounted,
    /// The container marker was present; nothing was touched.
    SkippedInContainer,
}

/// Mounts devices on freshly provisioned mount points.
pub struct MountOrchestrator<'a> {
    sys: &'a dyn SystemOps,
    guard: DockerGuard,
}

impl<'a> MountOrchestrator<'a> {
    /// Creates an orchestrator over the given host primitives.
    #[must_use]
    pub const fn new(sys: &'a dyn SystemOps, guard: DockerGuard) -> Self {
        Self { sys, guard }
    }

    /// Mounts the device bound to `name` and returns the outcome with the
    /// remaining table.
    ///
    /// Inside a container nothing is mounted and the table is returned
    /// unchanged. On failure the caller's table is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::UndefinedDevice`] if `name` has no binding,
    /// [`BootError::Create`] if the mount point cannot be provisioned, and
    /// [`BootError::Mount`] if the mount itself fails.
    pub fn mount_via_env(
        &self,
        table: &DeviceTable,
        name: &str,
        target: &Path,
        fs_type: &str,
        flags: &MountFlags,
        data: &MountData,
    ) -> Result<(MountOutcome, DeviceTable)> {
        if self.skip_in_container(target)? {
            return Ok((MountOutcome::SkippedInContainer, table.clone()));
        }

        let device = table.resolve(name).ok_or_else(|| BootError::UndefinedDevice {
            name: name.to_owned(),
        })?;
        self.mount_device(device, target, fs_type, flags, data)?;

        tracing::debug!(binding = name, "device binding consumed");
        Ok((MountOutcome::Mounted, table.clone().consume(name)))
    }

    /// Mounts `device` on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::UndefinedDevice`] if `device` is missing or
    /// empty, otherwise the same errors as [`Self::mount_device`].
    pub fn mount_via_path(
        &self,
        device: Option<&Path>,
        target: &Path,
        fs_type: &str,
        flags: &MountFlags,
        data: &MountData,
    ) -> Result<MountOutcome> {
        if self.skip_in_container(target)? {
            return Ok(MountOutcome::SkippedInContainer);
        }

        let device = device
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or_else(|| BootError::UndefinedDevice {
                name: UNDEFINED_DEVICE.to_owned(),
            })?;
        self.mount_device(device, target, fs_type, flags, data)?;
        Ok(MountOutcome::Mounted)
    }

    /// Carries out a [`MountRequest`], returning the remaining device table.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::mount_via_env`] or [`Self::mount_via_path`].
    pub fn mount(&self, table: &DeviceTable, request: &MountRequest) -> Result<DeviceTable> {
        match &request.device {
            DeviceSource::Env(name) => self
                .mount_via_env(
                    table,
                    name,
                    &request.target,
                    &request.fs_type,
                    &request.flags,
                    &request.data,
                )
                .map(|(_, rest)| rest),
            DeviceSource::Path(device) => {
                let _ = self.mount_via_path(
                    Some(device.as_path()),
                    &request.target,
                    &request.fs_type,
                    &request.flags,
                    &request.data,
                )?;
                Ok(table.clone())
            }
        }
    }

    /// Provisions `target` and mounts `device` on it, without the container
    /// check.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::Create`] if the mount point cannot be created and
    /// [`BootError::Mount`] if the mount fails. The mount is never attempted
    /// when provisioning fails.
    pub fn mount_device(
        &self,
        device: &Path,
        target: &Path,
        fs_type: &str,
        flags: &MountFlags,
        data: &MountData,
    ) -> Result<()> {
        ensure_mount_point(self.sys, target)?;
        self.sys
            .mount(device, target, fs_type, flags, &data.render())
            .map_err(|e| BootError::Mount {
                device: device.to_path_buf(),
                target: target.to_path_buf(),
                source: e,
            })?;
        tracing::info!(
            device = %device.display(),
            target = %target.display(),
            fs_type,
            "filesystem mounted"
        );
        Ok(())
    }

    fn skip_in_container(&self, target: &Path) -> Result<bool> {
        let containerized = self.guard.is_containerized(self.sys)?;
        if containerized {
            tracing::info!(target = %target.display(), "container detected, mount skipped");
        }
        Ok(containerized)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use bootmount_common::types::MountOption;

    use super::*;
    use crate::testing::{Call, FakeSystem, Op};

    fn orchestrator(sys: &FakeSystem) -> MountOrchestrator<'_> {
        MountOrchestrator::new(sys, DockerGuard::default())
    }

    fn mount_call(device: &str, target: &str) -> Call {
        Call::Mount {
            device: PathBuf::from(device),
            target: PathBuf::from(target),
            fs_type: "type".into(),
            flags: MountFlags::empty(),
            data: String::new(),
        }
    }

    #[test]
    fn env_mount_consumes_binding_on_success() {
        let sys = FakeSystem::new();
        let table = DeviceTable::new().with("envdev", "/dev");

        let (outcome, rest) = orchestrator(&sys)
            .mount_via_env(
                &table,
                "envdev",
                Path::new("/path"),
                "type",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap();

        assert_eq!(outcome, MountOutcome::Mounted);
        assert_eq!(rest.resolve("envdev"), None);
        assert_eq!(rest.consumed(), ["envdev".to_owned()]);
        assert_eq!(
            sys.calls(),
            vec![
                Call::Stat(PathBuf::from("/.dockerinit")),
                Call::CreateDir(PathBuf::from("/path"), 0),
                mount_call("/dev", "/path"),
            ]
        );
    }

    #[test]
    fn env_mount_failure_leaves_binding() {
        let sys = FakeSystem::new().failing(Op::Mount, "/path", io::ErrorKind::PermissionDenied);
        let table = DeviceTable::new().with("envdev", "/dev");

        let err = orchestrator(&sys)
            .mount_via_env(
                &table,
                "envdev",
                Path::new("/path"),
                "type",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap_err();

        assert!(matches!(err, BootError::Mount { .. }));
        assert_eq!(table.resolve("envdev"), Some(Path::new("/dev")));
        assert!(table.consumed().is_empty());
    }

    #[test]
    fn unbound_name_fails_before_provisioning() {
        let sys = FakeSystem::new();
        let table = DeviceTable::new().with("envdev", "/dev");

        let err = orchestrator(&sys)
            .mount_via_env(
                &table,
                "ROOTDEV",
                Path::new("/newroot"),
                "ext4",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap_err();

        assert!(matches!(err, BootError::UndefinedDevice { ref name } if name == "ROOTDEV"));
        assert_eq!(err.to_string(), "ROOTDEV filesystem not defined");
        assert_eq!(sys.calls(), vec![Call::Stat(PathBuf::from("/.dockerinit"))]);
        assert!(!sys.exists("/newroot"));
    }

    #[test]
    fn container_marker_skips_everything() {
        let sys = FakeSystem::new().with_file("/.dockerinit", 0, 0);
        let table = DeviceTable::new().with("envdev", "/dev");

        let (outcome, rest) = orchestrator(&sys)
            .mount_via_env(
                &table,
                "envdev",
                Path::new("/path"),
                "type",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap();

        assert_eq!(outcome, MountOutcome::SkippedInContainer);
        assert_eq!(rest, table);
        assert_eq!(sys.calls(), vec![Call::Stat(PathBuf::from("/.dockerinit"))]);
    }

    #[test]
    fn marker_stat_error_propagates() {
        let sys = FakeSystem::new().failing(Op::Stat, "/.dockerinit", io::ErrorKind::Other);
        let err = orchestrator(&sys)
            .mount_via_path(
                Some(Path::new("/devpath")),
                Path::new("/path"),
                "type",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap_err();
        assert!(matches!(err, BootError::Io { .. }));
        assert_eq!(sys.calls().len(), 1);
    }

    #[test]
    fn create_failure_prevents_mount() {
        let sys = FakeSystem::new().failing(Op::CreateDir, "/path", io::ErrorKind::PermissionDenied);
        let table = DeviceTable::new().with("envdev", "/dev");

        let err = orchestrator(&sys)
            .mount_via_env(
                &table,
                "envdev",
                Path::new("/path"),
                "type",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap_err();

        assert!(matches!(err, BootError::Create { .. }));
        assert!(!sys.calls().iter().any(|c| matches!(c, Call::Mount { .. })));
    }

    #[test]
    fn existing_mount_point_still_mounts() {
        let sys = FakeSystem::new().failing(Op::CreateDir, "/path", io::ErrorKind::AlreadyExists);
        orchestrator(&sys)
            .mount_device(
                Path::new("/dev"),
                Path::new("/path"),
                "type",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap();
        assert_eq!(sys.calls().last(), Some(&mount_call("/dev", "/path")));
    }

    #[test]
    fn path_mount_passes_flags_and_data() {
        let sys = FakeSystem::new();
        let flags = MountFlags::Options(vec![MountOption::NoSuid, MountOption::NoDev]);
        let outcome = orchestrator(&sys)
            .mount_via_path(
                Some(Path::new("/devpath")),
                Path::new("/path"),
                "tmpfs",
                &flags,
                &MountData::from("size=10m"),
            )
            .unwrap();
        assert_eq!(outcome, MountOutcome::Mounted);
        assert_eq!(
            sys.calls().last(),
            Some(&Call::Mount {
                device: PathBuf::from("/devpath"),
                target: PathBuf::from("/path"),
                fs_type: "tmpfs".into(),
                flags,
                data: "size=10m".into(),
            })
        );
    }

    #[test]
    fn missing_device_path_is_undefined() {
        let sys = FakeSystem::new();
        let err = orchestrator(&sys)
            .mount_via_path(
                None,
                Path::new("/path"),
                "type",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "undefined filesystem not defined");
        assert!(!sys.exists("/path"));
    }

    #[test]
    fn request_with_path_device_keeps_table() {
        let sys = FakeSystem::new();
        let table = DeviceTable::new().with("USRDEV", "/dev/vdb");
        let request = MountRequest {
            device: DeviceSource::Path("/dev/vda".into()),
            target: "/newroot".into(),
            fs_type: "ext4".into(),
            flags: MountFlags::empty(),
            data: MountData::default(),
        };
        let rest = orchestrator(&sys).mount(&table, &request).unwrap();
        assert_eq!(rest, table);
    }

    #[test]
    fn custom_marker_is_honoured() {
        let sys = FakeSystem::new().with_file("/run/.containerenv", 0, 0);
        let guard = DockerGuard::new("/run/.containerenv");
        let outcome = MountOrchestrator::new(&sys, guard)
            .mount_via_path(
                Some(Path::new("/dev/vda")),
                Path::new("/newroot"),
                "ext4",
                &MountFlags::empty(),
                &MountData::default(),
            )
            .unwrap();
        assert_eq!(outcome, MountOutcome::SkippedInContainer);
        assert_eq!(sys.calls(), vec![Call::Stat(PathBuf::from("/run/.containerenv"))]);
    }
}
