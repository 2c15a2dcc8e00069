//! `bootmount mount`: mount a device on a provisioned mount point.

use std::path::PathBuf;

use bootmount_common::constants::DOCKER_MARKER;
use bootmount_common::types::{DeviceTable, MountData, MountFlags, MountOption};
use bootmount_core::filesystem::MountOrchestrator;
use bootmount_core::guard::DockerGuard;
use bootmount_core::sys::HostSystem;
use clap::Args;

use crate::output;

/// Arguments for the `mount` command.
#[derive(Args, Debug)]
pub struct MountArgs {
    /// Environment variable holding the device path.
    #[arg(long, conflicts_with = "device", required_unless_present = "device")]
    pub env: Option<String>,

    /// Device path to mount.
    #[arg(long)]
    pub device: Option<PathBuf>,

    /// Mount point, created with mode 0000 if missing.
    pub target: PathBuf,

    /// Filesystem type.
    #[arg(short = 't', long = "type")]
    pub fs_type: String,

    /// Mount flags, comma separated or repeated (ro, nosuid, nodev, ...).
    #[arg(short = 'o', long = "options", value_delimiter = ',')]
    pub options: Vec<MountOption>,

    /// Filesystem-specific data string passed through unchanged.
    #[arg(long)]
    pub data: Option<String>,
}

/// Executes the `mount` command.
///
/// # Errors
///
/// Returns an error if the device is undefined, the mount point cannot be
/// created, or the mount fails.
pub fn execute(args: MountArgs, marker: Option<PathBuf>) -> anyhow::Result<()> {
    let sys = HostSystem::new();
    let guard = DockerGuard::new(marker.unwrap_or_else(|| PathBuf::from(DOCKER_MARKER)));
    let orchestrator = MountOrchestrator::new(&sys, guard);
    let flags = MountFlags::from(args.options);
    let data = args.data.as_deref().map(MountData::from).unwrap_or_default();

    let outcome = if let Some(name) = &args.env {
        let (outcome, remaining) = orchestrator.mount_via_env(
            &DeviceTable::from_env(),
            name,
            &args.target,
            &args.fs_type,
            &flags,
            &data,
        )?;
        tracing::debug!(remaining = remaining.len(), "device bindings left");
        outcome
    } else {
        orchestrator.mount_via_path(
            args.device.as_deref(),
            &args.target,
            &args.fs_type,
            &flags,
            &data,
        )?
    };

    output::print_line(&output::format_mount(&args.target, outcome));
    Ok(())
}
