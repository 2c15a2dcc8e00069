//! Sequential execution of a [`BootPlan`].
//!
//! Steps run in the order given and the first failing step ends the run.
//! Homes discovered under `homes_dir` are handled last; a rejected home is
//! logged and skipped so one misconfigured user cannot block the others.

use std::path::PathBuf;

use bootmount_common::config::{BootPlan, BootStep};
use bootmount_common::error::{BootError, Result};
use bootmount_common::types::DeviceTable;

use crate::filesystem::{MountOrchestrator, move_create, move_subtree};
use crate::guard::DockerGuard;
use crate::handoff::{Launch, discover_homes, exec_init};
use crate::sys::SystemOps;

/// What a completed boot plan did.
#[derive(Debug)]
pub struct BootReport {
    /// Device bindings left after all mounts.
    pub devices: DeviceTable,
    /// Handoffs that passed validation, with their launch result.
    pub launches: Vec<(PathBuf, Launch)>,
    /// Discovered homes that failed validation.
    pub rejected: Vec<(PathBuf, BootError)>,
}

/// Runs boot plans against a set of host primitives.
pub struct BootRunner<'a> {
    sys: &'a dyn SystemOps,
}

impl<'a> BootRunner<'a> {
    /// Creates a runner over the given host primitives.
    #[must_use]
    pub const fn new(sys: &'a dyn SystemOps) -> Self {
        Self { sys }
    }

    /// Executes every step of `plan`, resolving devices from `devices`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step, or of listing
    /// `homes_dir`.
    pub fn run(&self, plan: &BootPlan, devices: DeviceTable) -> Result<BootReport> {
        let mounts = MountOrchestrator::new(self.sys, DockerGuard::new(&plan.marker));
        let mut report = BootReport {
            devices,
            launches: Vec::new(),
            rejected: Vec::new(),
        };

        for (index, step) in plan.steps.iter().enumerate() {
            tracing::debug!(step = index, ?step, "running boot step");
            match step {
                BootStep::Mount(request) => {
                    report.devices = mounts.mount(&report.devices, request)?;
                }
                BootStep::Move(mv) => {
                    let outcome = if mv.create {
                        move_create(self.sys, &mv.source, &mv.target)?
                    } else {
                        move_subtree(self.sys, &mv.source, &mv.target)?
                    };
                    tracing::debug!(step = index, ?outcome, "move finished");
                }
                BootStep::ExecInit(exec) => {
                    let launch =
                        exec_init(self.sys, &exec.home, &exec.args, report.devices.consumed())?;
                    report.launches.push((exec.home.clone(), launch));
                }
            }
        }

        if let Some(dir) = &plan.homes_dir {
            for home in discover_homes(self.sys, dir)? {
                match exec_init(self.sys, &home, &[], report.devices.consumed()) {
                    Ok(launch) => report.launches.push((home, launch)),
                    Err(e) if e.is_rejection() => {
                        tracing::warn!(home = %home.display(), error = %e, "home rejected");
                        report.rejected.push((home, e));
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        tracing::info!(
            launched = report.launches.len(),
            rejected = report.rejected.len(),
            "boot plan finished"
        );
        Ok(report)
    }
}
