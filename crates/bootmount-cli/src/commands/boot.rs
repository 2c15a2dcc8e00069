//! `bootmount boot`: run a JSON boot plan.

use std::path::PathBuf;

use bootmount_common::config::BootPlan;
use bootmount_common::types::DeviceTable;
use bootmount_core::plan::BootRunner;
use bootmount_core::sys::HostSystem;
use clap::Args;

use crate::output;

/// Arguments for the `boot` command.
#[derive(Args, Debug)]
pub struct BootArgs {
    /// Path to the boot plan.
    #[arg(long)]
    pub plan: PathBuf,
}

/// Executes the `boot` command.
///
/// Device bindings are read from the process environment.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or a step fails.
pub fn execute(args: &BootArgs, marker: Option<PathBuf>) -> anyhow::Result<()> {
    let mut plan = BootPlan::load(&args.plan)?;
    if let Some(marker) = marker {
        plan.marker = marker;
    }
    tracing::info!(plan = %args.plan.display(), steps = plan.steps.len(), "boot plan loaded");

    let sys = HostSystem::new();
    let report = BootRunner::new(&sys).run(&plan, DeviceTable::from_env())?;

    for line in output::format_report(&report) {
        output::print_line(&line);
    }
    Ok(())
}
