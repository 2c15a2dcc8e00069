//! `bootmount exec-init`: hand a home directory over to its init.

use std::path::PathBuf;

use bootmount_core::handoff::{Launch, exec_init};
use bootmount_core::sys::HostSystem;
use clap::Args;

use crate::output;

/// Arguments for the `exec-init` command.
#[derive(Args, Debug)]
pub struct ExecInitArgs {
    /// Home directory containing an `init` executable.
    pub home: PathBuf,

    /// Arguments passed to init.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Executes the `exec-init` command.
///
/// Returns as soon as the init process is started; it is not waited on.
///
/// # Errors
///
/// Returns an error if the home is rejected or the init cannot be started.
pub fn execute(args: &ExecInitArgs) -> anyhow::Result<()> {
    let launch = exec_init(&HostSystem::new(), &args.home, &args.args, &[])?;
    output::print_line(&output::format_launch(&args.home, &launch));
    match launch {
        Launch::Detached { .. } => Ok(()),
        Launch::SpawnFailed(err) => Err(err.into()),
    }
}
