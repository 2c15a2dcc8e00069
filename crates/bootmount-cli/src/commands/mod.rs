//! CLI command definitions and dispatch.

pub mod boot;
pub mod exec_init;
pub mod mount;
pub mod relocate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// bootmount: early-boot mounts and per-user init handoff.
#[derive(Parser, Debug)]
#[command(name = "bootmount", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// File whose presence means we run inside a container.
    ///
    /// Defaults to `/.dockerinit`; for `boot` it overrides the plan's marker.
    #[arg(long, global = true, env = bootmount_common::constants::MARKER_ENV)]
    pub marker: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mount a device on a freshly provisioned mount point.
    Mount(mount::MountArgs),
    /// Move a mounted subtree to another location.
    Move(relocate::MoveArgs),
    /// Validate a home directory and launch its init detached.
    ExecInit(exec_init::ExecInitArgs),
    /// Run a JSON boot plan.
    Boot(boot::BootArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Mount(args) => mount::execute(args, cli.marker),
        Command::Move(args) => relocate::execute(&args),
        Command::ExecInit(args) => exec_init::execute(&args),
        Command::Boot(args) => boot::execute(&args, cli.marker),
    }
}
