//! `bootmount move`: relocate a mounted subtree.

use std::path::PathBuf;

use bootmount_core::filesystem::{move_create, move_subtree};
use bootmount_core::sys::HostSystem;
use clap::Args;

use crate::output;

/// Arguments for the `move` command.
#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Current mount point of the subtree.
    pub source: PathBuf,

    /// New mount point.
    pub target: PathBuf,

    /// Create the target mount point first.
    #[arg(long)]
    pub create: bool,
}

/// Executes the `move` command.
///
/// # Errors
///
/// Returns an error if the target cannot be created, the move fails, or
/// the vacated source cannot be cleaned up.
pub fn execute(args: &MoveArgs) -> anyhow::Result<()> {
    let sys = HostSystem::new();
    let outcome = if args.create {
        move_create(&sys, &args.source, &args.target)?
    } else {
        move_subtree(&sys, &args.source, &args.target)?
    };
    output::print_line(&output::format_move(&args.source, &args.target, outcome));
    Ok(())
}
