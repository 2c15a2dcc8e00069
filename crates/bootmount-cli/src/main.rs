//! # bootmount
//!
//! Early-boot helper: provisions mount points, mounts devices named by
//! the environment, relocates mounted subtrees and hands each user home
//! over to its own init process.

mod commands;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
