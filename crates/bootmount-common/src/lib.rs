//! # bootmount-common
//!
//! Shared types, error definitions, boot-plan configuration, and constants
//! used across the bootmount workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and never touches the operating system beyond reading a
//! plan file or snapshotting the process environment.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
