//! # bootmount-core
//!
//! Early-boot orchestration for a minimal Linux userspace.
//!
//! This crate sequences the privileged steps that happen before any user
//! program runs:
//! - **Provisioning**: idempotent creation of inaccessible mount points.
//! - **Mounting**: devices given directly or through a [`DeviceTable`]
//!   binding that is consumed once the mount succeeds.
//! - **Relocation**: atomic `MS_MOVE` of mounted subtrees with cleanup of
//!   the vacated mount point.
//! - **Handoff**: ownership-checked, detached launch of a per-user `init`.
//!
//! Every operating-system primitive goes through the [`SystemOps`] trait so
//! the orchestration logic stays independent of the host it runs on.
//!
//! [`DeviceTable`]: bootmount_common::types::DeviceTable
//! [`SystemOps`]: sys::SystemOps

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod filesystem;
pub mod guard;
pub mod handoff;
pub mod plan;
pub mod sys;

#[cfg(test)]
pub(crate) mod testing;
