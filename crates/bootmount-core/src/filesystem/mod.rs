//! Filesystem preparation for early boot.
//!
//! Provides idempotent mount-point provisioning, device mounts resolved
//! from a path or a device binding, and atomic relocation of mounted
//! subtrees.

pub mod mount;
pub mod provision;
pub mod relocate;

pub use mount::{MountOrchestrator, MountOutcome};
pub use provision::{ensure_directory, ensure_mount_point};
pub use relocate::{MoveOutcome, move_create, move_subtree};
