//! Container detection.
//!
//! Inside a pre-provisioned container the filesystems are already in
//! place, so every mount is skipped when the marker file exists.

use std::io;
use std::path::{Path, PathBuf};

use bootmount_common::constants::DOCKER_MARKER;
use bootmount_common::error::{BootError, Result};

use crate::sys::SystemOps;

/// Checks for the container marker file before mounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerGuard {
    marker: PathBuf,
}

impl DockerGuard {
    /// Creates a guard checking the given marker path.
    #[must_use]
    pub fn new(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Returns the marker path.
    #[must_use]
    pub fn marker(&self) -> &Path {
        &self.marker
    }

    /// Returns whether the marker file is present.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::Io`] if stat'ing the marker fails for any reason
    /// other than the marker being absent.
    pub fn is_containerized(&self, sys: &dyn SystemOps) -> Result<bool> {
        match sys.stat(&self.marker) {
            Ok(_) => {
                tracing::debug!(marker = %self.marker.display(), "container marker present");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BootError::Io {
                path: self.marker.clone(),
                source: e,
            }),
        }
    }
}

impl Default for DockerGuard {
    fn default() -> Self {
        Self::new(DOCKER_MARKER)
    }
}
