//! Boot-plan configuration model.
//!
//! A plan is a JSON document listing mounts, subtree moves, and init
//! handoffs in the order they must happen during early boot:
//!
//! ```json
//! {
//!   "steps": [
//!     { "mount": { "device": { "env": "ROOTDEV" }, "target": "/newroot",
//!                  "fs_type": "ext4", "flags": ["nosuid"] } },
//!     { "move": { "source": "/proc", "target": "/newroot/proc", "create": true } },
//!     { "exec_init": { "home": "/newroot/home/alice" } }
//!   ],
//!   "homes_dir": "/newroot/home"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BootError, Result};
use crate::types::MountRequest;

/// Ordered early-boot actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootPlan {
    /// Container marker path checked before every mount.
    #[serde(default = "default_marker")]
    pub marker: PathBuf,
    /// Steps executed in order, stopping at the first failure.
    #[serde(default)]
    pub steps: Vec<BootStep>,
    /// Directory whose entries each receive an init handoff after all steps.
    #[serde(default)]
    pub homes_dir: Option<PathBuf>,
}

fn default_marker() -> PathBuf {
    PathBuf::from(crate::constants::DOCKER_MARKER)
}

impl Default for BootPlan {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            steps: Vec::new(),
            homes_dir: None,
        }
    }
}

/// One early-boot action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootStep {
    /// Provision a mount point and mount a device on it.
    Mount(MountRequest),
    /// Atomically move a mounted subtree.
    Move(MoveStep),
    /// Hand control to the init executable of a home directory.
    ExecInit(ExecInitStep),
}

/// Parameters of a subtree move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStep {
    /// Existing mount point.
    pub source: PathBuf,
    /// New location of the subtree.
    pub target: PathBuf,
    /// Provision `target` before moving.
    #[serde(default)]
    pub create: bool,
}

/// Parameters of an init handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecInitStep {
    /// Home directory containing `init`.
    pub home: PathBuf,
    /// Arguments passed to init.
    #[serde(default)]
    pub args: Vec<String>,
}

impl BootPlan {
    /// Parses a plan from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid plan.
    pub fn from_json(text: &str) -> Result<Self> {
        let plan: Self = serde_json::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Reads and parses a plan file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid plan.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BootError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        for step in &self.steps {
            let target = match step {
                BootStep::Mount(req) => &req.target,
                BootStep::Move(mv) => &mv.target,
                BootStep::ExecInit(exec) => &exec.home,
            };
            if target.as_os_str().is_empty() {
                return Err(BootError::Config {
                    message: format!("empty path in step {step:?}"),
                });
            }
        }
        Ok(())
    }
}
