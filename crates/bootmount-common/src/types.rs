//! Domain primitive types used across the bootmount workspace.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BootError;

/// A single `mount(2)` option flag, named the way `mount -o` spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountOption {
    /// Mount read-only.
    #[serde(rename = "ro")]
    ReadOnly,
    /// Ignore set-user-ID and set-group-ID bits.
    #[serde(rename = "nosuid")]
    NoSuid,
    /// Disallow access to device special files.
    #[serde(rename = "nodev")]
    NoDev,
    /// Disallow program execution.
    #[serde(rename = "noexec")]
    NoExec,
    /// Make writes synchronous.
    #[serde(rename = "sync")]
    Synchronous,
    /// Remount an existing mount.
    #[serde(rename = "remount")]
    Remount,
    /// Permit mandatory locking.
    #[serde(rename = "mand")]
    MandatoryLock,
    /// Make directory changes synchronous.
    #[serde(rename = "dirsync")]
    DirSync,
    /// Do not update access times.
    #[serde(rename = "noatime")]
    NoAtime,
    /// Do not update directory access times.
    #[serde(rename = "nodiratime")]
    NoDirAtime,
    /// Create a bind mount.
    #[serde(rename = "bind")]
    Bind,
    /// Apply recursively (with `bind`).
    #[serde(rename = "rec")]
    Recursive,
    /// Suppress some kernel warning messages.
    #[serde(rename = "silent")]
    Silent,
    /// Update access times relative to modify/change time.
    #[serde(rename = "relatime")]
    RelAtime,
    /// Always update access times.
    #[serde(rename = "strictatime")]
    StrictAtime,
    /// Keep timestamp updates in memory only.
    #[serde(rename = "lazytime")]
    LazyTime,
}

impl MountOption {
    /// Every known option, in the order of their kernel bit values.
    pub const ALL: [Self; 16] = [
        Self::ReadOnly,
        Self::NoSuid,
        Self::NoDev,
        Self::NoExec,
        Self::Synchronous,
        Self::Remount,
        Self::MandatoryLock,
        Self::DirSync,
        Self::NoAtime,
        Self::NoDirAtime,
        Self::Bind,
        Self::Recursive,
        Self::Silent,
        Self::RelAtime,
        Self::StrictAtime,
        Self::LazyTime,
    ];

    /// Returns the `mount -o` spelling of this option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "ro",
            Self::NoSuid => "nosuid",
            Self::NoDev => "nodev",
            Self::NoExec => "noexec",
            Self::Synchronous => "sync",
            Self::Remount => "remount",
            Self::MandatoryLock => "mand",
            Self::DirSync => "dirsync",
            Self::NoAtime => "noatime",
            Self::NoDirAtime => "nodiratime",
            Self::Bind => "bind",
            Self::Recursive => "rec",
            Self::Silent => "silent",
            Self::RelAtime => "relatime",
            Self::StrictAtime => "strictatime",
            Self::LazyTime => "lazytime",
        }
    }
}

impl fmt::Display for MountOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MountOption {
    type Err = BootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s)
            .ok_or_else(|| BootError::Config {
                message: format!("unknown mount option: {s}"),
            })
    }
}

/// Flags passed to the mount primitive: an ordered option list or a raw
/// kernel bitmask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MountFlags {
    /// Named options, applied in order.
    Options(Vec<MountOption>),
    /// Raw `MS_*` bitmask.
    Bits(u64),
}

impl MountFlags {
    /// No flags at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Options(Vec::new())
    }
}

impl Default for MountFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<MountOption>> for MountFlags {
    fn from(options: Vec<MountOption>) -> Self {
        Self::Options(options)
    }
}

/// Filesystem-specific data argument of `mount(2)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MountData {
    /// Pre-rendered comma-separated option string.
    Text(String),
    /// Structured options; `None` values render as a bare key.
    Options(BTreeMap<String, Option<String>>),
}

impl MountData {
    /// Renders the data argument as the string handed to the kernel.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Options(map) => map
                .iter()
                .map(|(key, value)| match value {
                    Some(v) => format!("{key}={v}"),
                    None => key.clone(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl Default for MountData {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for MountData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Where the device of a mount request comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSource {
    /// Looked up by name in a [`DeviceTable`] and consumed on success.
    Env(String),
    /// Given directly.
    Path(PathBuf),
}

/// A complete, immutable description of one mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRequest {
    /// Device path or the name of its binding.
    pub device: DeviceSource,
    /// Mount point, provisioned if missing.
    pub target: PathBuf,
    /// Filesystem type (one of `/proc/filesystems`).
    pub fs_type: String,
    /// Mount flags.
    #[serde(default)]
    pub flags: MountFlags,
    /// Filesystem-specific data.
    #[serde(default)]
    pub data: MountData,
}

/// A home directory that passed validation and may receive an init process.
///
/// Built fresh for every handoff attempt and dropped after the spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeDescriptor {
    /// Home directory, used as the working directory of init.
    pub home: PathBuf,
    /// Owning user of both the home directory and its init.
    pub uid: u32,
    /// Owning group of both the home directory and its init.
    pub gid: u32,
    /// Path of the init executable.
    pub init: PathBuf,
}

/// Named device bindings, read once and consumed on successful mount.
///
/// Consuming returns the remaining table instead of mutating the process
/// environment; the names consumed so far are kept so later stages can be
/// started without them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTable {
    bindings: BTreeMap<String, PathBuf>,
    consumed: Vec<String>,
}

impl DeviceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the current process environment.
    ///
    /// Variables whose names are not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Builds a table from name/value pairs.
    #[must_use]
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let bindings = vars
            .into_iter()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, PathBuf::from(value))))
            .collect();
        Self {
            bindings,
            consumed: Vec::new(),
        }
    }

    /// Returns the table with `name` bound to `device`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, device: impl Into<PathBuf>) -> Self {
        let _ = self.bindings.insert(name.into(), device.into());
        self
    }

    /// Looks up the device bound to `name`. Empty values count as unset.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.bindings
            .get(name)
            .map(PathBuf::as_path)
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Removes `name` and returns the remaining table.
    #[must_use]
    pub fn consume(mut self, name: &str) -> Self {
        if self.bindings.remove(name).is_some() {
            self.consumed.push(name.to_owned());
        }
        self
    }

    /// Names consumed so far, in consumption order.
    #[must_use]
    pub fn consumed(&self) -> &[String] {
        &self.consumed
    }

    /// Number of bindings still available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if no bindings remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
