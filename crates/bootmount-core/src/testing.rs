//! Scriptable in-memory [`SystemOps`] for unit tests.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bootmount_common::types::MountFlags;

use crate::sys::{FileStat, SpawnSpec, SystemOps};

/// Primitive names used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Op {
    Stat,
    CreateDir,
    Mount,
    MountMove,
    ReadDir,
    RemoveDir,
    Spawn,
}

/// One recorded primitive invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Stat(PathBuf),
    CreateDir(PathBuf, u32),
    Mount {
        device: PathBuf,
        target: PathBuf,
        fs_type: String,
        flags: MountFlags,
        data: String,
    },
    MountMove(PathBuf, PathBuf),
    ReadDir(PathBuf),
    RemoveDir(PathBuf),
    Spawn(SpawnSpec),
}

#[derive(Debug, Default)]
struct State {
    paths: BTreeMap<PathBuf, FileStat>,
    listings: BTreeMap<PathBuf, Vec<OsString>>,
    failures: BTreeMap<(Op, PathBuf), io::ErrorKind>,
    calls: Vec<Call>,
    next_pid: u32,
}

/// Fake host: paths exist only once added or created; every call is logged.
#[derive(Debug, Default)]
pub struct FakeSystem {
    state: Mutex<State>,
}

impl FakeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(self, path: &str, uid: u32, gid: u32) -> Self {
        self.insert(path, uid, gid, false)
    }

    pub fn with_file(self, path: &str, uid: u32, gid: u32) -> Self {
        self.insert(path, uid, gid, true)
    }

    pub fn with_listing(self, path: &str, names: &[&str]) -> Self {
        let _ = self.state.lock().unwrap().listings.insert(
            PathBuf::from(path),
            names.iter().map(OsString::from).collect(),
        );
        self
    }

    pub fn failing(self, op: Op, path: &str, kind: io::ErrorKind) -> Self {
        let _ = self
            .state
            .lock()
            .unwrap()
            .failures
            .insert((op, PathBuf::from(path)), kind);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.lock().unwrap().paths.contains_key(Path::new(path))
    }

    fn insert(self, path: &str, uid: u32, gid: u32, is_file: bool) -> Self {
        let _ = self.state.lock().unwrap().paths.insert(
            PathBuf::from(path),
            FileStat {
                uid,
                gid,
                is_file,
                is_dir: !is_file,
            },
        );
        self
    }

    fn record(&self, op: Op, path: &Path, call: Call) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(&(op, path.to_path_buf())) {
            Some(kind) => Err(io::Error::from(*kind)),
            None => Ok(()),
        }
    }
}

impl SystemOps for FakeSystem {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.record(Op::Stat, path, Call::Stat(path.to_path_buf()))?;
        self.state
            .lock()
            .unwrap()
            .paths
            .get(path)
            .copied()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        self.record(
            Op::CreateDir,
            path,
            Call::CreateDir(path.to_path_buf(), mode),
        )?;
        let mut state = self.state.lock().unwrap();
        for dir in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            let _ = state.paths.entry(dir.to_path_buf()).or_insert(FileStat {
                uid: 0,
                gid: 0,
                is_file: false,
                is_dir: true,
            });
        }
        Ok(())
    }

    fn mount(
        &self,
        device: &Path,
        target: &Path,
        fs_type: &str,
        flags: &MountFlags,
        data: &str,
    ) -> io::Result<()> {
        self.record(
            Op::Mount,
            target,
            Call::Mount {
                device: device.to_path_buf(),
                target: target.to_path_buf(),
                fs_type: fs_type.to_owned(),
                flags: flags.clone(),
                data: data.to_owned(),
            },
        )
    }

    fn mount_move(&self, source: &Path, target: &Path) -> io::Result<()> {
        self.record(
            Op::MountMove,
            target,
            Call::MountMove(source.to_path_buf(), target.to_path_buf()),
        )
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        self.record(Op::ReadDir, path, Call::ReadDir(path.to_path_buf()))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .listings
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        self.record(Op::RemoveDir, path, Call::RemoveDir(path.to_path_buf()))?;
        let _ = self.state.lock().unwrap().paths.remove(path);
        Ok(())
    }

    fn spawn_detached(&self, spec: &SpawnSpec) -> io::Result<u32> {
        self.record(Op::Spawn, &spec.program, Call::Spawn(spec.clone()))?;
        let mut state = self.state.lock().unwrap();
        state.next_pid += 1;
        Ok(state.next_pid)
    }
}
