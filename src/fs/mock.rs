// src/fs/mock.rs

use super::{FileSystem, normalize_path};
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths whose metadata cannot be read (simulated permission errors).
    denied: HashSet<PathBuf>,
    /// Every path passed to `modified`, in call order.
    stat_log: Vec<PathBuf>,
    /// Logical clock used by `touch`.
    clock: u64,
}

/// In-memory filesystem with settable last-write times.
///
/// Timestamps handed out by [`MockFileSystem::touch`] come from a logical
/// clock that advances one second per call, so later touches are always
/// strictly newer.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.lock()
            .entries
            .insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));
        fs
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Timestamp `secs` seconds after the epoch used by the logical clock.
    pub fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 + secs)
    }

    /// Create (or overwrite) a file with an explicit last-write time.
    pub fn add_file(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        state
            .entries
            .insert(path.clone(), MockEntry::File { modified });
        Self::link_into_parent(&mut state.entries, &path);
    }

    /// Write to a file "now": advance the logical clock and stamp the file
    /// with the new time. Returns the stamp.
    pub fn touch(&self, path: impl AsRef<Path>) -> SystemTime {
        let stamp = {
            let mut state = self.lock();
            state.clock += 1;
            Self::at(state.clock)
        };
        self.add_file(path, stamp);
        stamp
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        state.entries.remove(path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(MockEntry::Dir(children)) = state.entries.get_mut(parent) {
                let name = name.to_string_lossy();
                children.retain(|c| *c != name);
            }
        }
    }

    /// Make `modified` fail for this path with a permission error.
    pub fn deny_access(&self, path: impl AsRef<Path>) {
        self.lock().denied.insert(path.as_ref().to_path_buf());
    }

    /// Paths whose timestamps have been read so far.
    pub fn stat_log(&self) -> Vec<PathBuf> {
        self.lock().stat_log.clone()
    }

    pub fn clear_stat_log(&self) {
        self.lock().stat_log.clear();
    }

    fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        if parent == path || parent.as_os_str().is_empty() {
            return;
        }
        if !entries.contains_key(parent) {
            entries.insert(parent.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(entries, parent);
        }
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        let mut state = self.lock();
        state.stat_log.push(path.to_path_buf());
        if state.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access denied: {:?}", path),
            )
            .into());
        }
        match state.entries.get(path) {
            Some(MockEntry::File { modified }) => Ok(*modified),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // Tests use absolute paths; just fold `.` and `..`.
        let normalized = normalize_path(Path::new("/"), path);
        if self.exists(&normalized) {
            Ok(normalized)
        } else {
            Err(anyhow!("File not found: {:?}", path))
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        if !state.entries.contains_key(path) {
            state
                .entries
                .insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_into_parent(&mut state.entries, path);
        }
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.lock().entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
