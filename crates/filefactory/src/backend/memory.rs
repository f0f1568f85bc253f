//! In-memory backend for tests
//!
//! Keeps a flat map of absolute paths to nodes. Every call is counted per
//! [`Operation`] and a failure can be injected for the next call of a given
//! operation, which makes it possible to assert exactly which collaborators
//! a verification touched.

use super::{Backend, Operation};
use crate::meta::Meta;
use crate::types::{FileMode, FileType};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
struct Node {
    file_type: FileType,
    perm: u32,
    uid: u32,
    gid: u32,
    accessed: SystemTime,
    modified: SystemTime,
    contents: Vec<u8>,
    target: PathBuf,
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    calls: HashMap<Operation, usize>,
    failures: HashMap<Operation, io::ErrorKind>,
}

/// Filesystem held entirely in memory
#[derive(Debug)]
pub struct MemoryBackend {
    uid: u32,
    gid: u32,
    clock: SystemTime,
    state: Mutex<State>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(1000, 1000, UNIX_EPOCH + Duration::from_secs(1_000_000_000))
    }
}

impl MemoryBackend {
    /// New entries are owned by `uid:gid` and stamped with `clock`
    pub fn new(uid: u32, gid: u32, clock: SystemTime) -> Self {
        Self {
            uid,
            gid,
            clock,
            state: Mutex::new(State::default()),
        }
    }

    /// Number of calls made to `operation` so far
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make the next call of `operation` fail with `kind`
    pub fn fail_next(&self, operation: Operation, kind: io::ErrorKind) {
        self.lock().failures.insert(operation, kind);
    }

    /// Remove an entry and everything below it
    pub fn remove(&self, path: &Path) -> bool {
        let path = normalize(path);
        let mut state = self.lock();
        let before = state.nodes.len();
        state
            .nodes
            .retain(|p, _| p != &path && !p.starts_with(&path));
        state.nodes.len() < before
    }

    /// All paths currently present, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().nodes.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a panicking test thread must not hide the state from the others
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Count the call and consume an injected failure, if any
    fn begin(&self, operation: Operation) -> io::Result<MutexGuard<'_, State>> {
        let mut state = self.lock();
        *state.calls.entry(operation).or_insert(0) += 1;
        if let Some(kind) = state.failures.remove(&operation) {
            return Err(io::Error::new(
                kind,
                format!("injected failure for {operation:?}"),
            ));
        }
        Ok(state)
    }

    fn node(&self, file_type: FileType, perm: u32) -> Node {
        Node {
            file_type,
            perm,
            uid: self.uid,
            gid: self.gid,
            accessed: self.clock,
            modified: self.clock,
            contents: Vec::new(),
            target: PathBuf::new(),
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

fn is_root(path: &Path) -> bool {
    path.parent().is_none() || path.as_os_str().is_empty()
}

fn require_parent_dir(state: &State, path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if is_root(parent) {
        return Ok(());
    }
    match state.nodes.get(parent) {
        Some(node) if node.file_type == FileType::Directory => Ok(()),
        Some(_) => Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("not a directory: {}", parent.display()),
        )),
        None => Err(not_found(parent)),
    }
}

fn get<'a>(state: &'a State, path: &Path) -> io::Result<&'a Node> {
    state.nodes.get(path).ok_or_else(|| not_found(path))
}

fn get_mut<'a>(state: &'a mut State, path: &Path) -> io::Result<&'a mut Node> {
    state.nodes.get_mut(path).ok_or_else(|| not_found(path))
}

impl Backend for MemoryBackend {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        let state = self.begin(Operation::Exists)?;
        let path = normalize(path);
        Ok(is_root(&path) || state.nodes.contains_key(&path))
    }

    fn read_meta(&self, path: &Path) -> io::Result<Meta> {
        let state = self.begin(Operation::ReadMeta)?;
        let path = normalize(path);
        let node = get(&state, &path)?;
        Ok(Meta {
            mode: FileMode::new(node.file_type, node.perm),
            accessed: node.accessed,
            modified: node.modified,
            uid: node.uid,
            gid: node.gid,
            instructions: Vec::new(),
            path,
        })
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        let state = self.begin(Operation::Size)?;
        let path = normalize(path);
        let node = get(&state, &path)?;
        let len = match node.file_type {
            FileType::Symlink => node.target.as_os_str().len(),
            FileType::Directory => 4096,
            _ => node.contents.len(),
        };
        Ok(len as u64)
    }

    fn create_dir_all(&self, path: &Path, perm: u32) -> io::Result<()> {
        let mut state = self.begin(Operation::CreateDirAll)?;
        let path = normalize(path);
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if is_root(&current) {
                continue;
            }
            match state.nodes.get(&current) {
                Some(node) if node.file_type == FileType::Directory => {}
                Some(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("not a directory: {}", current.display()),
                    ));
                }
                None => {
                    let node = self.node(FileType::Directory, perm);
                    state.nodes.insert(current.clone(), node);
                }
            }
        }
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut state = self.begin(Operation::Symlink)?;
        let link = normalize(link);
        require_parent_dir(&state, &link)?;
        if state.nodes.contains_key(&link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", link.display()),
            ));
        }
        let mut node = self.node(FileType::Symlink, 0o777);
        node.target = target.to_path_buf();
        state.nodes.insert(link, node);
        Ok(())
    }

    fn read_link(&self, link: &Path) -> io::Result<PathBuf> {
        let state = self.begin(Operation::ReadLink)?;
        let link = normalize(link);
        let node = get(&state, &link)?;
        if node.file_type != FileType::Symlink {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {}", link.display()),
            ));
        }
        Ok(node.target.clone())
    }

    fn write_file(&self, path: &Path, contents: &[u8], perm: u32) -> io::Result<()> {
        let mut state = self.begin(Operation::WriteFile)?;
        let path = normalize(path);
        require_parent_dir(&state, &path)?;
        if let Some(existing) = state.nodes.get_mut(&path) {
            if existing.file_type != FileType::Regular {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("not a regular file: {}", path.display()),
                ));
            }
            existing.contents = contents.to_vec();
            existing.modified = self.clock;
            return Ok(());
        }
        let mut node = self.node(FileType::Regular, perm);
        node.contents = contents.to_vec();
        state.nodes.insert(path, node);
        Ok(())
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        let state = self.begin(Operation::ReadFile)?;
        let path = normalize(path);
        let node = get(&state, &path)?;
        if node.file_type != FileType::Regular {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("not a regular file: {}", path.display()),
            ));
        }
        Ok(node.contents.clone())
    }

    fn lchown(&self, path: &Path, uid: u32, gid: u32) -> io::Result<()> {
        let mut state = self.begin(Operation::Lchown)?;
        let node = get_mut(&mut state, &normalize(path))?;
        node.uid = uid;
        node.gid = gid;
        Ok(())
    }

    fn chmod(&self, path: &Path, perm: u32) -> io::Result<()> {
        let mut state = self.begin(Operation::Chmod)?;
        let node = get_mut(&mut state, &normalize(path))?;
        node.perm = perm & crate::types::PERM_MASK;
        Ok(())
    }

    fn set_times(
        &self,
        path: &Path,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> io::Result<()> {
        let mut state = self.begin(Operation::SetTimes)?;
        let node = get_mut(&mut state, &normalize(path))?;
        node.accessed = accessed;
        node.modified = modified;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dir_all_creates_ancestors() {
        let fs = MemoryBackend::default();
        fs.create_dir_all(Path::new("/r/a/b"), 0o755).unwrap();
        assert_eq!(
            fs.paths(),
            vec![
                PathBuf::from("/r"),
                PathBuf::from("/r/a"),
                PathBuf::from("/r/a/b")
            ]
        );
        // existing directories are fine
        fs.create_dir_all(Path::new("/r/a"), 0o700).unwrap();
        assert_eq!(
            fs.read_meta(Path::new("/r/a")).unwrap().mode.perm(),
            0o755
        );
    }

    #[test]
    fn test_write_requires_parent() {
        let fs = MemoryBackend::default();
        let err = fs
            .write_file(Path::new("/r/missing/f"), b"x", 0o644)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        fs.create_dir_all(Path::new("/r"), 0o755).unwrap();
        fs.write_file(Path::new("/r/f"), b"abc", 0o644).unwrap();
        assert_eq!(fs.read_file(Path::new("/r/f")).unwrap(), b"abc");
        assert_eq!(fs.size(Path::new("/r/f")).unwrap(), 3);
    }

    #[test]
    fn test_symlink_roundtrip() {
        let fs = MemoryBackend::default();
        fs.create_dir_all(Path::new("/r"), 0o755).unwrap();
        fs.symlink(Path::new("../elsewhere"), Path::new("/r/l"))
            .unwrap();
        assert_eq!(
            fs.read_link(Path::new("/r/l")).unwrap(),
            PathBuf::from("../elsewhere")
        );
        assert_eq!(
            fs.symlink(Path::new("x"), Path::new("/r/l"))
                .unwrap_err()
                .kind(),
            io::ErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_calls_and_injected_failures() {
        let fs = MemoryBackend::default();
        fs.fail_next(Operation::Exists, io::ErrorKind::PermissionDenied);

        let err = fs.exists(Path::new("/r")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        // the failure is consumed
        assert!(!fs.exists(Path::new("/r")).unwrap());
        assert_eq!(fs.calls(Operation::Exists), 2);
        assert_eq!(fs.calls(Operation::ReadMeta), 0);

        fs.reset_calls();
        assert_eq!(fs.total_calls(), 0);
    }

    #[test]
    fn test_remove_subtree() {
        let fs = MemoryBackend::default();
        fs.create_dir_all(Path::new("/r/a/b"), 0o755).unwrap();
        fs.create_dir_all(Path::new("/r/ab"), 0o755).unwrap();
        assert!(fs.remove(Path::new("/r/a")));
        assert_eq!(
            fs.paths(),
            vec![PathBuf::from("/r"), PathBuf::from("/r/ab")]
        );
        assert!(!fs.remove(Path::new("/r/a")));
    }
}
