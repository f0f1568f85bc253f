use crate::meta::Meta;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub mod memory;
pub mod os;

pub use memory::MemoryBackend;
pub use os::OsBackend;

/// Backend trait for filesystem operations
///
/// Declarations never touch the filesystem directly; every create, align and
/// verify step goes through this trait. This lets us:
/// - Run against the real filesystem ([`OsBackend`])
/// - Run deterministic tests in memory ([`MemoryBackend`])
/// - Count or fail individual operations in tests
pub trait Backend: Send + Sync {
    /// Whether anything exists at `path` (symlinks are not followed)
    ///
    /// Errors only for failures other than "does not exist".
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read type, permissions, ownership and times of the entry itself
    fn read_meta(&self, path: &Path) -> io::Result<Meta>;

    /// Byte length of the entry itself
    fn size(&self, path: &Path) -> io::Result<u64>;

    /// Create a directory and all missing ancestors with `perm`
    fn create_dir_all(&self, path: &Path, perm: u32) -> io::Result<()>;

    /// Create a symlink at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    fn read_link(&self, link: &Path) -> io::Result<PathBuf>;

    /// Write `contents` to `path`, creating it with `perm` if needed
    fn write_file(&self, path: &Path, contents: &[u8], perm: u32) -> io::Result<()>;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Change ownership of the entry itself, never a symlink's target
    fn lchown(&self, path: &Path, uid: u32, gid: u32) -> io::Result<()>;

    fn chmod(&self, path: &Path, perm: u32) -> io::Result<()>;

    fn set_times(&self, path: &Path, accessed: SystemTime, modified: SystemTime)
    -> io::Result<()>;
}

/// Individual backend operations, used for call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Exists,
    ReadMeta,
    Size,
    CreateDirAll,
    Symlink,
    ReadLink,
    WriteFile,
    ReadFile,
    Lchown,
    Chmod,
    SetTimes,
}
