//! Backend acting on the real filesystem

use super::Backend;
use crate::meta::Meta;
use crate::types::{FileMode, FileType};
use filetime::{FileTime, set_file_times};
use std::fs::{self, DirBuilder, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Real filesystem via std and `filetime`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsBackend;

impl Backend for OsBackend {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn read_meta(&self, path: &Path) -> io::Result<Meta> {
        let md = fs::symlink_metadata(path)?;
        Ok(Meta {
            path: path.to_path_buf(),
            mode: FileMode::new(FileType::from_std(md.file_type()), md.mode()),
            accessed: md.accessed()?,
            modified: md.modified()?,
            uid: md.uid(),
            gid: md.gid(),
            instructions: Vec::new(),
        })
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::symlink_metadata(path)?.len())
    }

    fn create_dir_all(&self, path: &Path, perm: u32) -> io::Result<()> {
        DirBuilder::new().recursive(true).mode(perm).create(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    fn read_link(&self, link: &Path) -> io::Result<PathBuf> {
        fs::read_link(link)
    }

    fn write_file(&self, path: &Path, contents: &[u8], perm: u32) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(perm)
            .open(path)?;
        file.write_all(contents)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn lchown(&self, path: &Path, uid: u32, gid: u32) -> io::Result<()> {
        std::os::unix::fs::lchown(path, Some(uid), Some(gid))
    }

    fn chmod(&self, path: &Path, perm: u32) -> io::Result<()> {
        fs::set_permissions(path, Permissions::from_mode(perm))
    }

    fn set_times(
        &self,
        path: &Path,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> io::Result<()> {
        set_file_times(
            path,
            FileTime::from_system_time(accessed),
            FileTime::from_system_time(modified),
        )
    }
}
