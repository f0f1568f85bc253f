use super::{PARENT_DIR_PERM, combine};
use crate::attr::{self, Attribute};
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::file::{BoxedFile, Constructor, File};
use crate::meta::{Meta, join_under};
use crate::types::FileType;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub meta: Meta,
}

/// Declare a directory (default permissions 0777)
pub fn dir(path: impl Into<PathBuf>, attributes: &[Attribute]) -> Constructor {
    let path = path.into();
    let specific = attributes.to_vec();
    Box::new(move |hardcoded: &[Attribute], extra: &[Attribute]| {
        let combined = combine(hardcoded, &[attr::mode_perm(0o777)], extra, &specific);
        Some(Box::new(Directory::from_attributes(path.clone(), &combined)) as BoxedFile)
    })
}

impl Directory {
    pub fn from_attributes(path: impl Into<PathBuf>, attributes: &[Attribute]) -> Self {
        let mut meta = Meta::default();
        meta.populate(path, attributes);
        meta.mode = meta.mode.with_file_type(FileType::Directory);
        Self { meta }
    }
}

impl File for Directory {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn create(&self, fs: &dyn Backend, root: &Path) -> Result<()> {
        let path = join_under(root, &self.meta.path);
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent, PARENT_DIR_PERM)
                .map_err(Error::io(parent))?;
        }
        fs.create_dir_all(&path, self.meta.mode.perm())
            .map_err(Error::io(&path))?;
        log::debug!("Created directory {}", path.display());
        Ok(())
    }

    fn align_attributes(
        &self,
        fs: &dyn Backend,
        ownership: bool,
        mode: bool,
        times: bool,
        root: Option<&Path>,
    ) -> Result<()> {
        self.meta
            .align_attributes(fs, ownership, mode, times, root)
    }

    fn verify(&self, fs: &dyn Backend, root: &Path) -> Result<()> {
        self.meta.verify(fs, root)
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.meta, f)
    }
}
