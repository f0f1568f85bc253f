//! Attributes shared by every kind of declaration
//!
//! A [`Meta`] describes either the expected state of an entry (built by
//! [`Meta::populate`]) or its actual state (read through
//! [`Backend::read_meta`]). The generic verify and align logic lives here;
//! file kinds wrap it with their own checks.

use crate::attr::Attribute;
use crate::backend::Backend;
use crate::diff::Difference;
use crate::error::{Error, Result};
use crate::types::FileMode;
use crate::verify::{self, Aspect, Instruction, VerificationErrors};
use anyhow::anyhow;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Layout used when rendering timestamps
pub const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Render a timestamp in local time with nanoseconds
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIME_LAYOUT).to_string()
}

/// Join `path` under `root`, treating an absolute `path` as relative to it
pub(crate) fn join_under(root: &Path, path: &Path) -> PathBuf {
    if root.as_os_str().is_empty() {
        return path.to_path_buf();
    }
    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    root.join(relative)
}

/// Path, mode, ownership, times and verification instructions of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub path: PathBuf,
    pub mode: FileMode,
    pub accessed: SystemTime,
    pub modified: SystemTime,
    pub uid: u32,
    pub gid: u32,
    pub instructions: Vec<Instruction>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            mode: FileMode::default(),
            accessed: UNIX_EPOCH,
            modified: UNIX_EPOCH,
            uid: 0,
            gid: 0,
            instructions: Vec::new(),
        }
    }
}

impl Meta {
    /// Apply an ordered attribute list on top of the current fields
    ///
    /// Later attributes overwrite earlier ones; instructions are appended.
    /// Size and seed belong to regular files and are ignored here.
    pub fn populate(&mut self, path: impl Into<PathBuf>, attributes: &[Attribute]) {
        for attribute in attributes {
            match *attribute {
                Attribute::PathMode(perm) => self.mode = self.mode.with_perm(perm),
                Attribute::AccessedAt(time) => self.accessed = time,
                Attribute::ModifiedAt(time) => self.modified = time,
                Attribute::Owner(uid) => self.uid = uid,
                Attribute::Group(gid) => self.gid = gid,
                Attribute::Instruction(instruction) => self.instructions.push(instruction),
                Attribute::Size(_) | Attribute::Seed(_) => {}
            }
        }
        self.path = path.into();
    }

    /// Whether `aspect` should be checked for this entry
    pub fn should(&self, aspect: Aspect) -> bool {
        verify::should(&self.instructions, aspect)
    }

    /// Whether this entry's attributes are declared irrelevant
    pub fn skips_everything(&self) -> bool {
        verify::skips_everything(&self.instructions)
    }

    pub fn is_symlink(&self) -> bool {
        self.mode.is_symlink()
    }

    /// Compare this declaration with the entry found under `root`
    ///
    /// Stops at the first of: missing entry, unreadable metadata (returned
    /// as an operational error) or wrong type. Otherwise every enabled
    /// attribute check runs and all mismatches are returned together.
    pub fn verify(&self, fs: &dyn Backend, root: &Path) -> Result<()> {
        if self.skips_everything() {
            log::trace!("Skipping verification of {}", self.path.display());
            return Ok(());
        }

        let mut errors = VerificationErrors::new();
        let path = join_under(root, &self.path);

        match fs.exists(&path) {
            Ok(true) => {}
            Ok(false) => {
                errors.add(
                    Difference::NOT_PRESENT_OR_NOT_ACCESSIBLE,
                    &path,
                    anyhow!("file does not exist"),
                );
                return errors.into_result();
            }
            Err(e) => {
                errors.add(Difference::NOT_PRESENT_OR_NOT_ACCESSIBLE, &path, e.into());
                return errors.into_result();
            }
        }

        let actual = fs.read_meta(&path).map_err(Error::io(&path))?;

        if actual.mode.file_type() != self.mode.file_type() {
            errors.add(
                Difference::WRONG_TYPE,
                &path,
                anyhow!("expected {}, actual {}", self.mode, actual.mode),
            );
            return errors.into_result();
        }

        if self.should(Aspect::ModePerm) && actual.mode.perm() != self.mode.perm() {
            errors.add(
                Difference::WRONG_PERMISSIONS,
                &path,
                anyhow!("expected {}, actual {}", self.mode, actual.mode),
            );
        }

        if self.should(Aspect::Uid) && actual.uid != self.uid {
            errors.add(
                Difference::WRONG_OWNER,
                &path,
                anyhow!("expected {}, actual {}", self.uid, actual.uid),
            );
        }

        if self.should(Aspect::Gid) && actual.gid != self.gid {
            errors.add(
                Difference::WRONG_GROUP,
                &path,
                anyhow!("expected {}, actual {}", self.gid, actual.gid),
            );
        }

        if self.should(Aspect::Accessed) && actual.accessed != self.accessed {
            errors.add(
                Difference::WRONG_ACCESSED_TIME,
                &path,
                anyhow!(
                    "expected {}, actual {}",
                    format_time(self.accessed),
                    format_time(actual.accessed)
                ),
            );
        }

        if self.should(Aspect::Modified) && actual.modified != self.modified {
            errors.add(
                Difference::WRONG_MODIFIED_TIME,
                &path,
                anyhow!(
                    "expected {}, actual {}",
                    format_time(self.modified),
                    format_time(actual.modified)
                ),
            );
        }

        log::debug!(
            "Verified {} ({} mismatches)",
            path.display(),
            errors.len()
        );
        errors.into_result()
    }

    /// Write ownership, permissions and times of this declaration onto the
    /// real entry
    ///
    /// An absolute path must come without `root`, a relative one with it.
    /// Permissions and times are never applied to symlinks.
    pub fn align_attributes(
        &self,
        fs: &dyn Backend,
        ownership: bool,
        mode: bool,
        times: bool,
        root: Option<&Path>,
    ) -> Result<()> {
        let root = root.filter(|r| !r.as_os_str().is_empty());
        let path = match (self.path.is_absolute(), root) {
            (true, Some(_)) => return Err(Error::RootWithAbsolutePath(self.path.clone())),
            (true, None) => self.path.clone(),
            (false, None) => return Err(Error::RelativePathWithoutRoot(self.path.clone())),
            (false, Some(root)) => root.join(&self.path),
        };

        if ownership {
            fs.lchown(&path, self.uid, self.gid)
                .map_err(Error::io(&path))?;
        }

        if mode && !self.is_symlink() {
            fs.chmod(&path, self.mode.perm())
                .map_err(Error::io(&path))?;
        }

        if times && !self.is_symlink() {
            fs.set_times(&path, self.accessed, self.modified)
                .map_err(Error::io(&path))?;
        }

        log::debug!("Aligned attributes of {}", path.display());
        Ok(())
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.mode,
            self.uid,
            self.gid,
            format_time(self.modified),
            format_time(self.accessed),
            self.path.display()
        )
    }
}
