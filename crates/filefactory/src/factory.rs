//! Factory defaults and the batch create/verify API

use crate::attr::{self, Attribute};
use crate::backend::{Backend, OsBackend};
use crate::error::Result;
use crate::file::{BoxedFile, Constructor};
use crate::identity::Identity;
use crate::verify::VerificationErrors;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Offset of the default access time from the default modification time
pub const ACCESSED_OFFSET: Duration = Duration::from_secs(90 * 60 + 15);

const CONSTRUCTOR_DID_NOT_DO_ITS_JOB: &str =
    "whoops, constructor is meant to create a wrapper in any case";

/// Supplies the defaults shared by every declaration it builds
///
/// Declarations from one factory share ownership and timestamps, so files
/// created from one set of declarations verify cleanly against another set
/// built by the same factory.
#[derive(Debug, Clone)]
pub struct FileFactory {
    hardcoded: Vec<Attribute>,
    extra: Vec<Attribute>,
}

impl FileFactory {
    /// Factory stamped with the current time
    pub fn new(identity: &Identity, extra: &[Attribute]) -> Self {
        Self::at(identity, SystemTime::now(), extra)
    }

    /// Factory whose default modification time is `now`
    pub fn at(identity: &Identity, now: SystemTime, extra: &[Attribute]) -> Self {
        let hardcoded = vec![
            identity.owner(),
            identity.primary_group(),
            attr::modified_at(now),
            attr::accessed_at(now + ACCESSED_OFFSET),
        ];
        Self {
            hardcoded,
            extra: extra.to_vec(),
        }
    }

    pub fn hardcoded(&self) -> &[Attribute] {
        &self.hardcoded
    }

    pub fn extra(&self) -> &[Attribute] {
        &self.extra
    }

    /// Build declarations from constructors, in order
    ///
    /// # Panics
    ///
    /// Panics if a constructor returns no declaration.
    pub fn files_to_create(
        &self,
        constructors: impl IntoIterator<Item = Constructor>,
    ) -> Vec<BoxedFile> {
        constructors
            .into_iter()
            .map(|constructor| {
                constructor(&self.hardcoded, &self.extra)
                    .unwrap_or_else(|| panic!("{CONSTRUCTOR_DID_NOT_DO_ITS_JOB}"))
            })
            .collect()
    }

    /// Same as [`files_to_create`](Self::files_to_create), reads better on
    /// the verifying side
    ///
    /// # Panics
    ///
    /// Panics if a constructor returns no declaration.
    pub fn files_to_expect(
        &self,
        constructors: impl IntoIterator<Item = Constructor>,
    ) -> Vec<BoxedFile> {
        self.files_to_create(constructors)
    }
}

/// Create every declaration under `root` on the real filesystem
pub fn create_files(root: &Path, files: &[BoxedFile]) -> Result<()> {
    create_files_with(&OsBackend, root, files)
}

/// Create every declaration, then align all of them
///
/// Aligning only after everything exists keeps later creations from
/// bumping the modification time of already aligned parent directories.
/// The first error aborts.
pub fn create_files_with(fs: &dyn Backend, root: &Path, files: &[BoxedFile]) -> Result<()> {
    for file in files {
        file.create(fs, root)?;
    }
    for file in files {
        file.align_attributes(fs, true, true, true, Some(root))?;
    }
    log::debug!("Created {} entries under {}", files.len(), root.display());
    Ok(())
}

/// Verify every declaration under `root` on the real filesystem
pub fn verify_files(root: &Path, files: &[BoxedFile]) -> Result<()> {
    verify_files_with(&OsBackend, root, files)
}

/// Verify every declaration, collecting mismatches across all of them
///
/// Mismatches never stop the batch; any other error aborts it.
pub fn verify_files_with(fs: &dyn Backend, root: &Path, files: &[BoxedFile]) -> Result<()> {
    let mut errors = VerificationErrors::new();
    for file in files {
        errors.merge(file.verify(fs, root))?;
    }
    log::debug!(
        "Verified {} entries under {} ({} mismatches)",
        files.len(),
        root.display(),
        errors.len()
    );
    errors.into_result()
}
