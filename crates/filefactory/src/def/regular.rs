use super::{PARENT_DIR_PERM, combine};
use crate::attr::{self, Attribute};
use crate::backend::Backend;
use crate::content::pseudo_random_bytes;
use crate::diff::Difference;
use crate::error::{Error, Result};
use crate::file::{BoxedFile, Constructor, File};
use crate::meta::{Meta, join_under};
use crate::types::FileType;
use crate::verify::{Aspect, VerificationErrors};
use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::path::{Path, PathBuf};

/// Bytes of each side included in a contents mismatch message
const CONTENTS_SAMPLE_LEN: usize = 50;

/// Regular file whose contents are generated from `(size, seed)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regular {
    pub meta: Meta,
    pub size: u64,
    pub seed: u64,
}

/// Declare a regular file (default permissions 0666, 20 bytes)
pub fn reg(path: impl Into<PathBuf>, attributes: &[Attribute]) -> Constructor {
    let path = path.into();
    let specific = attributes.to_vec();
    Box::new(move |hardcoded: &[Attribute], extra: &[Attribute]| {
        let kind_defaults = [attr::mode_perm(0o666), attr::size(20)];
        let combined = combine(hardcoded, &kind_defaults, extra, &specific);
        Some(Box::new(Regular::from_attributes(path.clone(), &combined)) as BoxedFile)
    })
}

impl Regular {
    /// Build directly from an already combined attribute list
    pub fn from_attributes(path: impl Into<PathBuf>, attributes: &[Attribute]) -> Self {
        let mut regular = Self {
            meta: Meta::default(),
            size: 0,
            seed: 0,
        };
        regular.meta.populate(path, attributes);
        for attribute in attributes {
            match *attribute {
                Attribute::Size(size) => regular.size = size,
                Attribute::Seed(seed) => regular.seed = seed,
                _ => {}
            }
        }
        regular.meta.mode = regular.meta.mode.with_file_type(FileType::Regular);
        regular
    }

    /// The bytes this file is expected to hold
    pub fn contents(&self) -> Result<Vec<u8>> {
        pseudo_random_bytes(self.size, self.seed)
    }
}

impl File for Regular {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn create(&self, fs: &dyn Backend, root: &Path) -> Result<()> {
        let path = join_under(root, &self.meta.path);
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent, PARENT_DIR_PERM)
                .map_err(Error::io(parent))?;
        }
        fs.write_file(&path, &self.contents()?, self.meta.mode.perm())
            .map_err(Error::io(&path))?;
        log::debug!("Created regular file {}", path.display());
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
        if self.meta.skips_everything() {
            return Ok(());
        }

        let mut errors = VerificationErrors::new();
        errors.merge(self.meta.verify(fs, root))?;
        if errors.is_not_present_or_inaccessible() || errors.is_type_mismatch() {
            return errors.into_result();
        }

        let path = join_under(root, &self.meta.path);

        if self.meta.should(Aspect::Size) {
            let actual = fs.size(&path).map_err(Error::io(&path))?;
            if actual != self.size {
                errors.add(
                    Difference::WRONG_SIZE,
                    &path,
                    anyhow!("expected {}, actual {}", self.size, actual),
                );
            }
        }

        if self.meta.should(Aspect::Contents) {
            let actual = fs.read_file(&path).map_err(Error::io(&path))?;
            let expected = self.contents()?;
            if actual != expected {
                errors.add(
                    Difference::WRONG_CONTENTS,
                    &path,
                    anyhow!(
                        "base64(bytes[:<={CONTENTS_SAMPLE_LEN}]) for expected {}, actual {}",
                        sample(&expected),
                        sample(&actual)
                    ),
                );
            }
        }

        errors.into_result()
    }
}

fn sample(bytes: &[u8]) -> String {
    STANDARD.encode(&bytes[..bytes.len().min(CONTENTS_SAMPLE_LEN)])
}

impl fmt::Display for Regular {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.meta, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Operation};
    use crate::verify;
    use std::io;

    const ROOT: &str = "/fixtures";

    fn build(constructor: &Constructor, extra: &[Attribute]) -> BoxedFile {
        let hardcoded = [attr::owner(1000), attr::group(1000)];
        constructor(&hardcoded, extra).unwrap()
    }

    fn created(file: &BoxedFile) -> MemoryBackend {
        let fs = MemoryBackend::default();
        file.create(&fs, Path::new(ROOT)).unwrap();
        file.align_attributes(&fs, true, true, true, Some(Path::new(ROOT)))
            .unwrap();
        fs.reset_calls();
        fs
    }

    #[test]
    fn test_defaults() {
        let file = build(&reg("a/f", &[]), &[]);
        assert_eq!(file.mode().perm(), 0o666);
        assert_eq!(file.mode().file_type(), FileType::Regular);
        assert_eq!(file.uid(), 1000);
        assert_eq!(file.path(), Path::new("a/f"));
        assert!(file.to_string().ends_with("a/f 20"));
    }

    #[test]
    fn test_precedence() {
        // extra factory defaults override kind defaults, call site overrides both
        let file = build(
            &reg("a/f", &[attr::seed(18)]),
            &[attr::mode_perm(0o600), attr::size(7), attr::seed(1)],
        );
        assert_eq!(file.mode().perm(), 0o600);
        assert!(file.to_string().ends_with("a/f 7"));

        let fs = created(&file);
        assert_eq!(
            fs.read_file(Path::new("/fixtures/a/f")).unwrap(),
            pseudo_random_bytes(7, 18).unwrap()
        );
    }

    #[test]
    fn test_create_then_verify() {
        let file = build(&reg("a/f", &[attr::size(20), attr::seed(18)]), &[]);
        let fs = created(&file);
        assert!(file.verify(&fs, Path::new(ROOT)).is_ok());
        assert_eq!(
            fs.read_file(Path::new("/fixtures/a/f")).unwrap(),
            pseudo_random_bytes(20, 18).unwrap()
        );
    }

    #[test]
    fn test_wrong_seed_is_a_contents_mismatch() {
        let file = build(&reg("a/f", &[attr::size(20), attr::seed(18)]), &[]);
        let fs = created(&file);

        let expected = build(&reg("a/f", &[attr::size(20), attr::seed(99)]), &[]);
        let err = expected.verify(&fs, Path::new(ROOT)).unwrap_err();
        let errors = err.as_verification().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_difference(Difference::WRONG_CONTENTS, "/fixtures/a/f"));
        assert!(
            errors
                .to_string()
                .starts_with("base64(bytes[:<=50]) for expected ")
        );
    }

    #[test]
    fn test_wrong_size_also_differs_in_contents() {
        let file = build(&reg("a/f", &[attr::size(20)]), &[]);
        let fs = created(&file);

        let expected = build(&reg("a/f", &[attr::size(21)]), &[]);
        let err = expected.verify(&fs, Path::new(ROOT)).unwrap_err();
        assert_eq!(
            err.as_verification().unwrap().difference_for("/fixtures/a/f"),
            Difference::WRONG_SIZE | Difference::WRONG_CONTENTS
        );
    }

    #[test]
    fn test_size_and_contents_checks_can_be_disabled() {
        let file = build(&reg("a/f", &[attr::size(20)]), &[]);
        let fs = created(&file);

        let expected = build(
            &reg(
                "a/f",
                &[
                    attr::size(21),
                    verify::size(false).into(),
                    verify::contents(false).into(),
                ],
            ),
            &[],
        );
        assert!(expected.verify(&fs, Path::new(ROOT)).is_ok());
        assert_eq!(fs.calls(Operation::Size), 0);
        assert_eq!(fs.calls(Operation::ReadFile), 0);
    }

    #[test]
    fn test_missing_file_skips_own_checks() {
        let file = build(&reg("a/f", &[]), &[]);
        let fs = MemoryBackend::default();

        let err = file.verify(&fs, Path::new(ROOT)).unwrap_err();
        let errors = err.as_verification().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.is_not_present_or_inaccessible());
        assert_eq!(fs.calls(Operation::ReadMeta), 0);
        assert_eq!(fs.calls(Operation::Size), 0);
        assert_eq!(fs.calls(Operation::ReadFile), 0);
    }

    #[test]
    fn test_directory_in_place_of_file() {
        let file = build(&reg("a/f", &[]), &[]);
        let fs = MemoryBackend::default();
        fs.create_dir_all(Path::new("/fixtures/a/f"), 0o777).unwrap();

        let err = file.verify(&fs, Path::new(ROOT)).unwrap_err();
        let errors = err.as_verification().unwrap();
        assert_eq!(errors.combined_difference(), Difference::WRONG_TYPE);
        assert_eq!(fs.calls(Operation::ReadFile), 0);
    }

    #[test]
    fn test_skip_everything_touches_nothing() {
        let file = build(&reg("a/f", &[verify::all_by_default(false).into()]), &[]);
        let fs = MemoryBackend::default();
        assert!(file.verify(&fs, Path::new(ROOT)).is_ok());
        assert_eq!(fs.total_calls(), 0);
    }

    #[test]
    fn test_read_error_propagates() {
        let file = build(&reg("a/f", &[]), &[]);
        let fs = created(&file);
        fs.fail_next(Operation::ReadFile, io::ErrorKind::PermissionDenied);

        let err = file.verify(&fs, Path::new(ROOT)).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_create_write_error_aborts() {
        let file = build(&reg("a/f", &[]), &[]);
        let fs = MemoryBackend::default();
        fs.fail_next(Operation::CreateDirAll, io::ErrorKind::PermissionDenied);

        assert!(file.create(&fs, Path::new(ROOT)).is_err());
        assert_eq!(fs.calls(Operation::WriteFile), 0);
    }

    #[test]
    fn test_sample_is_bounded() {
        let long = vec![0u8; 200];
        assert_eq!(sample(&long), STANDARD.encode([0u8; 50]));
        assert_eq!(sample(b"ab"), STANDARD.encode(b"ab"));
    }
}
