use super::{PARENT_DIR_PERM, combine};
use crate::attr::Attribute;
use crate::backend::Backend;
use crate::diff::Difference;
use crate::error::{Error, Result};
use crate::file::{BoxedFile, Constructor, File};
use crate::meta::{Meta, join_under};
use crate::types::FileType;
use crate::verify::{self, Aspect, VerificationErrors};
use anyhow::anyhow;
use std::fmt;
use std::path::{Path, PathBuf};

/// Symbolic link pointing at `target`
///
/// The target is stored verbatim and never resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    pub meta: Meta,
    pub target: PathBuf,
}

/// Declare a symlink
///
/// Permissions and times of a link are platform dependent, so their
/// checks are off unless re-enabled at the call site.
pub fn sym(
    path: impl Into<PathBuf>,
    target: impl Into<PathBuf>,
    attributes: &[Attribute],
) -> Constructor {
    let path = path.into();
    let target = target.into();
    let specific = attributes.to_vec();
    Box::new(move |hardcoded: &[Attribute], extra: &[Attribute]| {
        let kind_defaults: [Attribute; 3] = [
            verify::mode_perm(false).into(),
            verify::modified_time(false).into(),
            verify::accessed_time(false).into(),
        ];
        let combined = combine(hardcoded, &kind_defaults, extra, &specific);
        let symlink = Symlink::from_attributes(path.clone(), target.clone(), &combined);
        Some(Box::new(symlink) as BoxedFile)
    })
}

impl Symlink {
    pub fn from_attributes(
        path: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        attributes: &[Attribute],
    ) -> Self {
        let mut meta = Meta::default();
        meta.populate(path, attributes);
        meta.mode = meta.mode.with_file_type(FileType::Symlink);
        Self {
            meta,
            target: target.into(),
        }
    }
}

impl File for Symlink {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn create(&self, fs: &dyn Backend, root: &Path) -> Result<()> {
        let path = join_under(root, &self.meta.path);
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent, PARENT_DIR_PERM)
                .map_err(Error::io(parent))?;
        }
        fs.symlink(&self.target, &path)
            .map_err(Error::io(&path))?;
        log::debug!(
            "Created symlink {} -> {}",
            path.display(),
            self.target.display()
        );
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

        if self.meta.should(Aspect::SymlinkTarget) {
            let path = join_under(root, &self.meta.path);
            let actual = fs.read_link(&path).map_err(Error::io(&path))?;
            if actual != self.target {
                errors.add(
                    Difference::WRONG_LINK_TARGET,
                    &path,
                    anyhow!(
                        "expected {}, actual {}",
                        self.target.display(),
                        actual.display()
                    ),
                );
            }
        }

        errors.into_result()
    }
}

impl fmt::Display for Symlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.meta, self.target.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr;
    use crate::backend::{MemoryBackend, Operation};
    use std::io;

    const ROOT: &str = "/fixtures";

    fn build(constructor: &Constructor) -> BoxedFile {
        constructor(&[attr::owner(1000), attr::group(1000)], &[]).unwrap()
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
    fn test_defaults_disable_mode_and_times() {
        let link = build(&sym("a/l", "../t", &[]));
        assert!(link.mode().is_symlink());
        assert!(!link.meta().should(Aspect::ModePerm));
        assert!(!link.meta().should(Aspect::Modified));
        assert!(!link.meta().should(Aspect::Accessed));
        assert!(link.meta().should(Aspect::Uid));
        assert!(link.meta().should(Aspect::SymlinkTarget));
        assert!(link.to_string().ends_with("a/l -> ../t"));
    }

    #[test]
    fn test_dangling_target_is_fine() {
        let link = build(&sym("a/l", "does/not/exist", &[]));
        let fs = created(&link);
        assert!(link.verify(&fs, Path::new(ROOT)).is_ok());
        assert_eq!(fs.calls(Operation::ReadLink), 1);
    }

    #[test]
    fn test_wrong_target() {
        let fs = created(&build(&sym("a/l", "one", &[])));

        let expected = build(&sym("a/l", "two", &[]));
        let err = expected.verify(&fs, Path::new(ROOT)).unwrap_err();
        let errors = err.as_verification().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_difference(Difference::WRONG_LINK_TARGET, "/fixtures/a/l"));
        assert_eq!(errors.to_string(), "expected two, actual one\n");
    }

    #[test]
    fn test_target_check_can_be_disabled() {
        let fs = created(&build(&sym("a/l", "one", &[])));

        let expected = build(&sym("a/l", "two", &[verify::symlink_target(false).into()]));
        assert!(expected.verify(&fs, Path::new(ROOT)).is_ok());
        assert_eq!(fs.calls(Operation::ReadLink), 0);
    }

    #[test]
    fn test_regular_file_in_place_of_link() {
        let fs = MemoryBackend::default();
        fs.create_dir_all(Path::new("/fixtures/a"), 0o777).unwrap();
        fs.write_file(Path::new("/fixtures/a/l"), b"", 0o644).unwrap();

        let expected = build(&sym("a/l", "one", &[]));
        let err = expected.verify(&fs, Path::new(ROOT)).unwrap_err();
        let errors = err.as_verification().unwrap();
        assert!(errors.is_type_mismatch());
        assert_eq!(fs.calls(Operation::ReadLink), 0);
    }

    #[test]
    fn test_read_link_error_propagates() {
        let link = build(&sym("a/l", "one", &[]));
        let fs = created(&link);
        fs.fail_next(Operation::ReadLink, io::ErrorKind::PermissionDenied);
        assert!(matches!(
            link.verify(&fs, Path::new(ROOT)),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_align_leaves_mode_and_times_alone() {
        let link = build(&sym("a/l", "one", &[]));
        let fs = MemoryBackend::default();
        link.create(&fs, Path::new(ROOT)).unwrap();
        link.align_attributes(&fs, true, true, true, Some(Path::new(ROOT)))
            .unwrap();
        assert_eq!(fs.calls(Operation::Lchown), 1);
        assert_eq!(fs.calls(Operation::Chmod), 0);
        assert_eq!(fs.calls(Operation::SetTimes), 0);
    }
}
