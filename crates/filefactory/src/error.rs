use crate::verify::VerificationErrors;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned by fixture operations.
///
/// [`Error::Verification`] carries mismatches between a declaration and the
/// real filesystem. Every other variant is an operational failure that
/// aborts whatever batch was in progress.
#[derive(Debug, Error)]
pub enum Error {
    /// The filesystem differs from the declarations
    #[error("{0}")]
    Verification(VerificationErrors),

    /// A root was supplied for a declaration with an absolute path
    #[error("root cannot be used when meta path is absolute: {}", .0.display())]
    RootWithAbsolutePath(PathBuf),

    /// A declaration with a relative path was aligned without a root
    #[error("relative meta path requires root: {}", .0.display())]
    RelativePathWithoutRoot(PathBuf),

    /// A filesystem operation failed
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path the failing operation acted on
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A regular file is too large to generate in memory
    #[error("file size {0} does not fit in memory")]
    SizeTooLarge(u64),

    /// The current user's ids could not be resolved
    #[error("could not resolve current identity: {0}")]
    Identity(String),
}

impl Error {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if this error describes mismatches rather than a failure
    pub fn is_verification(&self) -> bool {
        matches!(self, Error::Verification(_))
    }

    pub fn as_verification(&self) -> Option<&VerificationErrors> {
        match self {
            Error::Verification(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn into_verification(self) -> Option<VerificationErrors> {
        match self {
            Error::Verification(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<VerificationErrors> for Error {
    fn from(errors: VerificationErrors) -> Self {
        Error::Verification(errors)
    }
}

/// Result type for fixture operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Difference;

    #[test]
    fn test_error_classification() {
        let mut errors = VerificationErrors::new();
        errors.add(Difference::WRONG_SIZE, "/r/f", anyhow::anyhow!("size"));
        let verification = Error::from(errors);
        assert!(verification.is_verification());
        assert_eq!(verification.to_string(), "size\n");

        let io = Error::io(Path::new("/r/f"))(io::Error::other("boom"));
        assert!(!io.is_verification());
        assert!(io.as_verification().is_none());
        assert_eq!(io.to_string(), "IO error at /r/f: boom");

        let too_large = Error::SizeTooLarge(u64::MAX);
        assert!(!too_large.is_verification());
        assert_eq!(
            too_large.to_string(),
            "file size 18446744073709551615 does not fit in memory"
        );

        let conflict = Error::RootWithAbsolutePath(PathBuf::from("/abs"));
        assert!(conflict.into_verification().is_none());
    }
}
