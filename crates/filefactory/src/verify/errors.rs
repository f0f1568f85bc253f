//! Aggregation of verification mismatches

use crate::diff::Difference;
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single mismatch found at one path
#[derive(Debug)]
pub struct VerificationError {
    pub difference: Difference,
    pub path: PathBuf,
    pub cause: anyhow::Error,
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

/// Accumulator of mismatches across one or more declarations
///
/// Tracks every `(difference, path, cause)` triple in insertion order plus
/// the union of all differences seen.
#[derive(Debug, Default)]
pub struct VerificationErrors {
    combined: Difference,
    errors: Vec<VerificationError>,
}

impl VerificationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mismatch
    pub fn add(&mut self, difference: Difference, path: impl Into<PathBuf>, cause: anyhow::Error) {
        self.combined |= difference;
        self.errors.push(VerificationError {
            difference,
            path: path.into(),
            cause,
        });
    }

    /// Absorb the mismatches of a verification result
    ///
    /// `Ok` is a no-op and an [`Error::Verification`] is consumed entirely;
    /// both yield `Ok(())`. Any other error is handed back unchanged so the
    /// caller can propagate it.
    pub fn merge(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(Error::Verification(other)) => {
                self.absorb(other);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Move every triple of `other` into this aggregator
    pub fn absorb(&mut self, other: VerificationErrors) {
        for error in other.errors {
            self.add(error.difference, error.path, error.cause);
        }
    }

    pub fn is_not_present_or_inaccessible(&self) -> bool {
        self.combined
            .contains(Difference::NOT_PRESENT_OR_NOT_ACCESSIBLE)
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.combined.contains(Difference::WRONG_TYPE)
    }

    /// `Ok(())` when nothing was recorded, otherwise this aggregator as an error
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Verification(self))
        }
    }

    /// Whether exactly this difference was recorded for this path
    pub fn has_difference(&self, difference: Difference, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.errors
            .iter()
            .any(|e| e.difference == difference && e.path == path)
    }

    /// Union of all differences recorded for a path
    pub fn difference_for(&self, path: impl AsRef<Path>) -> Difference {
        let path = path.as_ref();
        self.errors
            .iter()
            .filter(|e| e.path == path)
            .fold(Difference::empty(), |acc, e| acc | e.difference)
    }

    /// Union of every difference recorded so far
    pub fn combined_difference(&self) -> Difference {
        self.combined
    }

    pub fn errors(&self) -> &[VerificationError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &VerificationError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for VerificationErrors {
    /// One cause per line, in insertion order
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error.cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::io;

    #[test]
    fn test_add_tracks_union() {
        let mut errors = VerificationErrors::new();
        errors.add(Difference::WRONG_OWNER, "/r/a", anyhow!("owner"));
        errors.add(Difference::WRONG_SIZE, "/r/b", anyhow!("size"));

        assert_eq!(
            errors.combined_difference(),
            Difference::WRONG_OWNER | Difference::WRONG_SIZE
        );
        assert!(errors.has_difference(Difference::WRONG_OWNER, "/r/a"));
        assert!(errors.has_difference(Difference::WRONG_SIZE, "/r/b"));
        assert!(!errors.has_difference(Difference::WRONG_OWNER, "/r/b"));
        assert!(!errors.has_difference(Difference::WRONG_SIZE, "/r/a"));
    }

    #[test]
    fn test_difference_for_path() {
        let mut errors = VerificationErrors::new();
        errors.add(Difference::WRONG_OWNER, "/r/a", anyhow!("owner"));
        errors.add(Difference::WRONG_GROUP, "/r/a", anyhow!("group"));
        errors.add(Difference::WRONG_SIZE, "/r/b", anyhow!("size"));

        assert_eq!(
            errors.difference_for("/r/a"),
            Difference::WRONG_OWNER | Difference::WRONG_GROUP
        );
        assert_eq!(errors.difference_for("/r/b"), Difference::WRONG_SIZE);
        assert_eq!(errors.difference_for("/r/c"), Difference::empty());
    }

    #[test]
    fn test_into_result() {
        assert!(VerificationErrors::new().into_result().is_ok());

        let mut errors = VerificationErrors::new();
        errors.add(Difference::WRONG_TYPE, "/r/a", anyhow!("type"));
        let err = errors.into_result().unwrap_err();
        let verification = err.as_verification().unwrap();
        assert_eq!(verification.len(), 1);
        assert!(verification.is_type_mismatch());
    }

    #[test]
    fn test_merge_absorbs_verification_errors() {
        let mut other = VerificationErrors::new();
        other.add(Difference::WRONG_OWNER, "/r/a", anyhow!("owner"));
        other.add(
            Difference::NOT_PRESENT_OR_NOT_ACCESSIBLE,
            "/r/b",
            anyhow!("missing"),
        );

        let mut errors = VerificationErrors::new();
        errors.add(Difference::WRONG_SIZE, "/r/c", anyhow!("size"));
        assert!(errors.merge(Err(Error::Verification(other))).is_ok());
        assert!(errors.merge(Ok(())).is_ok());

        assert_eq!(errors.len(), 3);
        assert!(errors.is_not_present_or_inaccessible());
        assert!(!errors.is_type_mismatch());
        assert!(errors.has_difference(Difference::WRONG_OWNER, "/r/a"));
    }

    #[test]
    fn test_merge_returns_other_errors_unchanged() {
        let mut errors = VerificationErrors::new();
        let result = errors.merge(Err(Error::Io {
            path: PathBuf::from("/r/a"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }));

        match result {
            Err(Error::Io { path, source }) => {
                assert_eq!(path, PathBuf::from("/r/a"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected io error, got {other:?}"),
        }
        assert!(errors.is_empty());
    }

    #[test]
    fn test_display_lists_causes_in_order() {
        let mut errors = VerificationErrors::new();
        errors.add(Difference::WRONG_OWNER, "/r/a", anyhow!("expected 1, actual 2"));
        errors.add(Difference::WRONG_GROUP, "/r/a", anyhow!("expected 3, actual 4"));
        assert_eq!(
            errors.to_string(),
            "expected 1, actual 2\nexpected 3, actual 4\n"
        );
    }
}
