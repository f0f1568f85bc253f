//! # filefactory
//!
//! Declarative filesystem fixtures for tests.
//!
//! Describe the entries a test needs (regular files, directories, symlinks)
//! together with their permissions, ownership, timestamps and contents.
//! The same declarations can then materialize the tree under a root
//! directory, or verify that a tree produced by the code under test looks
//! exactly as expected.
//!
//! ## Core Concepts
//!
//! - **Declaration**: the expected state of one entry ([`File`])
//! - **Attribute**: one typed value in a declaration's ordered attribute list ([`Attribute`])
//! - **Instruction**: turns one verification [`Aspect`] on or off
//! - **Factory**: supplies ownership and timestamp defaults shared by its declarations ([`FileFactory`])
//! - **Aggregator**: every mismatch found, tagged with a [`Difference`] and a path ([`VerificationErrors`])
//!
//! ## Example
//!
//! ```no_run
//! use filefactory::{Difference, FileFactory, Identity, attr, create_files, dir, reg, sym, verify_files};
//! use std::path::Path;
//!
//! let identity = Identity::current().expect("identity");
//! let factory = FileFactory::new(&identity, &[]);
//! let root = Path::new("/tmp/fixture");
//!
//! let files = factory.files_to_create([
//!     dir("a", &[attr::mode_perm(0o750)]),
//!     reg("a/f", &[attr::size(20), attr::seed(18)]),
//!     sym("a/l", "f", &[]),
//! ]);
//! create_files(root, &files).expect("create");
//!
//! let expected = factory.files_to_expect([reg("a/f", &[attr::size(20), attr::seed(99)])]);
//! let err = verify_files(root, &expected).unwrap_err();
//! let errors = err.as_verification().expect("mismatches");
//! assert!(errors.has_difference(Difference::WRONG_CONTENTS, root.join("a/f")));
//! ```
//!
//! ## Backends
//!
//! Every filesystem access goes through [`Backend`]:
//! - [`OsBackend`]: the real filesystem
//! - [`MemoryBackend`]: an in-memory tree with call counters and failure injection
//!
//! ## Platform Support
//!
//! Unix only; ownership and permission bits have no portable equivalent.

#[cfg(not(unix))]
compile_error!("filefactory supports unix targets only");

pub mod attr;
pub mod backend;
pub mod content;
pub mod def;
pub mod diff;
pub mod error;
pub mod factory;
pub mod file;
pub mod identity;
pub mod meta;
pub mod types;
pub mod verify;

pub use attr::Attribute;
pub use backend::{Backend, MemoryBackend, OsBackend, Operation};
pub use def::{Directory, Regular, Symlink, dir, reg, sym};
pub use diff::Difference;
pub use error::{Error, Result};
pub use factory::{FileFactory, create_files, create_files_with, verify_files, verify_files_with};
pub use file::{BoxedFile, Constructor, File};
pub use identity::Identity;
pub use meta::Meta;
pub use types::{FileMode, FileType};
pub use verify::{Aspect, Instruction, VerificationError, VerificationErrors};
