//! Capability shared by every kind of declaration

use crate::attr::Attribute;
use crate::backend::Backend;
use crate::error::Result;
use crate::meta::Meta;
use crate::types::FileMode;
use std::fmt;
use std::path::Path;
use std::time::SystemTime;

/// A declared filesystem entry
///
/// Each kind holds a [`Meta`] and delegates the shared parts of
/// [`align_attributes`](File::align_attributes) and [`verify`](File::verify)
/// to it, adding its own checks on top.
pub trait File: fmt::Display + fmt::Debug {
    /// Common attributes of this declaration
    fn meta(&self) -> &Meta;

    /// Materialize the entry under `root`, creating missing parents
    fn create(&self, fs: &dyn Backend, root: &Path) -> Result<()>;

    /// Apply ownership, permissions and times onto the created entry
    fn align_attributes(
        &self,
        fs: &dyn Backend,
        ownership: bool,
        mode: bool,
        times: bool,
        root: Option<&Path>,
    ) -> Result<()>;

    /// Compare the declaration with the entry under `root`
    fn verify(&self, fs: &dyn Backend, root: &Path) -> Result<()>;

    fn path(&self) -> &Path {
        &self.meta().path
    }

    fn mode(&self) -> FileMode {
        self.meta().mode
    }

    fn accessed(&self) -> SystemTime {
        self.meta().accessed
    }

    fn modified(&self) -> SystemTime {
        self.meta().modified
    }

    fn uid(&self) -> u32 {
        self.meta().uid
    }

    fn gid(&self) -> u32 {
        self.meta().gid
    }
}

/// A boxed declaration for type-erased storage
pub type BoxedFile = Box<dyn File>;

/// Builds a declaration from the factory's hardcoded and extra defaults
///
/// Returning `None` means the constructor is broken; the factory treats it
/// as a fatal misuse.
pub type Constructor = Box<dyn Fn(&[Attribute], &[Attribute]) -> Option<BoxedFile>>;
