pub mod create;
pub mod show;
pub mod verify;

use anyhow::{Context, Result};
use filefactory::{Attribute, FileFactory, Identity};
use std::path::PathBuf;

/// Expand `~` and environment variables in a configured root
pub fn expand_root(root: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(root)
        .with_context(|| format!("Could not expand root '{root}'"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Factory for the current user with the given extra defaults
pub fn factory(extra: &[Attribute]) -> Result<FileFactory> {
    let identity = Identity::current().context("Could not resolve current user")?;
    Ok(FileFactory::new(&identity, extra))
}
