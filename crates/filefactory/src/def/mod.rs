//! Declaration kinds and their constructors
//!
//! Constructors capture the call-site attributes and return a
//! [`Constructor`](crate::file::Constructor). The factory later calls it
//! with its defaults; attributes are combined in this order, each stage
//! overriding the previous one:
//!
//! 1. factory hardcoded defaults (ownership, times)
//! 2. kind defaults (e.g. permissions, size)
//! 3. factory extra defaults
//! 4. call-site attributes

mod directory;
mod regular;
mod symlink;

pub use directory::{Directory, dir};
pub use regular::{Regular, reg};
pub use symlink::{Symlink, sym};

use crate::attr::Attribute;

/// Concatenate attribute lists in precedence order
fn combine(
    hardcoded: &[Attribute],
    kind_defaults: &[Attribute],
    extra: &[Attribute],
    specific: &[Attribute],
) -> Vec<Attribute> {
    let mut combined =
        Vec::with_capacity(hardcoded.len() + kind_defaults.len() + extra.len() + specific.len());
    combined.extend_from_slice(hardcoded);
    combined.extend_from_slice(kind_defaults);
    combined.extend_from_slice(extra);
    combined.extend_from_slice(specific);
    combined
}

/// Permissions of parent directories created implicitly
const PARENT_DIR_PERM: u32 = 0o777;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr;

    #[test]
    fn test_combine_order() {
        let combined = combine(
            &[attr::owner(1)],
            &[attr::mode_perm(0o666)],
            &[attr::owner(2)],
            &[attr::owner(3), attr::size(5)],
        );
        assert_eq!(
            combined,
            vec![
                attr::owner(1),
                attr::mode_perm(0o666),
                attr::owner(2),
                attr::owner(3),
                attr::size(5)
            ]
        );
    }
}
