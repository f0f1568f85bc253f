//! Numeric identity of the current user
//!
//! Resolved once by the caller and handed to [`FileFactory`](crate::FileFactory)
//! so declarations default to files the current user can create and own.

use crate::attr::{self, Attribute};
use crate::error::{Error, Result};
use std::io;

/// Current user's uid, primary gid and one other gid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub primary_gid: u32,
    /// A secondary group of the user, or the primary one if there is none
    pub other_gid: u32,
}

impl Identity {
    /// Build an identity from the user's ids and group list
    ///
    /// The other gid is the last group distinct from the primary one.
    pub fn from_ids(uid: u32, primary_gid: u32, groups: &[u32]) -> Self {
        let other_gid = groups
            .iter()
            .rev()
            .copied()
            .find(|gid| *gid != primary_gid)
            .unwrap_or(primary_gid);
        Self {
            uid,
            primary_gid,
            other_gid,
        }
    }

    /// Resolve the identity of the running process
    #[allow(unsafe_code)]
    pub fn current() -> Result<Self> {
        // SAFETY: getuid/getgid cannot fail and touch no memory
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };

        // SAFETY: a zero size only queries the number of groups
        let count = unsafe { libc::getgroups(0, std::ptr::null_mut()) };
        if count < 0 {
            return Err(Error::Identity(io::Error::last_os_error().to_string()));
        }

        let mut groups: Vec<libc::gid_t> = vec![0; count as usize];
        // SAFETY: the buffer holds exactly `count` gids
        let written = unsafe { libc::getgroups(count, groups.as_mut_ptr()) };
        if written < 0 {
            return Err(Error::Identity(io::Error::last_os_error().to_string()));
        }
        groups.truncate(written as usize);

        let identity = Self::from_ids(uid, gid, &groups);
        log::debug!(
            "Resolved identity uid={} gid={} other_gid={}",
            identity.uid,
            identity.primary_gid,
            identity.other_gid
        );
        Ok(identity)
    }

    pub fn owner(&self) -> Attribute {
        attr::owner(self.uid)
    }

    pub fn primary_group(&self) -> Attribute {
        attr::group(self.primary_gid)
    }

    pub fn other_group(&self) -> Attribute {
        attr::group(self.other_gid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_gid_falls_back_to_primary() {
        let identity = Identity::from_ids(1000, 100, &[100]);
        assert_eq!(identity.other_gid, 100);

        let identity = Identity::from_ids(1000, 100, &[]);
        assert_eq!(identity.other_gid, 100);
    }

    #[test]
    fn test_other_gid_picks_last_secondary() {
        let identity = Identity::from_ids(1000, 100, &[100, 20, 30, 100]);
        assert_eq!(identity.other_gid, 30);
    }

    #[test]
    fn test_current_matches_process() {
        let identity = Identity::current().unwrap();
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("owned");
        std::fs::write(&file, "x").unwrap();

        use std::os::unix::fs::MetadataExt;
        let md = std::fs::metadata(&file).unwrap();
        assert_eq!(md.uid(), identity.uid);
    }

    #[test]
    fn test_attribute_helpers() {
        let identity = Identity::from_ids(1, 2, &[3]);
        assert_eq!(identity.owner(), Attribute::Owner(1));
        assert_eq!(identity.primary_group(), Attribute::Group(2));
        assert_eq!(identity.other_group(), Attribute::Group(3));
    }
}
