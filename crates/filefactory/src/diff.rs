//! Categories of difference between a declaration and the real filesystem

bitflags::bitflags! {
    /// One bit per kind of mismatch; unions summarize several mismatches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Difference: u64 {
        const ALL_FAILURES = 1 << 0;
        /// Entry is missing or could not be inspected
        const NOT_PRESENT_OR_NOT_ACCESSIBLE = 1 << 1;
        const WRONG_TYPE = 1 << 2;
        const WRONG_PERMISSIONS = 1 << 3;
        const WRONG_OWNER = 1 << 4;
        const WRONG_GROUP = 1 << 5;
        const WRONG_MODIFIED_TIME = 1 << 6;
        const WRONG_ACCESSED_TIME = 1 << 7;
        const WRONG_SIZE = 1 << 8;
        const WRONG_LINK_TARGET = 1 << 9;
        const WRONG_CONTENTS = 1 << 10;
    }
}

impl Difference {
    /// Names of the individual kinds contained in this union
    pub fn kinds(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}
