//! Verification policy and mismatch aggregation

pub mod errors;
pub mod instruction;

pub use errors::{VerificationError, VerificationErrors};
pub use instruction::{
    Aspect, Instruction, accessed_time, all_by_default, contents, gid, mode_perm, modified_time,
    should, size, skips_everything, symlink_target, uid,
};
