//! Attributes describe expected meta information about an entry.
//!
//! They are used both when a fixture is created and when it is verified.
//! Declarations receive ordered lists of attributes; for every field the
//! last matching attribute wins, while instructions accumulate.

use crate::meta::format_time;
use crate::types::PERM_MASK;
use crate::verify::Instruction;
use std::fmt;
use std::time::SystemTime;

/// One entry of a declaration's attribute list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Permission bits (type bits are decided by the declaration kind)
    PathMode(u32),
    AccessedAt(SystemTime),
    ModifiedAt(SystemTime),
    /// Numeric owner id
    Owner(u32),
    /// Numeric group id
    Group(u32),
    /// Byte length of a regular file
    Size(u64),
    /// Seed of a regular file's generated contents
    Seed(u64),
    Instruction(Instruction),
}

impl From<Instruction> for Attribute {
    fn from(instruction: Instruction) -> Self {
        Attribute::Instruction(instruction)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::PathMode(perm) => write!(f, "mode={perm:04o}"),
            Attribute::AccessedAt(time) => write!(f, "accessed={}", format_time(*time)),
            Attribute::ModifiedAt(time) => write!(f, "modified={}", format_time(*time)),
            Attribute::Owner(uid) => write!(f, "uid={uid}"),
            Attribute::Group(gid) => write!(f, "gid={gid}"),
            Attribute::Size(size) => write!(f, "size={size}"),
            Attribute::Seed(seed) => write!(f, "seed={seed}"),
            Attribute::Instruction(instruction) => write!(f, "{instruction}"),
        }
    }
}

pub fn mode_perm(mode: u32) -> Attribute {
    Attribute::PathMode(mode & PERM_MASK)
}

pub fn owner(uid: u32) -> Attribute {
    Attribute::Owner(uid)
}

pub fn group(gid: u32) -> Attribute {
    Attribute::Group(gid)
}

pub fn accessed_at(time: SystemTime) -> Attribute {
    Attribute::AccessedAt(time)
}

pub fn modified_at(time: SystemTime) -> Attribute {
    Attribute::ModifiedAt(time)
}

pub fn size(size: u64) -> Attribute {
    Attribute::Size(size)
}

pub fn seed(seed: u64) -> Attribute {
    Attribute::Seed(seed)
}
