//! Verification instructions and the policy that resolves them

use std::fmt;
use std::str::FromStr;

/// A named verification dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aspect {
    /// Baseline for every aspect not mentioned explicitly
    All,
    ModePerm,
    Modified,
    Accessed,
    Uid,
    Gid,
    Size,
    SymlinkTarget,
    Contents,
}

impl Aspect {
    pub const ALL: [Aspect; 9] = [
        Aspect::All,
        Aspect::ModePerm,
        Aspect::Modified,
        Aspect::Accessed,
        Aspect::Uid,
        Aspect::Gid,
        Aspect::Size,
        Aspect::SymlinkTarget,
        Aspect::Contents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ModePerm => "mode-perm",
            Self::Modified => "modified",
            Self::Accessed => "accessed",
            Self::Uid => "uid",
            Self::Gid => "gid",
            Self::Size => "size",
            Self::SymlinkTarget => "symlink-target",
            Self::Contents => "contents",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|aspect| aspect.as_str() == s)
            .ok_or_else(|| format!("unknown verification aspect: {s}"))
    }
}

/// Whether to check one aspect of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub verify: bool,
    pub aspect: Aspect,
}

impl Instruction {
    pub fn new(verify: bool, aspect: Aspect) -> Self {
        Self { verify, aspect }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.verify { '+' } else { '-' };
        write!(f, "{sign}{}", self.aspect)
    }
}

impl FromStr for Instruction {
    type Err = String;

    /// Parses `+aspect`, `-aspect` or a bare `aspect` (meaning `+aspect`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verify, name) = match s.strip_prefix('-') {
            Some(rest) => (false, rest),
            None => (true, s.strip_prefix('+').unwrap_or(s)),
        };
        Ok(Self::new(verify, name.parse()?))
    }
}

pub fn all_by_default(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::All)
}

pub fn mode_perm(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::ModePerm)
}

pub fn modified_time(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::Modified)
}

pub fn accessed_time(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::Accessed)
}

pub fn uid(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::Uid)
}

pub fn gid(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::Gid)
}

pub fn size(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::Size)
}

pub fn symlink_target(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::SymlinkTarget)
}

pub fn contents(verify: bool) -> Instruction {
    Instruction::new(verify, Aspect::Contents)
}

/// Resolve whether `aspect` should be checked under `instructions`
///
/// Everything is verified when there are no instructions. Any `all=false`
/// switches the baseline to skip; the last instruction naming `aspect`
/// itself overrides the baseline.
pub fn should(instructions: &[Instruction], aspect: Aspect) -> bool {
    let mut verify = true;
    if instructions.contains(&all_by_default(false)) {
        verify = false;
    }
    if let Some(explicit) = instructions.iter().rev().find(|i| i.aspect == aspect) {
        verify = explicit.verify;
    }
    verify
}

/// True when the instructions say nothing but "skip everything"
pub fn skips_everything(instructions: &[Instruction]) -> bool {
    instructions == [all_by_default(false)]
}
