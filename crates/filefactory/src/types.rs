//! Core types shared by declarations and backends

use std::fmt;

/// Permission bits recognized on a [`FileMode`]
pub const PERM_MASK: u32 = 0o777;

/// Kind of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileType {
    /// Regular file
    #[default]
    Regular,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Anything else (fifo, socket, device)
    Other,
}

impl FileType {
    /// Character used in the first column of `ls -l`
    pub fn as_char(&self) -> char {
        match self {
            Self::Regular => '-',
            Self::Directory => 'd',
            Self::Symlink => 'l',
            Self::Other => '?',
        }
    }

    /// Classify a std file type
    pub fn from_std(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::Regular
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Regular => "regular file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Type bits plus permission bits of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileMode {
    file_type: FileType,
    perm: u32,
}

impl FileMode {
    pub fn new(file_type: FileType, perm: u32) -> Self {
        Self {
            file_type,
            perm: perm & PERM_MASK,
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn perm(&self) -> u32 {
        self.perm
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    pub fn with_file_type(self, file_type: FileType) -> Self {
        Self { file_type, ..self }
    }

    pub fn with_perm(self, perm: u32) -> Self {
        Self::new(self.file_type, perm)
    }
}

impl fmt::Display for FileMode {
    /// Renders like `ls -l`, e.g. `drwxr-x---`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::with_capacity(10);
        rendered.push(self.file_type.as_char());
        for shift in [6, 3, 0] {
            let bits = (self.perm >> shift) & 0o7;
            rendered.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            rendered.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            rendered.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display() {
        assert_eq!(
            FileMode::new(FileType::Directory, 0o750).to_string(),
            "drwxr-x---"
        );
        assert_eq!(
            FileMode::new(FileType::Regular, 0o644).to_string(),
            "-rw-r--r--"
        );
        assert_eq!(
            FileMode::new(FileType::Symlink, 0o777).to_string(),
            "lrwxrwxrwx"
        );
    }

    #[test]
    fn test_perm_is_masked() {
        let mode = FileMode::new(FileType::Regular, 0o104_755);
        assert_eq!(mode.perm(), 0o755);
        assert_eq!(mode.with_perm(0o7777).perm(), 0o777);
    }

    #[test]
    fn test_with_file_type_keeps_perm() {
        let mode = FileMode::new(FileType::Regular, 0o640).with_file_type(FileType::Directory);
        assert_eq!(mode.file_type(), FileType::Directory);
        assert_eq!(mode.perm(), 0o640);
    }
}
