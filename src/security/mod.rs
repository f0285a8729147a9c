//! Path safety checks.
//!
//! Destination paths arrive from the model and are untrusted text. The
//! checks here are pure: they look only at the string, never at the
//! filesystem, so the validator stays deterministic and unit-testable.

use std::fmt;
use std::path::{Path, PathBuf};

/// Why a proposed destination path was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsafePathReason {
    /// The path is empty
    Empty,
    /// A directory segment or the file name is empty ("a//b", trailing "/")
    EmptySegment,
    /// A segment is `.` or `..`
    ParentEscape,
    /// The path is absolute or carries a drive prefix
    Absolute,
    /// A segment contains a character that is illegal on common filesystems
    IllegalCharacter(char),
}

impl fmt::Display for UnsafePathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsafePathReason::Empty => write!(f, "empty path"),
            UnsafePathReason::EmptySegment => write!(f, "empty path segment"),
            UnsafePathReason::ParentEscape => write!(f, "path escapes the target root"),
            UnsafePathReason::Absolute => write!(f, "path is not relative to the target root"),
            UnsafePathReason::IllegalCharacter(c) => {
                write!(f, "illegal character {:?} in path segment", c)
            }
        }
    }
}

/// Characters rejected inside a segment. NUL is illegal everywhere;
/// the rest are reserved on Windows and near-guaranteed to be oracle
/// noise rather than intentional file names. Backslash is rejected
/// because segments are split on forward slashes only.
const RESERVED_CHARS: &[char] = &['\0', '<', '>', ':', '"', '|', '?', '*', '\\'];

/// Validator for oracle-proposed destination paths.
pub struct PathValidator;

impl PathValidator {
    /// Parse a destination relative path into its segments.
    ///
    /// Accepts only forward-slash separated paths that stay inside the
    /// target root. Returns the segments (directories plus the final
    /// file name) so callers never re-split the string. Checks that
    /// cannot be decided generically (host-specific name limits) are
    /// left to the move executor, which fails per entry.
    pub fn check_destination(dest: &str) -> Result<Vec<String>, UnsafePathReason> {
        if dest.is_empty() {
            return Err(UnsafePathReason::Empty);
        }

        if dest.starts_with('/') || dest.starts_with('\\') || has_drive_prefix(dest) {
            return Err(UnsafePathReason::Absolute);
        }

        let mut segments = Vec::new();
        for segment in dest.split('/') {
            if segment.is_empty() {
                return Err(UnsafePathReason::EmptySegment);
            }
            if segment == "." || segment == ".." {
                return Err(UnsafePathReason::ParentEscape);
            }
            if let Some(c) = segment
                .chars()
                .find(|c| c.is_control() || RESERVED_CHARS.contains(c))
            {
                return Err(UnsafePathReason::IllegalCharacter(c));
            }
            segments.push(segment.to_string());
        }

        Ok(segments)
    }

    /// Whether a target root is too dangerous to reorganize at all.
    ///
    /// The tool refuses to run against the filesystem root, system
    /// directories, or the home directory itself. Subdirectories of home
    /// are the expected targets and are allowed.
    pub fn is_protected_root(path: &Path) -> bool {
        let protected: &[PathBuf] = &[
            PathBuf::from("/"),
            PathBuf::from("/bin"),
            PathBuf::from("/sbin"),
            PathBuf::from("/usr"),
            PathBuf::from("/etc"),
            PathBuf::from("/var"),
            PathBuf::from("/System"),
            PathBuf::from("/Library"),
            PathBuf::from("/Applications"),
            PathBuf::from("C:\\Windows"),
            PathBuf::from("C:\\Program Files"),
            PathBuf::from("C:\\Program Files (x86)"),
        ];

        let check = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if protected.iter().any(|p| check == *p) {
            return true;
        }

        if let Some(home) = dirs::home_dir() {
            if check == home {
                return true;
            }
        }

        // Direct children of a system prefix are off limits too
        // ("/usr/local", "C:\Windows\System32"); deeper paths such as
        // macOS temp dirs under /var/folders are allowed.
        if let Some(home) = dirs::home_dir() {
            if check.starts_with(&home) {
                return false;
            }
        }
        protected
            .iter()
            .any(|p| *p != Path::new("/") && check.parent() == Some(p.as_path()))
    }
}

fn has_drive_prefix(dest: &str) -> bool {
    let bytes = dest.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_relative_paths() {
        assert_eq!(
            PathValidator::check_destination("Cats/a.jpg").unwrap(),
            vec!["Cats", "a.jpg"]
        );
        assert_eq!(
            PathValidator::check_destination("report.pdf").unwrap(),
            vec!["report.pdf"]
        );
        assert_eq!(
            PathValidator::check_destination("Docs/2024/tax return.pdf").unwrap(),
            vec!["Docs", "2024", "tax return.pdf"]
        );
    }

    #[test]
    fn test_rejects_empty_paths() {
        assert_eq!(
            PathValidator::check_destination(""),
            Err(UnsafePathReason::Empty)
        );
        assert_eq!(
            PathValidator::check_destination("Docs/"),
            Err(UnsafePathReason::EmptySegment)
        );
        assert_eq!(
            PathValidator::check_destination("Docs//a.txt"),
            Err(UnsafePathReason::EmptySegment)
        );
    }

    #[test]
    fn test_rejects_parent_escape() {
        assert_eq!(
            PathValidator::check_destination("../outside.txt"),
            Err(UnsafePathReason::ParentEscape)
        );
        assert_eq!(
            PathValidator::check_destination("Docs/../../etc/passwd"),
            Err(UnsafePathReason::ParentEscape)
        );
        assert_eq!(
            PathValidator::check_destination("./a.txt"),
            Err(UnsafePathReason::ParentEscape)
        );
    }

    #[test]
    fn test_rejects_absolute_and_drive_paths() {
        assert_eq!(
            PathValidator::check_destination("/etc/passwd"),
            Err(UnsafePathReason::Absolute)
        );
        assert_eq!(
            PathValidator::check_destination("C:evil.txt"),
            Err(UnsafePathReason::Absolute)
        );
        assert_eq!(
            PathValidator::check_destination("\\share\\x"),
            Err(UnsafePathReason::Absolute)
        );
    }

    #[test]
    fn test_rejects_illegal_characters() {
        assert_eq!(
            PathValidator::check_destination("Docs/a|b.txt"),
            Err(UnsafePathReason::IllegalCharacter('|'))
        );
        assert_eq!(
            PathValidator::check_destination("Docs\\a.txt"),
            Err(UnsafePathReason::IllegalCharacter('\\'))
        );
        assert_eq!(
            PathValidator::check_destination("a\0b"),
            Err(UnsafePathReason::IllegalCharacter('\0'))
        );
    }

    #[test]
    fn test_protected_roots() {
        assert!(PathValidator::is_protected_root(Path::new("/")));
        if let Some(home) = dirs::home_dir() {
            assert!(PathValidator::is_protected_root(&home));
        }
    }

    #[test]
    fn test_tempdir_is_not_protected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!PathValidator::is_protected_root(dir.path()));
    }
}
