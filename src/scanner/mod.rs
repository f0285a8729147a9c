//! Target directory snapshot.
//!
//! One walk at the start of a run captures everything the rest of the
//! pipeline is allowed to know about the target root. Later changes by
//! other processes are deliberately not tracked; the executor and the
//! cleanup sweep tolerate them instead.

use std::collections::BTreeSet;
use std::io;
use std::path::{Component, Path};

use tracing::warn;
use walkdir::WalkDir;

use crate::models::{FileRecord, TargetSnapshot};

/// Everything a run knows about the target root, captured once.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// All files, sorted by relative path
    pub records: Vec<FileRecord>,
    /// Listing injected into the validator
    pub snapshot: TargetSnapshot,
    /// Existing directories as root-relative paths with a leading `/`
    /// (`"/"` is the root itself); offered to the oracle as candidates
    pub directories: Vec<String>,
}

/// Walk the target root and capture the run's snapshot.
///
/// Symlinks are not followed. Unreadable entries are logged and skipped;
/// an unreadable root is an error. `max_depth` bounds recursion when set.
pub fn scan_target(root: &Path, max_depth: Option<usize>) -> io::Result<ScanResult> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", root.display()),
        ));
    }

    let mut walker = WalkDir::new(root);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut records = Vec::new();
    let mut files = BTreeSet::new();
    let mut top_level_dirs = BTreeSet::new();
    let mut directories = vec!["/".to_string()];

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if entry.path() == root {
            continue;
        }
        let relative = match relative_path(root, entry.path()) {
            Some(rel) => rel,
            None => continue,
        };

        if entry.file_type().is_dir() {
            if entry.depth() == 1 {
                top_level_dirs.insert(entry.file_name().to_string_lossy().to_string());
            }
            directories.push(format!("/{}", relative));
            continue;
        }
        if !entry.file_type().is_file() {
            // Symlinks and special files are left where they are.
            continue;
        }

        match FileRecord::from_path(entry.path(), relative.clone()) {
            Ok(record) => {
                files.insert(relative);
                records.push(record);
            }
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping unreadable file");
            }
        }
    }

    records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    directories.sort();

    Ok(ScanResult {
        records,
        snapshot: TargetSnapshot {
            files,
            top_level_dirs,
        },
        directories,
    })
}

/// Root-relative path with forward slashes, regardless of host separator.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(seg) => Some(seg.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_collects_sorted_records_and_snapshot() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("zeta.txt"), "z").unwrap();
        fs::create_dir_all(dir.path().join("Docs/2024")).unwrap();
        fs::write(dir.path().join("Docs/alpha.txt"), "a").unwrap();
        fs::write(dir.path().join("Docs/2024/tax.pdf"), "t").unwrap();

        let result = scan_target(dir.path(), None).unwrap();

        let paths: Vec<&str> = result
            .records
            .iter()
            .map(|r| r.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["Docs/2024/tax.pdf", "Docs/alpha.txt", "zeta.txt"]);

        assert!(result.snapshot.files.contains("Docs/alpha.txt"));
        assert_eq!(
            result.snapshot.top_level_dirs,
            ["Docs".to_string()].into_iter().collect()
        );
        assert_eq!(
            result.directories,
            vec!["/".to_string(), "/Docs".to_string(), "/Docs/2024".to_string()]
        );
    }

    #[test]
    fn test_max_depth_bounds_the_walk() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.txt"), "1").unwrap();
        fs::write(dir.path().join("a/mid.txt"), "2").unwrap();
        fs::write(dir.path().join("a/b/deep.txt"), "3").unwrap();

        let result = scan_target(dir.path(), Some(2)).unwrap();

        let paths: Vec<&str> = result
            .records
            .iter()
            .map(|r| r.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["a/mid.txt", "top.txt"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(scan_target(&missing, None).is_err());
    }
}
