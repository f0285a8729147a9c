//! Mapping validation.
//!
//! The oracle's mapping is untrusted input. Before anything touches the
//! filesystem, every structural property is checked here: the mapping
//! must cover exactly the scanned files, every destination must be safe,
//! no two files may land on the same destination, and no destination may
//! clobber a pre-existing file. All checks run on every call so the
//! report surfaces every problem at once instead of one at a time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::models::{Mapping, TargetSnapshot};
use crate::security::{PathValidator, UnsafePathReason};

/// One structural problem found in a proposed mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A scanned file has no entry in the mapping
    UnmappedFile { source: String },
    /// The mapping names a file that was never scanned
    ExtraMappingEntry { source: String },
    /// A destination failed the path safety check
    UnsafePath {
        source: String,
        dest: String,
        reason: UnsafePathReason,
    },
    /// Two or more source files map to the identical destination
    DestinationCollision { dest: String, sources: Vec<String> },
    /// A destination coincides with an existing file other than the source itself
    DestinationExists { source: String, dest: String },
    /// A new top-level directory differs only by case from an existing one
    AmbiguousDirectoryName { proposed: String, existing: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::UnmappedFile { source } => {
                write!(f, "no destination proposed for {}", source)
            }
            ValidationIssue::ExtraMappingEntry { source } => {
                write!(f, "mapping names unknown file {}", source)
            }
            ValidationIssue::UnsafePath {
                source,
                dest,
                reason,
            } => write!(f, "unsafe destination {} for {}: {}", dest, source, reason),
            ValidationIssue::DestinationCollision { dest, sources } => write!(
                f,
                "multiple files map to {}: {}",
                dest,
                sources.join(", ")
            ),
            ValidationIssue::DestinationExists { source, dest } => {
                write!(f, "destination {} for {} already exists", dest, source)
            }
            ValidationIssue::AmbiguousDirectoryName { proposed, existing } => write!(
                f,
                "proposed directory {} differs only by case from existing {}",
                proposed, existing
            ),
        }
    }
}

/// A mapping that passed every structural check.
///
/// Only [`validate_mapping`] constructs this, so the tree builder and the
/// move executor can require it and "validated before mutation" becomes a
/// property of the type system rather than of call-site discipline.
#[derive(Debug, Clone)]
pub struct ValidatedMapping(Mapping);

impl ValidatedMapping {
    pub fn mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of validating one mapping against one scan.
#[derive(Debug)]
pub enum ValidationOutcome {
    /// Every check passed; the wrapped mapping may be executed
    Valid(ValidatedMapping),
    /// At least one structural issue; the run must halt before mutation
    Invalid(Vec<ValidationIssue>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}

/// Validate a proposed mapping against the scanned identity set and the
/// snapshot of what already exists under the target root.
///
/// Pure function of its inputs: re-running it on the same arguments
/// yields the same outcome, and nothing is read from the filesystem.
pub fn validate_mapping(
    identities: &BTreeSet<String>,
    mapping: &Mapping,
    snapshot: &TargetSnapshot,
) -> ValidationOutcome {
    let mut issues = Vec::new();

    // Completeness: every scanned file has a destination.
    for identity in identities {
        if !mapping.contains(identity) {
            issues.push(ValidationIssue::UnmappedFile {
                source: identity.clone(),
            });
        }
    }

    // No extras: the mapping proposes nothing for files we never scanned.
    for entry in mapping.entries() {
        if !identities.contains(&entry.source) {
            issues.push(ValidationIssue::ExtraMappingEntry {
                source: entry.source.clone(),
            });
        }
    }

    // Destination safety. Entries that fail here are excluded from the
    // collision checks below, whose semantics assume a parseable path.
    let mut safe_entries = Vec::new();
    for entry in mapping.entries() {
        match PathValidator::check_destination(&entry.dest) {
            Ok(segments) => safe_entries.push((entry, segments)),
            Err(reason) => issues.push(ValidationIssue::UnsafePath {
                source: entry.source.clone(),
                dest: entry.dest.clone(),
                reason,
            }),
        }
    }

    // No two sources may share a destination.
    let mut by_dest: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (entry, _) in &safe_entries {
        by_dest
            .entry(entry.dest.as_str())
            .or_default()
            .push(entry.source.as_str());
    }
    for (dest, sources) in &by_dest {
        if sources.len() > 1 {
            issues.push(ValidationIssue::DestinationCollision {
                dest: (*dest).to_string(),
                sources: sources.iter().map(|s| (*s).to_string()).collect(),
            });
        }
    }

    // A destination may not clobber an existing file, unless that file is
    // the source itself (a no-op move is fine).
    for (entry, _) in &safe_entries {
        if snapshot.files.contains(&entry.dest) && entry.dest != entry.source {
            issues.push(ValidationIssue::DestinationExists {
                source: entry.source.clone(),
                dest: entry.dest.clone(),
            });
        }
    }

    // New top-level directory names must not silently merge with an
    // existing name on case-insensitive filesystems. Flag, never coalesce.
    let mut flagged: BTreeSet<String> = BTreeSet::new();
    for (_, segments) in &safe_entries {
        if segments.len() < 2 {
            continue;
        }
        let top = &segments[0];
        if snapshot.top_level_dirs.contains(top) || flagged.contains(top) {
            continue;
        }
        let clash = snapshot
            .top_level_dirs
            .iter()
            .find(|existing| *existing != top && existing.eq_ignore_ascii_case(top));
        if let Some(existing) = clash {
            flagged.insert(top.clone());
            issues.push(ValidationIssue::AmbiguousDirectoryName {
                proposed: top.clone(),
                existing: existing.clone(),
            });
        }
    }

    if issues.is_empty() {
        ValidationOutcome::Valid(ValidatedMapping(mapping.clone()))
    } else {
        ValidationOutcome::Invalid(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identities(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn snapshot_with(files: &[&str], top_dirs: &[&str]) -> TargetSnapshot {
        TargetSnapshot {
            files: files.iter().map(|s| s.to_string()).collect(),
            top_level_dirs: top_dirs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_well_formed_mapping_is_valid() {
        let ids = identities(&["a.jpg", "b.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.jpg", "Cats/a.jpg");
        mapping.insert("b.jpg", "Dogs/b.jpg");
        let snapshot = snapshot_with(&["a.jpg", "b.jpg"], &[]);

        let outcome = validate_mapping(&ids, &mapping, &snapshot);
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_missing_identity_reports_unmapped_file() {
        let ids = identities(&["a.jpg", "b.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.jpg", "Cats/a.jpg");
        let snapshot = snapshot_with(&["a.jpg", "b.jpg"], &[]);

        match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => {
                assert_eq!(
                    issues,
                    vec![ValidationIssue::UnmappedFile {
                        source: "b.jpg".to_string()
                    }]
                );
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        }
    }

    #[test]
    fn test_unknown_source_reports_extra_entry() {
        let ids = identities(&["a.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.jpg", "Cats/a.jpg");
        mapping.insert("ghost.jpg", "Cats/ghost.jpg");
        let snapshot = snapshot_with(&["a.jpg"], &[]);

        match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => {
                assert_eq!(
                    issues,
                    vec![ValidationIssue::ExtraMappingEntry {
                        source: "ghost.jpg".to_string()
                    }]
                );
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        }
    }

    #[test]
    fn test_parent_escape_is_never_valid() {
        let ids = identities(&["a.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.jpg", "../stolen/a.jpg");
        let snapshot = snapshot_with(&["a.jpg"], &[]);

        match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => {
                assert!(matches!(
                    issues[0],
                    ValidationIssue::UnsafePath {
                        reason: UnsafePathReason::ParentEscape,
                        ..
                    }
                ));
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        }
    }

    #[test]
    fn test_destination_collision_names_both_sources() {
        let ids = identities(&["a.jpg", "b.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.jpg", "Misc/x.jpg");
        mapping.insert("b.jpg", "Misc/x.jpg");
        let snapshot = snapshot_with(&["a.jpg", "b.jpg"], &[]);

        match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => {
                assert_eq!(
                    issues,
                    vec![ValidationIssue::DestinationCollision {
                        dest: "Misc/x.jpg".to_string(),
                        sources: vec!["a.jpg".to_string(), "b.jpg".to_string()],
                    }]
                );
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        }
    }

    #[test]
    fn test_existing_destination_is_flagged() {
        let ids = identities(&["new.txt", "docs/old.txt"]);
        let mut mapping = Mapping::new();
        mapping.insert("new.txt", "docs/old.txt");
        mapping.insert("docs/old.txt", "archive/old.txt");
        let snapshot = snapshot_with(&["new.txt", "docs/old.txt"], &["docs"]);

        match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => {
                assert_eq!(
                    issues,
                    vec![ValidationIssue::DestinationExists {
                        source: "new.txt".to_string(),
                        dest: "docs/old.txt".to_string(),
                    }]
                );
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        }
    }

    #[test]
    fn test_noop_mapping_is_valid() {
        let ids = identities(&["a.txt", "docs/b.txt"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.txt", "a.txt");
        mapping.insert("docs/b.txt", "docs/b.txt");
        let snapshot = snapshot_with(&["a.txt", "docs/b.txt"], &["docs"]);

        assert!(validate_mapping(&ids, &mapping, &snapshot).is_valid());
    }

    #[test]
    fn test_case_insensitive_top_level_clash_is_flagged() {
        let ids = identities(&["kitty.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("kitty.jpg", "cats/kitty.jpg");
        let snapshot = snapshot_with(&["kitty.jpg"], &["Cats"]);

        match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => {
                assert_eq!(
                    issues,
                    vec![ValidationIssue::AmbiguousDirectoryName {
                        proposed: "cats".to_string(),
                        existing: "Cats".to_string(),
                    }]
                );
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        }
    }

    #[test]
    fn test_exact_existing_top_level_name_is_fine() {
        let ids = identities(&["kitty.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("kitty.jpg", "Cats/kitty.jpg");
        let snapshot = snapshot_with(&["kitty.jpg"], &["Cats"]);

        assert!(validate_mapping(&ids, &mapping, &snapshot).is_valid());
    }

    #[test]
    fn test_all_issues_surface_in_one_report() {
        let ids = identities(&["a.jpg", "b.jpg", "c.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.jpg", "../a.jpg");
        mapping.insert("b.jpg", "Misc/x.jpg");
        mapping.insert("c.jpg", "Misc/x.jpg");
        mapping.insert("ghost.jpg", "Misc/ghost.jpg");
        let snapshot = snapshot_with(&["a.jpg", "b.jpg", "c.jpg"], &[]);

        match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => {
                assert!(issues
                    .iter()
                    .any(|i| matches!(i, ValidationIssue::UnsafePath { .. })));
                assert!(issues
                    .iter()
                    .any(|i| matches!(i, ValidationIssue::DestinationCollision { .. })));
                assert!(issues
                    .iter()
                    .any(|i| matches!(i, ValidationIssue::ExtraMappingEntry { .. })));
            }
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        }
    }

    #[test]
    fn test_validation_is_idempotent() {
        let ids = identities(&["a.jpg"]);
        let mut mapping = Mapping::new();
        mapping.insert("a.jpg", "../a.jpg");
        let snapshot = snapshot_with(&["a.jpg"], &[]);

        let first = match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => issues,
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        };
        let second = match validate_mapping(&ids, &mapping, &snapshot) {
            ValidationOutcome::Invalid(issues) => issues,
            ValidationOutcome::Valid(_) => panic!("expected invalid outcome"),
        };
        assert_eq!(first, second);
    }
}
