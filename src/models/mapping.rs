use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One proposed move: a source file and its destination relative path.
///
/// Both paths are forward-slash separated and rooted at the target
/// directory. The destination file name may differ from the source name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    /// Source file identity (root-relative path)
    pub source: String,
    /// Proposed destination (root-relative path)
    pub dest: String,
}

/// The oracle's full proposal: one destination per scanned file.
///
/// Entries are keyed by source identity, so the map is key-unique by
/// construction, and iterated in source-path order, which fixes the
/// execution order for the whole run.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: BTreeMap<String, MappingEntry>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a proposed destination for a source file.
    /// A second insert for the same source replaces the first.
    pub fn insert(&mut self, source: impl Into<String>, dest: impl Into<String>) {
        let source = source.into();
        let entry = MappingEntry {
            source: source.clone(),
            dest: dest.into(),
        };
        self.entries.insert(source, entry);
    }

    pub fn get(&self, source: &str) -> Option<&MappingEntry> {
        self.entries.get(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    /// Entries in source-path order.
    pub fn entries(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every entry maps a file onto its current path,
    /// i.e. applying the mapping would change nothing.
    pub fn is_noop(&self) -> bool {
        self.entries.values().all(|e| e.source == e.dest)
    }
}

impl FromIterator<MappingEntry> for Mapping {
    fn from_iter<I: IntoIterator<Item = MappingEntry>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for entry in iter {
            mapping.insert(entry.source, entry.dest);
        }
        mapping
    }
}

/// In-memory listing of what already exists under the target root.
///
/// The validator consumes this instead of touching the filesystem, which
/// keeps validation pure and lets tests inject arbitrary directory states.
#[derive(Debug, Clone, Default)]
pub struct TargetSnapshot {
    /// Root-relative paths of every existing file
    pub files: BTreeSet<String>,
    /// Names of directories directly under the target root
    pub top_level_dirs: BTreeSet<String>,
}

impl TargetSnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_iterate_in_source_order() {
        let mut mapping = Mapping::new();
        mapping.insert("zebra.txt", "Animals/zebra.txt");
        mapping.insert("apple.txt", "Fruit/apple.txt");
        mapping.insert("mango.txt", "Fruit/mango.txt");

        let sources: Vec<&str> = mapping.entries().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["apple.txt", "mango.txt", "zebra.txt"]);
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let mut mapping = Mapping::new();
        mapping.insert("a.txt", "One/a.txt");
        mapping.insert("a.txt", "Two/a.txt");

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("a.txt").unwrap().dest, "Two/a.txt");
    }

    #[test]
    fn test_is_noop() {
        let mut mapping = Mapping::new();
        mapping.insert("a.txt", "a.txt");
        mapping.insert("docs/b.txt", "docs/b.txt");
        assert!(mapping.is_noop());

        mapping.insert("c.txt", "Misc/c.txt");
        assert!(!mapping.is_noop());
    }
}
