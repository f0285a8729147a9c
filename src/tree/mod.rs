//! Current/proposed tree construction.
//!
//! Builds the two directory trees shown to the operator before anything
//! moves: "current" from the scanned listing, "proposed" from a validated
//! mapping. Pure transforms over in-memory paths; nothing here reads or
//! mutates the filesystem.

use std::collections::BTreeMap;

use crate::models::FileRecord;
use crate::validate::ValidatedMapping;

/// A node in a display tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A directory with its ordered children
    Directory { name: String, children: Vec<TreeNode> },
    /// A file, carrying the identity of the source it came from
    Leaf { name: String, source: String },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } => name,
            TreeNode::Leaf { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Directory { children, .. } => children,
            TreeNode::Leaf { .. } => &[],
        }
    }

    /// Total leaf count (recursive).
    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Directory { children, .. } => {
                children.iter().map(|c| c.file_count()).sum()
            }
        }
    }
}

/// Intermediate shape while inserting paths; converted to ordered
/// `TreeNode`s once everything is in place.
#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: Vec<(String, String)>,
}

impl DirBuilder {
    fn insert(&mut self, segments: &[&str], source: &str) {
        match segments {
            [] => {}
            [file_name] => self
                .files
                .push(((*file_name).to_string(), source.to_string())),
            [dir, rest @ ..] => self
                .dirs
                .entry((*dir).to_string())
                .or_default()
                .insert(rest, source),
        }
    }

    fn into_node(self, name: String) -> TreeNode {
        // Directories first (BTreeMap iteration is already sorted),
        // then files alphabetically.
        let mut children: Vec<TreeNode> = self
            .dirs
            .into_iter()
            .map(|(dir_name, builder)| builder.into_node(dir_name))
            .collect();

        let mut files = self.files;
        files.sort();
        children.extend(
            files
                .into_iter()
                .map(|(file_name, source)| TreeNode::Leaf {
                    name: file_name,
                    source,
                }),
        );

        TreeNode::Directory { name, children }
    }
}

/// Build a tree from (relative path, source identity) pairs.
///
/// Each path is split on `/`; intermediate directories are created once
/// per unique prefix and shared by every path beneath them.
pub fn build_tree<'a, I>(root_name: &str, paths: I) -> TreeNode
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut root = DirBuilder::default();
    for (path, source) in paths {
        let segments: Vec<&str> = path.split('/').collect();
        root.insert(&segments, source);
    }
    root.into_node(root_name.to_string())
}

/// The tree of files as they sit on disk right now.
pub fn current_tree(root_name: &str, records: &[FileRecord]) -> TreeNode {
    build_tree(
        root_name,
        records
            .iter()
            .map(|r| (r.relative_path.as_str(), r.relative_path.as_str())),
    )
}

/// The tree the target root would have after applying the mapping.
pub fn proposed_tree(root_name: &str, mapping: &ValidatedMapping) -> TreeNode {
    build_tree(
        root_name,
        mapping
            .mapping()
            .entries()
            .map(|e| (e.dest.as_str(), e.source.as_str())),
    )
}
