use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single file captured by the directory scan.
///
/// The relative path doubles as the file's identity for the rest of the
/// run: the oracle keys its proposal on it, the validator checks the
/// proposal against the full set of records, and the executor resolves
/// it back to an absolute path under the target root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Path relative to the target root, forward-slash separated
    pub relative_path: String,
    /// File name without directories
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp (milliseconds since epoch)
    pub modified_at: Option<i64>,
    /// File extension (without dot), lowercased
    pub extension: Option<String>,
    /// MIME type guess based on extension
    pub mime_type: Option<String>,
    /// Content summary produced for the oracle, if one was generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_summary: Option<String>,
}

impl FileRecord {
    /// Build a record from an absolute path and its root-relative form.
    pub fn from_path(path: &Path, relative_path: String) -> std::io::Result<Self> {
        let metadata = std::fs::symlink_metadata(path)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());

        let mime_type = extension
            .as_ref()
            .and_then(|ext| mime_guess::from_ext(ext).first().map(|m| m.to_string()));

        let modified_at = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64);

        Ok(Self {
            relative_path,
            name,
            size: metadata.len(),
            modified_at,
            extension,
            mime_type,
            content_summary: None,
        })
    }

    /// Relative path of the directory the file currently sits in.
    /// Empty string for files directly under the target root.
    pub fn parent_dir(&self) -> &str {
        match self.relative_path.rfind('/') {
            Some(idx) => &self.relative_path[..idx],
            None => "",
        }
    }
}
