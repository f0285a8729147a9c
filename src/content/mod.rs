//! Content extraction for oracle summaries.
//!
//! Classifies each file by extension (with a MIME fallback for text) and
//! pulls out whatever the oracle can digest: a bounded text preview or a
//! base64 image payload. Files that are neither stay opaque, which is
//! not an error; the oracle then sees metadata only.

use std::fs;
use std::io;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Upper bound on the text preview handed to the oracle.
pub const TEXT_PREVIEW_BYTES: usize = 1024;

/// Images larger than this are not encoded; most chat endpoints reject
/// payloads near this size anyway.
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Formats the captioning endpoint accepts as data URLs.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "rst", "csv", "tsv", "json", "xml", "html", "htm", "css", "js", "ts", "py",
    "rs", "go", "java", "c", "cpp", "h", "rb", "php", "sh", "bat", "ps1", "yml", "yaml", "toml",
    "ini", "cfg", "conf", "log", "sql", "tex",
];

/// What the summarizer managed to pull out of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Bounded text preview, lossily decoded to UTF-8
    Text(String),
    /// Base64-encoded image bytes plus the source extension
    Image { encoded: String, extension: String },
    /// Nothing extractable
    Opaque,
}

/// Read as much of a file as the oracle needs.
pub fn extract_content(path: &Path, extension: Option<&str>) -> io::Result<FileContent> {
    let ext = match extension {
        Some(ext) => ext,
        None => return Ok(FileContent::Opaque),
    };

    if IMAGE_EXTENSIONS.contains(&ext) {
        let metadata = fs::metadata(path)?;
        if metadata.len() > MAX_IMAGE_BYTES {
            return Ok(FileContent::Opaque);
        }
        let bytes = fs::read(path)?;
        return Ok(FileContent::Image {
            encoded: BASE64.encode(bytes),
            extension: ext.to_string(),
        });
    }

    if is_text_extension(ext) {
        let bytes = fs::read(path)?;
        let truncated = bytes.len() > TEXT_PREVIEW_BYTES;
        let slice = &bytes[..bytes.len().min(TEXT_PREVIEW_BYTES)];
        let mut preview = String::from_utf8_lossy(slice).into_owned();
        if truncated {
            preview.push_str("...");
        }
        return Ok(FileContent::Text(preview));
    }

    Ok(FileContent::Opaque)
}

fn is_text_extension(ext: &str) -> bool {
    if TEXT_EXTENSIONS.contains(&ext) {
        return true;
    }
    mime_guess::from_ext(ext)
        .first()
        .map(|m| m.type_() == mime_guess::mime::TEXT)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_text_file_yields_preview() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "grocery list: eggs, milk").unwrap();

        match extract_content(&path, Some("txt")).unwrap() {
            FileContent::Text(preview) => assert_eq!(preview, "grocery list: eggs, milk"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_long_text_is_truncated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.log");
        fs::write(&path, "x".repeat(TEXT_PREVIEW_BYTES * 3)).unwrap();

        match extract_content(&path, Some("log")).unwrap() {
            FileContent::Text(preview) => {
                assert_eq!(preview.len(), TEXT_PREVIEW_BYTES + 3);
                assert!(preview.ends_with("..."));
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_image_is_base64_encoded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        match extract_content(&path, Some("png")).unwrap() {
            FileContent::Image { encoded, extension } => {
                assert_eq!(extension, "png");
                assert_eq!(encoded, BASE64.encode([0x89, b'P', b'N', b'G']));
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_binary_is_opaque() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0u8, 1, 2, 3]).unwrap();

        assert_eq!(extract_content(&path, Some("bin")).unwrap(), FileContent::Opaque);
        assert_eq!(extract_content(&path, None).unwrap(), FileContent::Opaque);
    }
}
