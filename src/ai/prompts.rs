//! Prompt construction for the oracle.

use crate::models::FileRecord;
use crate::utils::{format_size, iso_date};

/// System prompt for image captioning.
pub const CAPTION_SYSTEM_PROMPT: &str = r#"You describe images factually and briefly.

RULES:
1. One or two short sentences only
2. Describe what is visible with certainty; no speculation about context or purpose
3. Be specific and objective

EXAMPLES:
- A red sports car parked on a suburban street with trees in the background.
- A bowl of fresh fruit including apples, bananas and grapes on a wooden table."#;

/// User text sent alongside the encoded image.
pub const CAPTION_USER_PROMPT: &str = "Describe this image in 1-2 short sentences.";

/// System prompt for text summarization.
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You summarize document excerpts for a filing assistant.

RULES:
1. One or two short sentences only
2. State what kind of document it is and what it concerns
3. Keep names, dates and amounts if present; never invent them"#;

/// Build the user prompt for summarizing a text preview.
pub fn build_summary_prompt(preview: &str) -> String {
    format!(
        "Summarize this file excerpt in 1-2 short sentences:\n\n---\n{}\n---",
        preview
    )
}

/// System prompt for the per-file destination decision.
pub const MAPPING_SYSTEM_PROMPT: &str = r#"You are a file organization assistant. Given one file and a set of candidate directories, choose the directory the file belongs in.

RULES:
1. Respond with ONLY valid JSON: {"destination": "/path"}
2. The destination must be one of the candidate directories, or a new directory path that fits their naming style
3. Paths start with "/" and are relative to the folder being organized; "/" keeps the file at the top level
4. Never invent a file name; you are choosing a directory only"#;

/// Build the user prompt for mapping one file to a directory.
pub fn build_mapping_prompt(
    record: &FileRecord,
    directories: &[String],
    custom_instructions: Option<&str>,
) -> String {
    let mut prompt = format!(
        "FILE: {}\nNAME: {}\nTYPE: {}\nSIZE: {}",
        record.relative_path,
        record.name,
        record
            .mime_type
            .as_deref()
            .or(record.extension.as_deref())
            .unwrap_or("unknown"),
        format_size(record.size),
    );

    if let Some(date) = record.modified_at.and_then(iso_date) {
        prompt.push_str(&format!("\nMODIFIED: {}", date));
    }
    if let Some(summary) = &record.content_summary {
        prompt.push_str(&format!("\nCONTENT: {}", summary));
    }

    prompt.push_str("\n\nCANDIDATE DIRECTORIES:\n");
    for dir in directories {
        prompt.push_str(&format!("- {}\n", dir));
    }

    if let Some(instructions) = custom_instructions {
        prompt.push_str(&format!("\nADDITIONAL INSTRUCTIONS:\n{}\n", instructions));
    }

    prompt.push_str("\nRespond with ONLY the JSON object. No explanation.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FileRecord {
        FileRecord {
            relative_path: "scans/receipt.pdf".to_string(),
            name: "receipt.pdf".to_string(),
            size: 2048,
            modified_at: Some(1_700_000_000_000),
            extension: Some("pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
            content_summary: Some("A hardware store receipt from November.".to_string()),
        }
    }

    #[test]
    fn test_mapping_prompt_includes_metadata_and_candidates() {
        let dirs = vec!["/".to_string(), "/Receipts".to_string()];
        let prompt = build_mapping_prompt(&record(), &dirs, None);

        assert!(prompt.contains("FILE: scans/receipt.pdf"));
        assert!(prompt.contains("TYPE: application/pdf"));
        assert!(prompt.contains("SIZE: 2KB"));
        assert!(prompt.contains("- /Receipts"));
        assert!(prompt.contains("A hardware store receipt"));
    }

    #[test]
    fn test_custom_instructions_are_appended() {
        let dirs = vec!["/".to_string()];
        let prompt = build_mapping_prompt(&record(), &dirs, Some("Group by year."));
        assert!(prompt.contains("ADDITIONAL INSTRUCTIONS:\nGroup by year."));
    }
}
