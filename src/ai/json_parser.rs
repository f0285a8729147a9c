//! Defensive JSON extraction from model responses.
//!
//! Models rarely return bare JSON: answers arrive wrapped in markdown
//! fences, prefixed with chatter, or padded with trailing commentary.
//! Extraction runs in stages (direct parse, fence stripping, then
//! string-aware brace matching) and only the parsed value is trusted.

use serde::de::DeserializeOwned;

/// Pull a typed value out of a free-form model response.
pub fn extract_json<T: DeserializeOwned>(response: &str) -> Result<T, String> {
    let trimmed = response.trim();

    if let Ok(parsed) = serde_json::from_str::<T>(trimmed) {
        return Ok(parsed);
    }

    if let Some(fenced) = strip_code_fence(trimmed) {
        if let Ok(parsed) = serde_json::from_str::<T>(fenced.trim()) {
            return Ok(parsed);
        }
    }

    if let Some(candidate) = outermost_object(trimmed) {
        if let Ok(parsed) = serde_json::from_str::<T>(candidate) {
            return Ok(parsed);
        }
    }

    Err(format!(
        "no parseable JSON in response: {}",
        preview(trimmed)
    ))
}

/// Contents of the first ``` fence, if the response contains one.
/// The language tag after the opening fence is ignored.
fn strip_code_fence(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// The first balanced `{ ... }` span, counting braces outside string
/// literals only, so payloads containing `"{"` in values still parse.
fn outermost_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(s) = start {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}
