//! Oracle client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint, either a
//! hosted service or a local model server on a configurable port. All
//! three operations (caption, summary, destination mapping) go through
//! one retrying `complete` call; responses are treated as untrusted text
//! and run through the staged JSON extractor where structure is needed.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::OracleError;
use crate::models::FileRecord;

use super::json_parser::extract_json;
use super::prompts;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_RETRIES: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Message role plus content; content is either plain text or a
/// text-and-image part list for captioning.
#[derive(Serialize, Clone)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Serialize, Clone)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize, Clone)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// The destination object the mapping prompt asks for.
#[derive(Debug, Deserialize)]
struct Placement {
    destination: String,
}

/// Client for the content-classification oracle.
pub struct OracleClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OracleClient {
    /// A `port` switches the endpoint to a local server; otherwise the
    /// hosted default is used. A missing API key is allowed (local
    /// servers usually need none).
    pub fn new(model: impl Into<String>, api_key: Option<String>, port: Option<u16>) -> Self {
        let endpoint = match port {
            Some(port) => format!("http://localhost:{}/v1/chat/completions", port),
            None => DEFAULT_API_URL.to_string(),
        };
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint,
            model: model.into(),
            api_key,
        }
    }

    /// Caption an image from its base64 payload.
    pub async fn caption_image(
        &self,
        encoded: &str,
        extension: &str,
    ) -> Result<String, OracleError> {
        let messages = vec![
            system(prompts::CAPTION_SYSTEM_PROMPT),
            ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/{};base64,{}", extension, encoded),
                        },
                    },
                    ContentPart::Text {
                        text: prompts::CAPTION_USER_PROMPT.to_string(),
                    },
                ]),
            },
        ];
        self.complete(messages).await
    }

    /// Summarize a bounded text preview.
    pub async fn summarize_text(&self, preview: &str) -> Result<String, OracleError> {
        let messages = vec![
            system(prompts::SUMMARY_SYSTEM_PROMPT),
            user(prompts::build_summary_prompt(preview)),
        ];
        self.complete(messages).await
    }

    /// Ask the oracle which directory one file belongs in.
    ///
    /// Returns the proposed directory as a root-relative path with a
    /// leading `/` ("/" keeps the file at the top level). The caller
    /// composes the full destination path from it.
    pub async fn map_file(
        &self,
        record: &FileRecord,
        directories: &[String],
        custom_instructions: Option<&str>,
    ) -> Result<String, OracleError> {
        let messages = vec![
            system(prompts::MAPPING_SYSTEM_PROMPT),
            user(prompts::build_mapping_prompt(
                record,
                directories,
                custom_instructions,
            )),
        ];
        let response = self.complete(messages).await?;
        let placement: Placement =
            extract_json(&response).map_err(OracleError::MalformedResponse)?;
        Ok(placement.destination)
    }

    /// One chat completion with bounded retries on transient failures.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.2,
        };

        let mut attempt = 0;
        loop {
            match self.send(&request).await {
                Ok(text) => return Ok(text),
                Err(e) if is_transient(&e) && attempt < MAX_RETRIES => {
                    attempt += 1;
                    warn!(attempt, error = %e, "transient oracle failure, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) if is_transient(&e) => {
                    return Err(OracleError::RetriesExhausted {
                        retries: MAX_RETRIES,
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, OracleError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(OracleError::Authentication(message));
            }
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("response carries no text".into()))?;

        debug!(chars = text.len(), "oracle response received");
        Ok(text.trim().to_string())
    }
}

fn system(text: &str) -> ChatMessage {
    ChatMessage {
        role: "system".to_string(),
        content: MessageContent::Text(text.to_string()),
    }
}

fn user(text: String) -> ChatMessage {
    ChatMessage {
        role: "user".to_string(),
        content: MessageContent::Text(text),
    }
}

/// Rate limits, timeouts and server-side hiccups are worth retrying;
/// everything else is either terminal or a per-file failure.
fn is_transient(error: &OracleError) -> bool {
    match error {
        OracleError::Api { status, .. } => *status == 429 || *status >= 500,
        OracleError::Connection(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}
