//! Crate error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the model endpoint.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("request failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("model endpoint error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("still failing after {retries} retries: {message}")]
    RetriesExhausted { retries: u32, message: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

impl OracleError {
    /// Errors that abort the whole run rather than one file.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OracleError::Authentication(_))
    }
}

/// Failures that end a run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("refusing to organize protected directory {}", .0.display())]
    ProtectedRoot(PathBuf),

    #[error("failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("mapping rejected: {0} issue(s) found")]
    MappingRejected(usize),

    #[error("moves were not confirmed")]
    Unconfirmed,
}
