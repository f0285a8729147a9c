//! Run configuration.

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::cli::Cli;

/// Resolved settings for one run, combining CLI flags and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub target_dir: PathBuf,
    pub model: String,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    /// Destination directories offered to the oracle instead of the
    /// target's existing directories
    pub custom_directories: Option<Vec<String>>,
    pub custom_prompt: Option<String>,
    pub max_depth: Option<usize>,
    pub cleanup: bool,
    pub assume_yes: bool,
    pub debug: bool,
}

impl Config {
    /// Resolve settings from parsed flags.
    ///
    /// The API key flag beats the environment variable. A missing key is
    /// only a warning: local model servers accept unauthenticated calls.
    pub fn resolve(cli: Cli) -> Self {
        let api_key = cli.api_key.or_else(|| {
            let name = cli.api_key_env.as_deref()?;
            match env::var(name) {
                Ok(value) if !value.is_empty() => Some(value),
                _ => {
                    warn!(variable = name, "API key environment variable not set or empty");
                    None
                }
            }
        });

        let custom_directories = cli
            .directories
            .map(|list| {
                list.split_whitespace()
                    .map(normalize_directory)
                    .collect::<Vec<_>>()
            })
            .filter(|dirs| !dirs.is_empty());

        Self {
            target_dir: cli.directory,
            model: cli.model,
            port: cli.port,
            api_key,
            custom_directories,
            custom_prompt: cli.prompt,
            max_depth: cli.max_depth,
            cleanup: !cli.no_cleanup,
            assume_yes: cli.assume_yes,
            debug: cli.debug,
        }
    }
}

/// Candidate directories are shown to the oracle with a leading slash,
/// matching how the scanner lists existing ones.
fn normalize_directory(dir: &str) -> String {
    let trimmed = dir.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
