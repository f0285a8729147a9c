use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "marshal")]
#[command(about = "AI-assisted file organization for messy directories", version)]
pub struct Cli {
    /// Directory to organize
    pub directory: PathBuf,

    /// Model identifier passed to the oracle endpoint
    #[arg(short, long, default_value = "gemma3:4b")]
    pub model: String,

    /// Port of a local OpenAI-compatible model server (e.g. Ollama)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// API key for a hosted model endpoint
    #[arg(long)]
    pub api_key: Option<String>,

    /// Environment variable to read the API key from
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Space-separated custom destination directories offered to the model
    #[arg(short = 'c', long)]
    pub directories: Option<String>,

    /// Extra instructions appended to the mapping prompt
    #[arg(long)]
    pub prompt: Option<String>,

    /// Maximum directory depth to scan
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Skip the empty-directory cleanup pass after moving
    #[arg(long)]
    pub no_cleanup: bool,

    /// Apply changes without the interactive confirmation prompt
    #[arg(short = 'y', long)]
    pub assume_yes: bool,

    /// Log oracle requests and the raw mapping
    #[arg(long)]
    pub debug: bool,
}
