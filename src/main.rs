use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use futures::{stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use marshal::ai::OracleClient;
use marshal::cli::Cli;
use marshal::config::Config;
use marshal::content::{extract_content, FileContent};
use marshal::error::{OracleError, OrganizeError};
use marshal::execution::{sweep_empty_dirs, Confirmation, MoveExecutor};
use marshal::models::{FileRecord, Mapping};
use marshal::render;
use marshal::scanner::scan_target;
use marshal::security::PathValidator;
use marshal::tree::{current_tree, proposed_tree};
use marshal::validate::{validate_mapping, ValidationOutcome};

/// How many oracle calls may be in flight at once. The core pipeline
/// downstream of these phases is strictly sequential.
const ORACLE_CONCURRENCY: usize = 4;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    marshal::logging::init(cli.debug);
    let config = Config::resolve(cli);

    if let Err(e) = run(&config).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(config: &Config) -> Result<(), OrganizeError> {
    let root = config
        .target_dir
        .canonicalize()
        .map_err(|e| OrganizeError::Scan {
            path: config.target_dir.clone(),
            source: e,
        })?;

    if PathValidator::is_protected_root(&root) {
        return Err(OrganizeError::ProtectedRoot(root));
    }

    info!(root = %root.display(), "scanning target directory");
    let scan = scan_target(&root, config.max_depth).map_err(|e| OrganizeError::Scan {
        path: root.clone(),
        source: e,
    })?;

    if scan.records.is_empty() {
        println!("Nothing to organize in {}.", root.display());
        return Ok(());
    }
    println!("{} {} files found", "✓".green(), scan.records.len());

    let oracle = OracleClient::new(config.model.as_str(), config.api_key.clone(), config.port);

    let records = summarize_files(&oracle, &root, scan.records).await;

    let directories = config
        .custom_directories
        .clone()
        .unwrap_or_else(|| scan.directories.clone());
    let mapping = map_files(
        &oracle,
        &records,
        &directories,
        config.custom_prompt.as_deref(),
    )
    .await?;

    if config.debug {
        println!("\nProposed mapping:");
        for entry in mapping.entries() {
            println!("  {} -> {}", entry.source, entry.dest);
        }
    }

    let identities: BTreeSet<String> = records.iter().map(|r| r.relative_path.clone()).collect();
    let validated = match validate_mapping(&identities, &mapping, &scan.snapshot) {
        ValidationOutcome::Valid(validated) => validated,
        ValidationOutcome::Invalid(issues) => {
            render::print_issues(&issues);
            return Err(OrganizeError::MappingRejected(issues.len()));
        }
    };
    println!("{} mapping validated", "✓".green());

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string());
    println!("\n{}", "Current organization".yellow().bold());
    render::print_tree(&current_tree(&root_name, &records));
    println!("\n{}", "Proposed organization".green().bold());
    render::print_tree(&proposed_tree(&root_name, &validated));

    if validated.mapping().is_noop() {
        println!("\n{}", "No file organization changes needed.".green());
        return Ok(());
    }

    let confirmation = if config.assume_yes {
        Confirmation::Approved
    } else {
        prompt_confirmation()
    };
    if confirmation == Confirmation::Declined {
        println!("Operation canceled.");
        return Ok(());
    }

    let bar = phase_bar(validated.len() as u64, "moving files");
    let executor = MoveExecutor::new(&root);
    let mut summary = executor.apply_with(&validated, confirmation, |entry, _| {
        bar.set_message(entry.source.clone());
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    if config.cleanup {
        summary.cleanup = Some(sweep_empty_dirs(&root));
    }

    render::print_summary(&summary);
    Ok(())
}

/// Fill in content summaries, a bounded number of oracle calls at a time.
/// Summary failures degrade to metadata-only records; the run continues.
async fn summarize_files(
    oracle: &OracleClient,
    root: &Path,
    records: Vec<FileRecord>,
) -> Vec<FileRecord> {
    let bar = phase_bar(records.len() as u64, "summarizing content");

    let futures = records
        .into_iter()
        .map(|record| summarize_one(oracle, root, &bar, record));
    let mut records: Vec<FileRecord> = stream::iter(futures)
        .buffer_unordered(ORACLE_CONCURRENCY)
        .collect()
        .await;
    bar.finish_and_clear();

    records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    println!("{} content summaries generated", "✓".green());
    records
}

async fn summarize_one(
    oracle: &OracleClient,
    root: &Path,
    bar: &ProgressBar,
    mut record: FileRecord,
) -> FileRecord {
    bar.set_message(record.relative_path.clone());

    let path = root.join(&record.relative_path);
    match extract_content(&path, record.extension.as_deref()) {
        Ok(FileContent::Text(preview)) => match oracle.summarize_text(&preview).await {
            Ok(summary) => record.content_summary = Some(summary),
            Err(e) => warn!(file = %record.relative_path, error = %e, "text summary failed"),
        },
        Ok(FileContent::Image { encoded, extension }) => {
            match oracle.caption_image(&encoded, &extension).await {
                Ok(caption) => record.content_summary = Some(caption),
                Err(e) => warn!(file = %record.relative_path, error = %e, "image caption failed"),
            }
        }
        Ok(FileContent::Opaque) => {}
        Err(e) => warn!(file = %record.relative_path, error = %e, "could not read content"),
    }

    bar.inc(1);
    record
}

/// Ask the oracle for a destination per file and assemble the full
/// mapping. Per-file failures keep the file where it is; authentication
/// failures abort the run before anything is mutated.
async fn map_files(
    oracle: &OracleClient,
    records: &[FileRecord],
    directories: &[String],
    custom_prompt: Option<&str>,
) -> Result<Mapping, OrganizeError> {
    let bar = phase_bar(records.len() as u64, "mapping files");

    let futures = records
        .iter()
        .map(|record| map_one(oracle, record, directories, custom_prompt, &bar));
    let results: Vec<Result<(String, String), OracleError>> = stream::iter(futures)
        .buffer_unordered(ORACLE_CONCURRENCY)
        .collect()
        .await;
    bar.finish_and_clear();

    let mut mapping = Mapping::new();
    for result in results {
        let (source, dest) = result?;
        mapping.insert(source, dest);
    }
    println!("{} destinations proposed", "✓".green());
    Ok(mapping)
}

async fn map_one(
    oracle: &OracleClient,
    record: &FileRecord,
    directories: &[String],
    custom_prompt: Option<&str>,
    bar: &ProgressBar,
) -> Result<(String, String), OracleError> {
    bar.set_message(record.relative_path.clone());
    let result = oracle.map_file(record, directories, custom_prompt).await;
    bar.inc(1);

    match result {
        Ok(dir) => Ok((record.relative_path.clone(), compose_destination(record, &dir))),
        Err(e) if e.is_terminal() => Err(e),
        Err(e) => {
            warn!(file = %record.relative_path, error = %e, "mapping failed, keeping file in place");
            Ok((record.relative_path.clone(), record.relative_path.clone()))
        }
    }
}

/// The oracle proposes a directory; the destination path keeps the
/// source file name underneath it. "/" keeps the file at the top level.
fn compose_destination(record: &FileRecord, dir: &str) -> String {
    let trimmed = dir.trim().trim_matches('/');
    if trimmed.is_empty() {
        record.name.clone()
    } else {
        format!("{}/{}", trimmed, record.name)
    }
}

fn prompt_confirmation() -> Confirmation {
    print!("\nApply these changes? [y/N] ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return Confirmation::Declined;
    }
    if line.trim().eq_ignore_ascii_case("y") {
        Confirmation::Approved
    } else {
        Confirmation::Declined
    }
}

fn phase_bar(len: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} {{msg}}",
            message
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
