//! Move executor.
//!
//! Applies a validated mapping to the target root. This is a best-effort
//! batch, not a transaction: every entry either moves or is recorded as
//! skipped with a reason, and a single failure never aborts the rest.
//! Entries run in source-path order so repeated runs are reproducible
//! and logs stay diffable.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::OrganizeError;
use crate::models::MappingEntry;
use crate::validate::ValidatedMapping;

use super::cleanup::CleanupResult;

/// Why a single entry was not moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The source vanished between validation and execution
    SourceMissing,
    /// Something appeared at the destination after validation
    DestinationOccupied,
    /// The destination parent chain could not be created
    CreateDirFailed(String),
    /// The rename (and the copy fallback) failed
    MoveFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::SourceMissing => write!(f, "source file no longer exists"),
            SkipReason::DestinationOccupied => write!(f, "destination already occupied"),
            SkipReason::CreateDirFailed(e) => write!(f, "could not create destination directory: {}", e),
            SkipReason::MoveFailed(e) => write!(f, "move failed: {}", e),
        }
    }
}

/// Outcome for one mapping entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Skipped(SkipReason),
}

/// A skipped entry with its reason, kept for the run summary.
#[derive(Debug, Clone)]
pub struct SkippedMove {
    pub source: String,
    pub dest: String,
    pub reason: SkipReason,
}

/// Aggregate result of one apply pass, plus the optional cleanup count.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub moved: usize,
    pub skipped: usize,
    pub skips: Vec<SkippedMove>,
    pub cleanup: Option<CleanupResult>,
}

/// The explicit go/no-go signal gathered from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Approved,
    Declined,
}

/// Applies validated mappings under a fixed target root.
pub struct MoveExecutor {
    root: PathBuf,
}

impl MoveExecutor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Apply every entry of the mapping.
    ///
    /// Refuses to run without approval; a declined confirmation returns
    /// an error before anything is touched. After a confirmed run,
    /// `moved + skipped` always equals the mapping size.
    pub fn apply(
        &self,
        mapping: &ValidatedMapping,
        confirmation: Confirmation,
    ) -> Result<RunSummary, OrganizeError> {
        self.apply_with(mapping, confirmation, |_, _| {})
    }

    /// Like [`apply`](Self::apply), invoking `observe` after each entry
    /// so the caller can drive progress reporting.
    pub fn apply_with(
        &self,
        mapping: &ValidatedMapping,
        confirmation: Confirmation,
        mut observe: impl FnMut(&MappingEntry, &MoveOutcome),
    ) -> Result<RunSummary, OrganizeError> {
        if confirmation != Confirmation::Approved {
            return Err(OrganizeError::Unconfirmed);
        }

        let mut summary = RunSummary::default();
        for entry in mapping.mapping().entries() {
            let outcome = self.apply_entry(entry);
            match &outcome {
                MoveOutcome::Moved => {
                    debug!(source = %entry.source, dest = %entry.dest, "moved");
                    summary.moved += 1;
                }
                MoveOutcome::Skipped(reason) => {
                    warn!(source = %entry.source, %reason, "skipped");
                    summary.skipped += 1;
                    summary.skips.push(SkippedMove {
                        source: entry.source.clone(),
                        dest: entry.dest.clone(),
                        reason: reason.clone(),
                    });
                }
            }
            observe(entry, &outcome);
        }
        Ok(summary)
    }

    /// Move one entry, tolerating the world having changed since
    /// validation: a vanished source or an occupied destination is a
    /// skip, never a crash.
    fn apply_entry(&self, entry: &MappingEntry) -> MoveOutcome {
        // Mapping a file onto itself is a valid no-op; report it moved
        // without touching the filesystem.
        if entry.source == entry.dest {
            return MoveOutcome::Moved;
        }

        let source = resolve(&self.root, &entry.source);
        let dest = resolve(&self.root, &entry.dest);

        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                return MoveOutcome::Skipped(SkipReason::CreateDirFailed(e.to_string()));
            }
        }

        if fs::symlink_metadata(&source).is_err() {
            return MoveOutcome::Skipped(SkipReason::SourceMissing);
        }
        if fs::symlink_metadata(&dest).is_ok() {
            return MoveOutcome::Skipped(SkipReason::DestinationOccupied);
        }

        match fs::rename(&source, &dest) {
            Ok(()) => MoveOutcome::Moved,
            // Rename fails across filesystems; fall back to copy + remove.
            Err(rename_err) => match copy_then_remove(&source, &dest) {
                Ok(()) => MoveOutcome::Moved,
                Err(copy_err) => MoveOutcome::Skipped(SkipReason::MoveFailed(format!(
                    "{} (rename: {})",
                    copy_err, rename_err
                ))),
            },
        }
    }
}

fn copy_then_remove(source: &Path, dest: &Path) -> std::io::Result<()> {
    fs::copy(source, dest)?;
    if let Err(e) = fs::remove_file(source) {
        // Leave no half-state behind: the copy exists but the source
        // could not be removed, so undo the copy and report the failure.
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(())
}

/// Join a forward-slash relative path onto the root segment by segment.
fn resolve(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in relative.split('/') {
        path.push(segment);
    }
    path
}
