//! Empty-directory cleanup.
//!
//! After a move pass the old directory skeleton is often left hollow.
//! The sweep removes every directory under the target root that ended up
//! empty, repeating until a full pass removes nothing, since deleting a
//! child can make its parent eligible. The root itself is never removed.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Count of directories removed by a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupResult {
    pub removed: usize,
}

/// Remove directories left empty under `root`, to a fixpoint.
///
/// Failures to remove (permission, a directory that gained an entry
/// concurrently) are logged and skipped; they only lower the count.
pub fn sweep_empty_dirs(root: &Path) -> CleanupResult {
    let mut removed = 0;
    loop {
        let pass = sweep_once(root);
        removed += pass;
        if pass == 0 {
            break;
        }
    }
    CleanupResult { removed }
}

/// One contents-first pass. Visiting children before parents means a
/// single pass usually reaches the fixpoint on its own; the outer loop
/// guards against entries appearing mid-walk.
fn sweep_once(root: &Path) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_dir() || entry.path() == root {
            continue;
        }

        let is_empty = match fs::read_dir(entry.path()) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => continue,
        };
        if !is_empty {
            continue;
        }

        // remove_dir refuses non-empty directories, so a file appearing
        // between the check and here is a skip, not data loss.
        match fs::remove_dir(entry.path()) {
            Ok(()) => {
                debug!(path = %entry.path().display(), "removed empty directory");
                removed += 1;
            }
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "could not remove directory");
            }
        }
    }

    removed
}
