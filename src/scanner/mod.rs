//! Batch input discovery.
//!
//! Directory arguments are expanded into the JSON records they contain;
//! anything else is passed through so the batch can report on it.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Expand directory arguments into their `*.json` files.
///
/// Files inside a directory are sorted by path. Non-directory arguments,
/// including paths that do not exist, are kept in place. Entries the walk
/// cannot read are kept too, so they show up as failed batch items.
pub fn collect_inputs(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_dir() {
            let found = scan_dir(path, recursive);
            debug!("Found {} JSON files in {}", found.len(), path.display());
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }

    inputs
}

fn scan_dir(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_json(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                warn!("Error scanning {}: {}", dir.display(), e);
                files.push(e.path().unwrap_or(dir).to_path_buf());
            }
        }
    }

    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
