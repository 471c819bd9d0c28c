//! File selection by ordered include/exclude glob patterns

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

/// Errors from source resolution and pattern compilation
#[derive(Debug, Error)]
pub enum SelectError {
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("could not resolve source directory {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Patterns used when a job specifies none: include everything,
/// drop macOS Finder metadata.
const DEFAULT_PATTERNS: &[&str] = &["**/*", "!**/.DS_Store"];

/// Resolve a job's source directory to an absolute path. Called
/// exactly once per job, before any matching.
pub fn resolve_src(src: &Path) -> Result<PathBuf, SelectError> {
    src.canonicalize().map_err(|e| SelectError::Resolve {
        path: src.to_path_buf(),
        source: e,
    })
}

/// Select paths under `src` by applying the job's match lines in
/// order.
///
/// Each non-blank line is one glob pattern (brace alternation and
/// recursive `**` supported); a `!` prefix removes its matches from
/// the accumulating set instead of adding them. Order is significant:
/// an exclusion applied before any inclusion removes nothing.
///
/// The returned set holds absolute paths of entries that existed at
/// selection time, directories included. Regular-file filtering
/// happens at upload time.
pub fn select_files(
    src: &Path,
    match_lines: Option<&str>,
) -> Result<BTreeSet<PathBuf>, SelectError> {
    let mut patterns: Vec<&str> = match_lines
        .map(|lines| {
            lines
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if patterns.is_empty() {
        patterns.extend_from_slice(DEFAULT_PATTERNS);
    }

    // One walk over the tree; every pattern matches against the same
    // relative path list.
    let entries = walk_tree(src);

    let mut selected: BTreeSet<String> = BTreeSet::new();
    for pattern in patterns {
        match pattern.strip_prefix('!') {
            Some(rest) => {
                let matcher = compile(rest)?;
                selected.retain(|relative| !matcher.is_match(relative));
            }
            None => {
                let matcher = compile(pattern)?;
                for relative in &entries {
                    if matcher.is_match(relative) {
                        selected.insert(relative.clone());
                    }
                }
            }
        }
    }

    Ok(selected
        .into_iter()
        .map(|relative| src.join(relative))
        .collect())
}

/// Collect every entry under `src` as a `/`-separated relative path.
/// Symlinks are not followed; inaccessible entries are logged and
/// skipped.
fn walk_tree(src: &Path) -> Vec<String> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to access entry during directory walk: {}", e);
                continue;
            }
        };

        let relative = entry
            .path()
            .strip_prefix(src)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        entries.push(relative);
    }

    entries
}

/// Compile one glob. `*` and `?` stop at path separators so that
/// non-`**` segments match a single component.
fn compile(pattern: &str) -> Result<GlobMatcher, SelectError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| SelectError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
