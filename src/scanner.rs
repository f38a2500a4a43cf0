use globset::{Glob, GlobSet};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// A `class="…"` region as it appeared in the pristine document text.
/// `start` is the byte offset of `text` in that original document; offsets
/// are never recomputed against a partially rewritten buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub text: String,
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScanError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    pub base_path: PathBuf,
    pub respect_gitignore: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            respect_gitignore: true,
        }
    }
}

pub fn collect_documents(
    patterns: &[String],
    ignore_patterns: &[String],
    options: &WalkOptions,
) -> Result<Vec<PathBuf>, ScanError> {
    if patterns.is_empty() {
        return Err(ScanError {
            message: "collect_documents requires at least one pattern".to_string(),
        });
    }

    let globset = build_globset(patterns)?;
    let ignore_set = build_globset(ignore_patterns)?;
    let mut paths = Vec::new();
    let mut seen = HashSet::new();

    let mut builder = WalkBuilder::new(&options.base_path);
    builder
        .hidden(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore);

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let relative_path = path.strip_prefix(&options.base_path).unwrap_or(path);
        if !globset.is_match(relative_path) && !globset.is_match(path) {
            continue;
        }
        if ignore_set.is_match(relative_path) || ignore_set.is_match(path) {
            continue;
        }
        if seen.insert(path.to_path_buf()) {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    Ok(paths)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| ScanError {
            message: format!("invalid glob pattern '{}': {}", pattern, err),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|err| ScanError {
        message: format!("failed to build glob set: {}", err),
    })
}

const CLASS_ATTR_MARKER: &str = "class=\"";

/// Lexical scan, not a markup parse: any `class="` occurrence opens a region
/// that runs to the next `"`. Attribute-like text inside expressions or
/// comments can misfire; callers accept that.
pub fn find_class_attributes(text: &str) -> Vec<AttributeMatch> {
    let mut matches = Vec::new();

    for (idx, _) in text.match_indices(CLASS_ATTR_MARKER) {
        let start = idx + CLASS_ATTR_MARKER.len();
        let Some(length) = text[start..].find('"') else {
            continue;
        };
        if length == 0 {
            continue;
        }
        matches.push(AttributeMatch {
            text: text[start..start + length].to_string(),
            start,
        });
    }

    matches
}
