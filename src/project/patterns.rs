// src/project/patterns.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::fs::FileSystem;

/// Compiled `include` / `exclude` globs for a single group.
///
/// Patterns are relative to the project root; `matches` expects relative
/// paths with forward slashes (e.g. `"src/app.js"`).
#[derive(Clone)]
pub struct GroupPatterns {
    group: String,
    include_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for GroupPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupPatterns")
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

impl GroupPatterns {
    /// Returns `None` when the group has no `include` patterns.
    pub fn compile(group: &str, include: &[String], exclude: &[String]) -> Result<Option<Self>> {
        if include.is_empty() {
            return Ok(None);
        }

        let include_set = build_globset(include)
            .with_context(|| format!("building include globset for group {group}"))?;

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(exclude)
                    .with_context(|| format!("building exclude globset for group {group}"))?,
            )
        };

        Ok(Some(Self {
            group: group.to_string(),
            include_set,
            exclude_set,
        }))
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files under `root` matching the group's patterns, sorted.
///
/// Each directory is walked once, keyed by its canonical path, so symlinks
/// back into the tree are not followed again.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &GroupPatterns,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let key = fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if !visited.insert(key) {
            debug!(dir = ?dir, "directory already walked; skipping");
            continue;
        }
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if patterns.matches(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
