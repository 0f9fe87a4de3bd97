// src/project/configured.rs

//! Project model backed by a validated `Buildgate.toml`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::catalog::{GroupDescriptor, Output};
use crate::config::{CommandsSection, GroupConfig, ProjectFile};
use crate::fs::{FileSystem, normalize_path};
use crate::project::patterns::{GroupPatterns, collect_matching_files};
use crate::project::{FileReference, ProjectModel, ReferenceNode};
use crate::types::{BuildInProgress, SOURCE_FILE_METADATA};

#[derive(Debug)]
pub struct ConfiguredProject {
    file: ProjectFile,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    /// Compiled globs, parallel to `file.groups()`.
    patterns: Vec<Option<GroupPatterns>>,
    references: Vec<Arc<dyn ReferenceNode>>,
    in_progress: BuildInProgress,
}

impl ConfiguredProject {
    /// `root` is the directory all relative paths in `file` resolve against.
    pub fn new(file: ProjectFile, root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let root = root.into();

        let patterns = file
            .groups()
            .iter()
            .map(|g| GroupPatterns::compile(&g.name, &g.include, &g.exclude))
            .collect::<Result<Vec<_>>>()?;

        let references = file
            .references()
            .iter()
            .map(|r| {
                let path = normalize_path(&root, Path::new(&r.path));
                Arc::new(FileReference::new(r.name.clone(), path, Arc::clone(&fs)))
                    as Arc<dyn ReferenceNode>
            })
            .collect();

        Ok(Self {
            file,
            root,
            fs,
            patterns,
            references,
            in_progress: BuildInProgress::new(),
        })
    }

    pub fn configuration(&self) -> &str {
        self.file.configuration()
    }

    pub fn commands(&self) -> &CommandsSection {
        self.file.commands()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file(&self) -> &ProjectFile {
        &self.file
    }

    pub fn filesystem(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.fs)
    }

    /// Handle to the flag the executor sets while a build runs.
    pub fn build_in_progress(&self) -> BuildInProgress {
        self.in_progress.clone()
    }

    /// Canonical form of a project-relative path.
    ///
    /// Existing files go through `canonicalize` so symlinks resolve the same
    /// way for inputs and outputs; files that do not exist yet fall back to
    /// lexical normalization.
    fn canonical(&self, path: &str) -> PathBuf {
        let normalized = normalize_path(&self.root, Path::new(path));
        self.fs.canonicalize(&normalized).unwrap_or(normalized)
    }

    fn group_entry(&self, name: &str) -> Option<(&GroupConfig, Option<&GroupPatterns>)> {
        self.file
            .groups()
            .iter()
            .zip(self.patterns.iter())
            .find(|(g, _)| g.name == name)
            .map(|(g, p)| (g, p.as_ref()))
    }
}

impl ProjectModel for ConfiguredProject {
    fn output_group_names(&self) -> Vec<GroupDescriptor> {
        if !self.file.is_buildable() {
            debug!("project has no build command; reporting no output groups");
            return Vec::new();
        }

        self.file
            .groups()
            .iter()
            .map(|g| GroupDescriptor::new(g.name.clone(), g.effective_role()))
            .collect()
    }

    fn enumerate_outputs(&self, group: &GroupDescriptor) -> Result<Vec<Output>> {
        let (config, patterns) = self
            .group_entry(&group.name)
            .ok_or_else(|| anyhow!("unknown output group '{}'", group.name))?;

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut outputs = Vec::new();

        for entry in config.output.iter() {
            let path = self.canonical(&entry.path);
            if !seen.insert(path.clone()) {
                continue;
            }
            let mut output = Output::new(path);
            for (key, value) in entry.metadata.iter() {
                let value = if key == SOURCE_FILE_METADATA && !value.trim().is_empty() {
                    self.canonical(value).to_string_lossy().into_owned()
                } else {
                    value.clone()
                };
                output = output.with_metadata(key.clone(), value);
            }
            outputs.push(output);
        }

        for file in config.files.iter() {
            let path = self.canonical(file);
            if seen.insert(path.clone()) {
                outputs.push(Output::new(path));
            }
        }

        if let Some(patterns) = patterns {
            for found in collect_matching_files(self.fs.as_ref(), &self.root, patterns)? {
                let path = self
                    .fs
                    .canonicalize(&found)
                    .unwrap_or_else(|_| normalize_path(&self.root, &found));
                if seen.insert(path.clone()) {
                    outputs.push(Output::new(path));
                }
            }
        }

        Ok(outputs)
    }

    fn is_build_in_progress(&self) -> bool {
        self.in_progress.get()
    }

    fn reference_nodes(&self) -> Vec<Arc<dyn ReferenceNode>> {
        self.references.clone()
    }
}
