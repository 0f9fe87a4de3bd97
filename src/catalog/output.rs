// src/catalog/output.rs

//! Artifact types handed out by the catalog.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::classify::GroupKind;
use crate::types::SOURCE_FILE_METADATA;

/// Name + role label of a group, as reported by the project model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub name: String,
    /// Free-form label, only used in diagnostics.
    pub role: String,
}

impl GroupDescriptor {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }
}

/// A single artifact: canonical path plus string metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    canonical_path: PathBuf,
    metadata: BTreeMap<String, String>,
}

impl Output {
    pub fn new(canonical_path: impl Into<PathBuf>) -> Self {
        Self {
            canonical_path: canonical_path.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn canonical_path(&self) -> &Path {
        &self.canonical_path
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// The `SourceFile` link, if present and non-empty.
    pub fn source_file(&self) -> Option<&Path> {
        self.metadata(SOURCE_FILE_METADATA)
            .filter(|s| !s.trim().is_empty())
            .map(Path::new)
    }
}

/// A named group of artifacts with a fixed input/output classification.
#[derive(Debug, Clone)]
pub struct OutputGroup {
    name: String,
    role: String,
    kind: GroupKind,
    outputs: Vec<Output>,
    enumeration_failed: bool,
}

impl OutputGroup {
    pub(crate) fn new(descriptor: GroupDescriptor, kind: GroupKind, outputs: Vec<Output>) -> Self {
        Self {
            name: descriptor.name,
            role: descriptor.role,
            kind,
            outputs,
            enumeration_failed: false,
        }
    }

    /// A group whose members could not be listed. It has no outputs, and
    /// its membership is unknown rather than empty.
    pub(crate) fn failed(descriptor: GroupDescriptor, kind: GroupKind) -> Self {
        Self {
            enumeration_failed: true,
            ..Self::new(descriptor, kind, Vec::new())
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn is_input(&self) -> bool {
        self.kind == GroupKind::Input
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn enumeration_failed(&self) -> bool {
        self.enumeration_failed
    }
}
