#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use buildgate::catalog::{GroupDescriptor, Output};
use buildgate::types::{BuildInProgress, SOURCE_FILE_METADATA};

use crate::fake_project::{FakeProject, FakeReference};

/// Builder for `FakeProject` to simplify test setup.
pub struct ProjectBuilder {
    groups: Vec<(GroupDescriptor, Vec<Output>)>,
    failing: HashSet<String>,
    references: Vec<Arc<FakeReference>>,
    in_progress: BuildInProgress,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            failing: HashSet::new(),
            references: Vec::new(),
            in_progress: BuildInProgress::new(),
        }
    }

    pub fn with_group(mut self, name: &str, outputs: Vec<Output>) -> Self {
        let role = format!("{name}ProjectOutputGroup");
        self.groups.push((GroupDescriptor::new(name, role), outputs));
        self
    }

    /// A `SourceFiles` group holding plain paths.
    pub fn with_sources(self, paths: &[&str]) -> Self {
        let outputs = paths.iter().map(|p| Output::new(*p)).collect();
        self.with_group("SourceFiles", outputs)
    }

    /// A group whose enumeration fails.
    pub fn with_failing_group(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self.with_group(name, Vec::new())
    }

    pub fn with_reference(mut self, reference: FakeReference) -> Self {
        self.references.push(Arc::new(reference));
        self
    }

    /// Share an existing flag (e.g. with a `FakeExecutor`).
    pub fn with_in_progress(mut self, flag: BuildInProgress) -> Self {
        self.in_progress = flag;
        self
    }

    pub fn build(self) -> FakeProject {
        FakeProject::new(self.groups, self.failing, self.references, self.in_progress)
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An output linked to the source that produced it.
pub fn generated(path: &str, source: impl AsRef<Path>) -> Output {
    Output::new(path).with_metadata(
        SOURCE_FILE_METADATA,
        source.as_ref().to_string_lossy().into_owned(),
    )
}
