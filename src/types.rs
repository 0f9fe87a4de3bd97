use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Metadata key linking a generated artifact back to the input that
/// produced it.
pub const SOURCE_FILE_METADATA: &str = "SourceFile";

/// What the executor is asked to do.
///
/// - `Default`: let the executor pick (normally an incremental build).
/// - `Rebuild`: selected when [`BuildOptions::rebuild`] is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    Build,
    Rebuild,
    Clean,
    Default,
}

impl BuildTarget {
    /// Targets after which external references are refreshed on success.
    pub fn refreshes_references(self) -> bool {
        !matches!(self, BuildTarget::Clean)
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildTarget::Build => "build",
            BuildTarget::Rebuild => "rebuild",
            BuildTarget::Clean => "clean",
            BuildTarget::Default => "default",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResult {
    Successful,
    Failed,
}

impl BuildResult {
    pub fn is_success(self) -> bool {
        matches!(self, BuildResult::Successful)
    }
}

/// Operation kinds a caller can ask about via `query_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Build,
    Clean,
    UpToDateCheck,
}

/// Option flags passed through to the build executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOptions {
    /// Force a full rebuild instead of letting the executor decide.
    pub rebuild: bool,
}

impl BuildOptions {
    pub fn rebuild() -> Self {
        Self { rebuild: true }
    }
}

/// Shared "build in progress" flag.
///
/// Owned by the project model and set by whoever actually runs the build.
/// The orchestrator only reads it.
#[derive(Debug, Clone, Default)]
pub struct BuildInProgress(Arc<AtomicBool>);

impl BuildInProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::SeqCst);
    }
}
