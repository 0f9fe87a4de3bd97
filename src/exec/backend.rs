// src/exec/backend.rs

//! Pluggable build executor abstraction.
//!
//! The orchestrator talks to a `BuildExecutor` instead of spawning processes
//! itself. Production code uses [`CommandExecutor`](super::CommandExecutor);
//! tests provide executors that record requests and complete on demand.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::exec::output::OutputSink;
use crate::types::{BuildOptions, BuildResult, BuildTarget};

/// Invoked exactly once when a build started by
/// [`BuildExecutor::execute_build_async`] finishes.
pub type CompletionCallback = Box<dyn FnOnce(BuildResult, BuildTarget) + Send + 'static>;

/// Everything the executor needs to run one build.
#[derive(Clone)]
pub struct BuildRequest {
    pub options: BuildOptions,
    pub configuration: String,
    pub output: Arc<dyn OutputSink>,
    pub target: BuildTarget,
}

impl fmt::Debug for BuildRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildRequest")
            .field("options", &self.options)
            .field("configuration", &self.configuration)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

pub trait BuildExecutor: Send + Sync {
    /// Synchronous setup that must finish before the build is started.
    fn prepare_build(&self, configuration: &str, clean: bool) -> Result<()>;

    /// Start the build and return immediately.
    ///
    /// An `Err` means the build could not be started; `on_complete` must then
    /// not be called. Once `Ok` is returned, `on_complete` must eventually be
    /// called exactly once, even if the build fails internally.
    fn execute_build_async(&self, request: BuildRequest, on_complete: CompletionCallback)
    -> Result<()>;
}
