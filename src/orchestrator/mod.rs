// src/orchestrator/mod.rs

//! Public contract for build, clean and up-to-date-check operations of one
//! configuration.
//!
//! The orchestrator owns the catalog, the evaluator and the callback
//! registry. It delegates the actual work to a [`BuildExecutor`] and only
//! reads the project's "build in progress" flag; it does not itself prevent
//! two builds from overlapping. Callers are expected to check
//! [`BuildOrchestrator::query_start`] first.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::callbacks::{BuildStatusSubscriber, CallbackRegistry, SubscriberHandle};
use crate::catalog::{GroupClassifier, OutputGroupCatalog};
use crate::errors::{BuildgateError, Result};
use crate::exec::{BuildExecutor, BuildRequest, CompletionCallback, OutputSink};
use crate::fs::FileSystem;
use crate::project::ProjectModel;
use crate::staleness::{StalenessEvaluator, Verdict};
use crate::types::{BuildOptions, BuildResult, BuildTarget, OperationKind};

/// Answer to `query_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStart {
    pub supported: bool,
    pub ready: bool,
}

/// Acknowledgement of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Handed to the executor; the end notification follows later.
    Started,
    /// A subscriber vetoed the build; nothing was executed.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    NotImplemented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Building,
}

pub struct BuildOrchestrator {
    configuration: String,
    project: Arc<dyn ProjectModel>,
    executor: Arc<dyn BuildExecutor>,
    catalog: OutputGroupCatalog,
    evaluator: StalenessEvaluator,
    callbacks: Arc<CallbackRegistry>,
    output: Arc<dyn OutputSink>,
}

impl std::fmt::Debug for BuildOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("configuration", &self.configuration)
            .field("catalog", &self.catalog)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl BuildOrchestrator {
    pub fn new(
        configuration: impl Into<String>,
        project: Arc<dyn ProjectModel>,
        executor: Arc<dyn BuildExecutor>,
        fs: Arc<dyn FileSystem>,
        output: Arc<dyn OutputSink>,
    ) -> Self {
        let catalog = OutputGroupCatalog::new(Arc::clone(&project), GroupClassifier::default());
        let callbacks = Arc::new(CallbackRegistry::for_project(Arc::clone(&project)));
        Self {
            configuration: configuration.into(),
            project,
            executor,
            catalog,
            evaluator: StalenessEvaluator::new(fs),
            callbacks,
            output,
        }
    }

    /// Replace the input/output group classifier.
    pub fn with_classifier(mut self, classifier: GroupClassifier) -> Self {
        self.catalog = OutputGroupCatalog::new(Arc::clone(&self.project), classifier);
        self
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn catalog(&self) -> &OutputGroupCatalog {
        &self.catalog
    }

    pub fn state(&self) -> OrchestratorState {
        if self.project.is_build_in_progress() {
            OrchestratorState::Building
        } else {
            OrchestratorState::Idle
        }
    }

    pub fn is_build_supported(&self) -> bool {
        self.catalog.is_build_supported()
    }

    /// Configuration properties changed; drop the cached groups.
    pub fn on_configuration_changed(&self) {
        info!(configuration = %self.configuration, "configuration changed; resetting catalog");
        self.catalog.reset();
    }

    pub fn add_build_status_subscriber(
        &self,
        subscriber: Arc<dyn BuildStatusSubscriber>,
    ) -> SubscriberHandle {
        self.callbacks.register(subscriber)
    }

    pub fn remove_build_status_subscriber(&self, handle: SubscriberHandle) {
        self.callbacks.unregister(handle);
    }

    pub fn query_start(&self, kind: OperationKind) -> QueryStart {
        let ready = !self.project.is_build_in_progress();
        debug!(?kind, ready, "query start");
        QueryStart {
            supported: true,
            ready,
        }
    }

    /// True when no build is running.
    pub fn query_status(&self) -> bool {
        !self.project.is_build_in_progress()
    }

    pub fn start_build(&self, options: BuildOptions) -> Result<Ack> {
        let target = if options.rebuild {
            BuildTarget::Rebuild
        } else {
            BuildTarget::Default
        };
        self.start(options, target, false)
    }

    pub fn start_clean(&self, options: BuildOptions) -> Result<Ack> {
        self.start(options, BuildTarget::Clean, true)
    }

    /// Synchronous check against the current on-disk state.
    pub fn start_up_to_date_check(&self) -> bool {
        self.up_to_date_verdict().is_up_to_date()
    }

    /// Same check as [`Self::start_up_to_date_check`], keeping the reason.
    pub fn up_to_date_verdict(&self) -> Verdict {
        self.evaluator.evaluate(&self.catalog)
    }

    /// Does not cancel anything; the running build still completes and
    /// still sends its end notification.
    pub fn stop(&self, synchronous: bool) -> StopOutcome {
        debug!(synchronous, "stop requested; in-flight builds are not interrupted");
        StopOutcome::Stopped
    }

    pub fn wait(&self, timeout: Duration, tick_messages: bool) -> WaitOutcome {
        debug!(?timeout, tick_messages, "wait is not implemented");
        WaitOutcome::NotImplemented
    }

    fn start(&self, options: BuildOptions, target: BuildTarget, clean: bool) -> Result<Ack> {
        if self.project.is_build_in_progress() {
            warn!(
                configuration = %self.configuration,
                target_kind = %target,
                "starting a build while another one is in progress"
            );
        }

        self.executor.prepare_build(&self.configuration, clean)?;

        if !self.callbacks.notify_begin() {
            info!(target_kind = %target, "build cancelled by a subscriber");
            return Ok(Ack::Cancelled);
        }

        let request = BuildRequest {
            options,
            configuration: self.configuration.clone(),
            output: Arc::clone(&self.output),
            target,
        };

        let callbacks = Arc::clone(&self.callbacks);
        let on_complete: CompletionCallback = Box::new(move |result, target| {
            info!(?result, target_kind = %target, "build completed");
            callbacks.notify_end(result, target);
        });

        if let Err(err) = self.executor.execute_build_async(request, on_complete) {
            error!(target_kind = %target, error = %err, "failed to start build");
            self.output.write_line(&format!("error: {err:#}"));
            self.callbacks.notify_end(BuildResult::Failed, target);
            self.output.flush();
            return Err(BuildgateError::ExecutorFailed(format!("{err:#}")));
        }

        info!(configuration = %self.configuration, target_kind = %target, "build started");
        Ok(Ack::Started)
    }
}
