use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use buildgate::exec::{BuildExecutor, BuildRequest, CompletionCallback};
use buildgate::types::{BuildInProgress, BuildResult, BuildTarget};

/// Shared, ordered record of what happened during a test.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// How a `FakeExecutor` reacts to `execute_build_async`.
#[derive(Debug, Clone)]
pub enum ExecutorMode {
    /// Invoke the completion callback before returning.
    CompleteImmediately(BuildResult),
    /// Complete from a tokio task (requires a runtime).
    CompleteOnRuntime(BuildResult),
    /// Keep the callback until `complete_next` is called.
    Deferred,
    /// Refuse to start with this message.
    FailToStart(String),
    /// `prepare_build` fails with this message.
    FailToPrepare(String),
}

/// A fake executor that:
/// - records prepare calls and build requests
/// - completes builds according to its `ExecutorMode`
/// - keeps the shared "build in progress" flag up to date.
pub struct FakeExecutor {
    mode: Mutex<ExecutorMode>,
    in_progress: BuildInProgress,
    log: Option<EventLog>,
    prepared: Mutex<Vec<(String, bool)>>,
    requests: Mutex<Vec<BuildRequest>>,
    pending: Mutex<Vec<(BuildTarget, CompletionCallback)>>,
}

impl FakeExecutor {
    pub fn new(mode: ExecutorMode, in_progress: BuildInProgress) -> Self {
        Self {
            mode: Mutex::new(mode),
            in_progress,
            log: None,
            prepared: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn set_mode(&self, mode: ExecutorMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn prepared(&self) -> Vec<(String, bool)> {
        self.prepared.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<BuildRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn executed_targets(&self) -> Vec<BuildTarget> {
        self.requests().iter().map(|r| r.target).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Finish the oldest deferred build. Returns false if none was pending.
    pub fn complete_next(&self, result: BuildResult) -> bool {
        let next = {
            let mut pending = self.pending.lock().unwrap();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        };
        match next {
            Some((target, callback)) => {
                self.record(format!("complete:{target}"));
                self.in_progress.set(false);
                callback(result, target);
                true
            }
            None => false,
        }
    }

    fn record(&self, event: String) {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(event);
        }
    }
}

impl BuildExecutor for FakeExecutor {
    fn prepare_build(&self, configuration: &str, clean: bool) -> Result<()> {
        self.record(format!("prepare:{clean}"));
        if let ExecutorMode::FailToPrepare(msg) = &*self.mode.lock().unwrap() {
            return Err(anyhow!("{msg}"));
        }
        self.prepared
            .lock()
            .unwrap()
            .push((configuration.to_string(), clean));
        Ok(())
    }

    fn execute_build_async(
        &self,
        request: BuildRequest,
        on_complete: CompletionCallback,
    ) -> Result<()> {
        let target = request.target;
        let mode = self.mode.lock().unwrap().clone();

        if let ExecutorMode::FailToStart(msg) = &mode {
            self.record(format!("execute-failed:{target}"));
            return Err(anyhow!("{msg}"));
        }

        self.record(format!("execute:{target}"));
        self.requests.lock().unwrap().push(request);
        self.in_progress.set(true);

        match mode {
            ExecutorMode::CompleteImmediately(result) => {
                self.record(format!("complete:{target}"));
                self.in_progress.set(false);
                on_complete(result, target);
            }
            ExecutorMode::CompleteOnRuntime(result) => {
                let in_progress = self.in_progress.clone();
                let log = self.log.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    if let Some(log) = log {
                        log.lock().unwrap().push(format!("complete:{target}"));
                    }
                    in_progress.set(false);
                    on_complete(result, target);
                });
            }
            ExecutorMode::Deferred | ExecutorMode::FailToPrepare(_) => {
                self.pending.lock().unwrap().push((target, on_complete));
            }
            ExecutorMode::FailToStart(_) => unreachable!(),
        }
        Ok(())
    }
}
