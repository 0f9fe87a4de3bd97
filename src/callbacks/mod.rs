// src/callbacks/mod.rs

//! Build-status subscribers and lifecycle fan-out.
//!
//! Subscribers are keyed by a [`SubscriberHandle`] handed out in increasing
//! order, so iterating the map visits them in registration order. Every
//! fan-out works on a snapshot taken under the lock; hooks run without the
//! lock held and may register or unregister subscribers themselves.
//!
//! A hook that returns an error or panics is logged and otherwise ignored:
//! it counts as a "continue" vote and never stops the remaining hooks.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::project::ProjectModel;
use crate::types::{BuildResult, BuildTarget};

/// Observer of build start/end.
pub trait BuildStatusSubscriber: Send + Sync {
    /// Called before the build starts. Returning `Ok(false)` cancels it.
    fn on_build_begin(&self) -> Result<bool>;

    fn on_build_end(&self, success: bool) -> Result<()>;
}

/// Opaque registration token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberHandle(u64);

impl fmt::Display for SubscriberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Subscribers {
    next: u64,
    live: BTreeMap<SubscriberHandle, Arc<dyn BuildStatusSubscriber>>,
}

pub struct CallbackRegistry {
    subscribers: Mutex<Subscribers>,
    /// Source of reference nodes refreshed after a successful build.
    project: Option<Arc<dyn ProjectModel>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("subscribers", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    /// Registry without a project; successful builds refresh nothing.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Subscribers {
                next: 1,
                live: BTreeMap::new(),
            }),
            project: None,
        }
    }

    /// Registry that refreshes `project`'s references after successful
    /// builds.
    pub fn for_project(project: Arc<dyn ProjectModel>) -> Self {
        Self {
            project: Some(project),
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, subscriber: Arc<dyn BuildStatusSubscriber>) -> SubscriberHandle {
        let mut subs = self.lock();
        let handle = SubscriberHandle(subs.next);
        subs.next += 1;
        subs.live.insert(handle, subscriber);
        debug!(%handle, "build status subscriber registered");
        handle
    }

    /// Unknown handles are ignored.
    pub fn unregister(&self, handle: SubscriberHandle) {
        if self.lock().live.remove(&handle).is_some() {
            debug!(%handle, "build status subscriber removed");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<(SubscriberHandle, Arc<dyn BuildStatusSubscriber>)> {
        self.lock()
            .live
            .iter()
            .map(|(h, s)| (*h, Arc::clone(s)))
            .collect()
    }

    /// Ask every subscriber whether the build may start.
    ///
    /// Returns the AND of all votes.
    pub fn notify_begin(&self) -> bool {
        let mut proceed = true;
        for (handle, subscriber) in self.snapshot() {
            let vote = isolate(handle, "on_build_begin", || subscriber.on_build_begin());
            if vote == Some(false) {
                info!(%handle, "subscriber voted to cancel the build");
                proceed = false;
            }
        }
        proceed
    }

    /// Tell every subscriber the build finished, then refresh references
    /// after a successful build or rebuild.
    pub fn notify_end(&self, result: BuildResult, target: BuildTarget) {
        let success = result.is_success();
        for (handle, subscriber) in self.snapshot() {
            isolate(handle, "on_build_end", || subscriber.on_build_end(success));
        }

        if success && target.refreshes_references() {
            self.refresh_references();
        }
    }

    fn refresh_references(&self) {
        let Some(project) = &self.project else {
            return;
        };

        for node in project.reference_nodes() {
            if !node.can_resolve() {
                continue;
            }
            if let Err(err) = node.refresh() {
                warn!(reference = %node.name(), error = %err, "reference refresh failed");
            }
        }
    }
}

/// Run one subscriber hook, turning errors and panics into `None`.
fn isolate<T>(
    handle: SubscriberHandle,
    hook: &'static str,
    f: impl FnOnce() -> Result<T>,
) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            warn!(%handle, hook, error = %err, "build status subscriber failed");
            None
        }
        Err(payload) => {
            warn!(
                %handle,
                hook,
                panic = %panic_message(payload.as_ref()),
                "build status subscriber panicked"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
