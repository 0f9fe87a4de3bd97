// src/catalog/mod.rs

//! Named groups of build artifacts for one configuration.
//!
//! The catalog asks the project model for its group names once, enumerates
//! each group's outputs, classifies every group as input or output by name,
//! and memoizes the result until [`OutputGroupCatalog::reset`] is called.
//!
//! Only group membership is cached. Timestamps are never cached here; the
//! staleness evaluator reads them fresh on every pass. A population in which
//! any group failed to enumerate is not cached either, so the next access
//! retries.

pub mod classify;
pub mod output;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::project::ProjectModel;

pub use classify::{DEFAULT_INPUT_GROUP_PATTERN, GroupClassifier, GroupKind};
pub use output::{GroupDescriptor, Output, OutputGroup};

pub struct OutputGroupCatalog {
    project: Arc<dyn ProjectModel>,
    classifier: GroupClassifier,
    groups: Mutex<Option<Arc<[OutputGroup]>>>,
}

impl fmt::Debug for OutputGroupCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputGroupCatalog")
            .field("classifier", &self.classifier)
            .field("populated", &self.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl OutputGroupCatalog {
    pub fn new(project: Arc<dyn ProjectModel>, classifier: GroupClassifier) -> Self {
        Self {
            project,
            classifier,
            groups: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<[OutputGroup]>>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All groups, in the order the project model reports them.
    pub fn groups(&self) -> Arc<[OutputGroup]> {
        let mut cached = self.lock();
        if let Some(groups) = cached.as_ref() {
            return Arc::clone(groups);
        }

        let groups: Arc<[OutputGroup]> = self.populate().into();
        if groups.iter().any(OutputGroup::enumeration_failed) {
            debug!("group enumeration failed; catalog not memoized");
        } else {
            *cached = Some(Arc::clone(&groups));
        }
        groups
    }

    /// Look up a group by its exact name.
    pub fn find(&self, name: &str) -> Option<OutputGroup> {
        self.groups().iter().find(|g| g.name() == name).cloned()
    }

    /// An empty catalog means the project has nothing to build.
    pub fn is_build_supported(&self) -> bool {
        !self.groups().is_empty()
    }

    /// Forget the memoized groups; the next access repopulates.
    pub fn reset(&self) {
        if self.lock().take().is_some() {
            debug!("output group catalog reset");
        }
    }

    fn populate(&self) -> Vec<OutputGroup> {
        let descriptors = self.project.output_group_names();
        let mut groups = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let kind = self.classifier.classify(&descriptor.name);
            let outputs = match self.project.enumerate_outputs(&descriptor) {
                Ok(outputs) => outputs,
                Err(err) => {
                    warn!(
                        group = %descriptor.name,
                        role = %descriptor.role,
                        error = %err,
                        "failed to enumerate group outputs"
                    );
                    groups.push(OutputGroup::failed(descriptor, kind));
                    continue;
                }
            };

            debug!(
                group = %descriptor.name,
                role = %descriptor.role,
                ?kind,
                outputs = outputs.len(),
                "populated output group"
            );
            groups.push(OutputGroup::new(descriptor, kind, outputs));
        }

        info!(groups = groups.len(), "output group catalog populated");
        groups
    }
}
