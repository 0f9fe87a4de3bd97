use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use buildgate::catalog::{GroupDescriptor, Output};
use buildgate::project::{ProjectModel, ReferenceNode};
use buildgate::types::BuildInProgress;

/// In-memory project model.
///
/// Groups are fixed at construction; `enumerate_calls` counts how often the
/// catalog asked for members.
#[derive(Debug)]
pub struct FakeProject {
    groups: Vec<(GroupDescriptor, Vec<Output>)>,
    failing: Mutex<HashSet<String>>,
    references: Vec<Arc<FakeReference>>,
    in_progress: BuildInProgress,
    enumerate_calls: AtomicUsize,
}

impl FakeProject {
    pub(crate) fn new(
        groups: Vec<(GroupDescriptor, Vec<Output>)>,
        failing: HashSet<String>,
        references: Vec<Arc<FakeReference>>,
        in_progress: BuildInProgress,
    ) -> Self {
        Self {
            groups,
            failing: Mutex::new(failing),
            references,
            in_progress,
            enumerate_calls: AtomicUsize::new(0),
        }
    }

    pub fn in_progress(&self) -> BuildInProgress {
        self.in_progress.clone()
    }

    pub fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.load(Ordering::SeqCst)
    }

    pub fn references(&self) -> &[Arc<FakeReference>] {
        &self.references
    }

    /// Let a failing group enumerate normally from now on.
    pub fn recover(&self, group: &str) {
        self.failing.lock().unwrap().remove(group);
    }
}

impl ProjectModel for FakeProject {
    fn output_group_names(&self) -> Vec<GroupDescriptor> {
        self.groups.iter().map(|(d, _)| d.clone()).collect()
    }

    fn enumerate_outputs(&self, group: &GroupDescriptor) -> Result<Vec<Output>> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&group.name) {
            return Err(anyhow!("enumeration of '{}' failed", group.name));
        }
        self.groups
            .iter()
            .find(|(d, _)| d.name == group.name)
            .map(|(_, outputs)| outputs.clone())
            .ok_or_else(|| anyhow!("unknown group '{}'", group.name))
    }

    fn is_build_in_progress(&self) -> bool {
        self.in_progress.get()
    }

    fn reference_nodes(&self) -> Vec<Arc<dyn ReferenceNode>> {
        self.references
            .iter()
            .map(|r| Arc::clone(r) as Arc<dyn ReferenceNode>)
            .collect()
    }
}

/// Reference node that counts refreshes.
#[derive(Debug)]
pub struct FakeReference {
    name: String,
    resolvable: bool,
    fail: bool,
    refreshes: AtomicUsize,
    refreshed: AtomicBool,
}

impl FakeReference {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resolvable: true,
            fail: false,
            refreshes: AtomicUsize::new(0),
            refreshed: AtomicBool::new(false),
        }
    }

    pub fn unresolvable(mut self) -> Self {
        self.resolvable = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn was_refreshed(&self) -> bool {
        self.refreshed.load(Ordering::SeqCst)
    }
}

impl ReferenceNode for FakeReference {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_resolve(&self) -> bool {
        self.resolvable
    }

    fn refresh(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.refreshed.store(true, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("reference '{}' cannot be refreshed", self.name));
        }
        Ok(())
    }
}
