// src/project/reference.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::project::ReferenceNode;

/// A reference that resolves to a file inside (or next to) the project.
///
/// Refreshing re-checks whether the file exists and logs transitions, since
/// a build may create or delete the referenced artifact.
#[derive(Debug)]
pub struct FileReference {
    name: String,
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    resolved: AtomicBool,
}

impl FileReference {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        let path = path.into();
        let resolved = fs.exists(&path);
        Self {
            name: name.into(),
            path,
            fs,
            resolved: AtomicBool::new(resolved),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }
}

impl ReferenceNode for FileReference {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_resolve(&self) -> bool {
        // A path-based reference can always be looked up again.
        true
    }

    fn refresh(&self) -> Result<()> {
        let now = self.fs.exists(&self.path);
        let before = self.resolved.swap(now, Ordering::SeqCst);
        if before != now {
            info!(
                reference = %self.name,
                path = ?self.path,
                resolved = now,
                "reference resolution changed"
            );
        } else {
            debug!(reference = %self.name, resolved = now, "reference refreshed");
        }
        Ok(())
    }
}
