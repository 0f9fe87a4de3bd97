// src/project/mod.rs

//! Boundary to the project model.
//!
//! The project model owns the knowledge of which artifact groups exist, what
//! their members are, whether a build is currently running, and which
//! external references the project holds. `buildgate` only consumes it
//! through [`ProjectModel`].
//!
//! - [`configured`] provides [`ConfiguredProject`], a project model backed by
//!   a `Buildgate.toml` project file.
//! - [`patterns`] compiles the `include` / `exclude` globs of a group and
//!   walks the project tree for matches.
//! - [`reference`] provides [`FileReference`], a reference node that resolves
//!   to a file on disk.

pub mod configured;
pub mod patterns;
pub mod reference;

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;

use crate::catalog::{GroupDescriptor, Output};

pub use configured::ConfiguredProject;
pub use reference::FileReference;

/// What `buildgate` needs from the external project model.
pub trait ProjectModel: Send + Sync + Debug {
    /// Groups of artifacts for the active configuration.
    ///
    /// Empty when the project has no buildable target.
    fn output_group_names(&self) -> Vec<GroupDescriptor>;

    /// Members of one group, with canonical paths already resolved.
    fn enumerate_outputs(&self, group: &GroupDescriptor) -> Result<Vec<Output>>;

    /// The shared "build in progress" flag.
    fn is_build_in_progress(&self) -> bool;

    fn reference_nodes(&self) -> Vec<Arc<dyn ReferenceNode>>;
}

/// An external reference held by the project (a library, a package, ...).
pub trait ReferenceNode: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Whether this reference can be re-resolved at all.
    fn can_resolve(&self) -> bool;

    /// Re-resolve the reference against the current on-disk state.
    fn refresh(&self) -> Result<()>;
}
