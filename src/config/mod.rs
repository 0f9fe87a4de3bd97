// src/config/mod.rs

//! Project file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a project file from disk (`loader.rs`).
//! - Validate names and patterns (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, project_root_dir};
pub use model::{
    CommandsSection, GroupConfig, OutputConfig, ProjectFile, ProjectSection, RawProjectFile,
    ReferenceConfig,
};
