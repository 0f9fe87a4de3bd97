// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::Result;

/// Load a project file from a given path and return the raw `RawProjectFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProjectFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawProjectFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a project file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks configuration name, group names, glob and regex patterns.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let raw = load_from_path(&path)?;
    let config = ProjectFile::try_from(raw)?;
    Ok(config)
}

/// `Buildgate.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Buildgate.toml")
}

/// Directory paths in the project file are relative to.
///
/// A bare filename like `Buildgate.toml` has an empty parent, so fall back
/// to the current working directory.
pub fn project_root_dir(config_path: &Path) -> PathBuf {
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    match std::env::current_dir() {
        Ok(cwd) => crate::fs::normalize_path(&cwd, &dir),
        Err(_) => dir,
    }
}
