// src/config/validate.rs

use std::collections::HashSet;

use crate::catalog::GroupClassifier;
use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::{BuildgateError, Result};
use crate::project::patterns::build_globset;

impl TryFrom<RawProjectFile> for ProjectFile {
    type Error = BuildgateError;

    fn try_from(raw: RawProjectFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ProjectFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawProjectFile) -> Result<()> {
    validate_project_section(cfg)?;
    validate_commands(cfg)?;
    validate_groups(cfg)?;
    validate_references(cfg)?;
    Ok(())
}

fn validate_project_section(cfg: &RawProjectFile) -> Result<()> {
    if cfg.project.configuration.trim().is_empty() {
        return Err(BuildgateError::ConfigError(
            "[project].configuration must not be empty".to_string(),
        ));
    }

    GroupClassifier::new(&cfg.project.input_group_pattern)?;
    Ok(())
}

fn validate_commands(cfg: &RawProjectFile) -> Result<()> {
    let commands = [
        ("build", &cfg.commands.build),
        ("rebuild", &cfg.commands.rebuild),
        ("clean", &cfg.commands.clean),
    ];

    for (key, cmd) in commands {
        if let Some(cmd) = cmd {
            if cmd.trim().is_empty() {
                return Err(BuildgateError::ConfigError(format!(
                    "[commands].{key} must not be empty when present"
                )));
            }
        }
    }
    Ok(())
}

fn validate_groups(cfg: &RawProjectFile) -> Result<()> {
    let mut seen = HashSet::new();

    for group in cfg.group.iter() {
        if group.name.trim().is_empty() {
            return Err(BuildgateError::ConfigError(
                "[[group]] entries must have a non-empty name".to_string(),
            ));
        }
        if !seen.insert(group.name.as_str()) {
            return Err(BuildgateError::ConfigError(format!(
                "group '{}' is declared more than once",
                group.name
            )));
        }

        for (kind, patterns) in [("include", &group.include), ("exclude", &group.exclude)] {
            build_globset(patterns).map_err(|e| {
                BuildgateError::InvalidPattern(format!(
                    "group '{}' {kind}: {e:#}",
                    group.name
                ))
            })?;
        }

        if group.output.iter().any(|o| o.path.trim().is_empty()) {
            return Err(BuildgateError::ConfigError(format!(
                "group '{}' has an output with an empty path",
                group.name
            )));
        }
    }
    Ok(())
}

fn validate_references(cfg: &RawProjectFile) -> Result<()> {
    for reference in cfg.reference.iter() {
        if reference.path.trim().is_empty() {
            return Err(BuildgateError::ConfigError(format!(
                "reference '{}' has an empty path",
                reference.name
            )));
        }
    }
    Ok(())
}
