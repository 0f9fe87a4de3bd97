// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::catalog::DEFAULT_INPUT_GROUP_PATTERN;

/// Project file as read from TOML, before validation.
///
/// ```toml
/// [project]
/// name = "app"
/// configuration = "Debug"
///
/// [commands]
/// build = "npm run build"
/// clean = "rm -rf out"
///
/// [[group]]
/// name = "SourceFiles"
/// include = ["src/**/*.js"]
///
/// [[group]]
/// name = "Built"
/// [[group.output]]
/// path = "out/app.js"
/// metadata = { SourceFile = "src/app.js" }
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawProjectFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub commands: CommandsSection,

    /// `[[group]]` entries, in declaration order.
    #[serde(default)]
    pub group: Vec<GroupConfig>,

    /// `[[reference]]` entries.
    #[serde(default)]
    pub reference: Vec<ReferenceConfig>,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    #[serde(default)]
    pub name: Option<String>,

    /// Name of the build configuration this file describes.
    #[serde(default = "default_configuration")]
    pub configuration: String,

    /// Regex over group names; matching groups are build inputs.
    #[serde(default = "default_input_group_pattern")]
    pub input_group_pattern: String,
}

fn default_configuration() -> String {
    "Debug".to_string()
}

fn default_input_group_pattern() -> String {
    DEFAULT_INPUT_GROUP_PATTERN.to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: None,
            configuration: default_configuration(),
            input_group_pattern: default_input_group_pattern(),
        }
    }
}

/// `[commands]` section.
///
/// Without `build` the project is not buildable and reports no groups.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CommandsSection {
    #[serde(default)]
    pub build: Option<String>,

    /// Falls back to `build` when absent.
    #[serde(default)]
    pub rebuild: Option<String>,

    #[serde(default)]
    pub clean: Option<String>,
}

/// `[[group]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub name: String,

    #[serde(default)]
    pub role: Option<String>,

    /// Plain member paths, relative to the project file.
    #[serde(default)]
    pub files: Vec<String>,

    /// Glob patterns matched against the project tree.
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Members that carry metadata.
    #[serde(default)]
    pub output: Vec<OutputConfig>,
}

impl GroupConfig {
    pub fn effective_role(&self) -> &str {
        self.role.as_deref().unwrap_or(&self.name)
    }
}

/// `[[group.output]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: String,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// `[[reference]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    pub name: String,
    pub path: String,
}

/// Validated project file.
///
/// Only constructible through `TryFrom<RawProjectFile>`, which runs the
/// checks in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    project: ProjectSection,
    commands: CommandsSection,
    groups: Vec<GroupConfig>,
    references: Vec<ReferenceConfig>,
}

impl ProjectFile {
    pub(crate) fn new_unchecked(raw: RawProjectFile) -> Self {
        Self {
            project: raw.project,
            commands: raw.commands,
            groups: raw.group,
            references: raw.reference,
        }
    }

    pub fn project(&self) -> &ProjectSection {
        &self.project
    }

    pub fn configuration(&self) -> &str {
        &self.project.configuration
    }

    pub fn commands(&self) -> &CommandsSection {
        &self.commands
    }

    pub fn groups(&self) -> &[GroupConfig] {
        &self.groups
    }

    pub fn references(&self) -> &[ReferenceConfig] {
        &self.references
    }

    pub fn is_buildable(&self) -> bool {
        self.commands.build.is_some()
    }
}
