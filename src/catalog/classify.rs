// src/catalog/classify.rs

use regex::Regex;

use crate::errors::{BuildgateError, Result};

/// Group name that marks source inputs unless configured otherwise.
pub const DEFAULT_INPUT_GROUP_PATTERN: &str = "^SourceFiles$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Build sources.
    Input,
    /// Build products.
    Output,
}

/// Name predicate deciding whether a group holds inputs or outputs.
#[derive(Debug, Clone)]
pub struct GroupClassifier {
    input_pattern: Regex,
}

impl GroupClassifier {
    pub fn new(input_pattern: &str) -> Result<Self> {
        let input_pattern = Regex::new(input_pattern).map_err(|e| {
            BuildgateError::InvalidPattern(format!("input group pattern {input_pattern:?}: {e}"))
        })?;
        Ok(Self { input_pattern })
    }

    pub fn classify(&self, group_name: &str) -> GroupKind {
        if self.input_pattern.is_match(group_name) {
            GroupKind::Input
        } else {
            GroupKind::Output
        }
    }
}

impl Default for GroupClassifier {
    fn default() -> Self {
        Self {
            input_pattern: Regex::new(DEFAULT_INPUT_GROUP_PATTERN)
                .unwrap_or_else(|_| unreachable!("default pattern is valid")),
        }
    }
}
