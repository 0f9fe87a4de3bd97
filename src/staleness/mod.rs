// src/staleness/mod.rs

//! Up-to-date check over the output group catalog.
//!
//! A group whose members could not be listed makes the outputs stale up
//! front. Otherwise there are two passes, both with early exit:
//!
//! 1. Outputs. Any missing output, unreadable timestamp, or output older
//!    than its linked `SourceFile` ends the check as stale without looking
//!    at inputs. Outputs without a usable link contribute to the earliest
//!    output time, unless the same path is also an input.
//! 2. Inputs. Missing inputs are skipped. The scan stops as soon as one
//!    input is newer than the earliest output.
//!
//! The evaluator never fails: every file-access error is folded into a stale
//! verdict and reported through `tracing`.

pub mod verdict;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::catalog::{Output, OutputGroupCatalog};
use crate::fs::FileSystem;

pub use verdict::Verdict;

/// What pass 1 learned from a single output.
enum OutputCheck {
    Stale(Verdict),
    /// Fully decided by its `SourceFile`, or doubles as an input.
    Accounted,
    /// Participates in the earliest-output comparison.
    Modified(SystemTime),
}

#[derive(Debug, Clone)]
pub struct StalenessEvaluator {
    fs: Arc<dyn FileSystem>,
}

impl StalenessEvaluator {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn is_up_to_date(&self, catalog: &OutputGroupCatalog) -> bool {
        self.evaluate(catalog).is_up_to_date()
    }

    /// Run both passes and report why the outputs are (not) current.
    pub fn evaluate(&self, catalog: &OutputGroupCatalog) -> Verdict {
        let verdict = self.scan(catalog);
        match &verdict {
            Verdict::UpToDate => debug!("outputs are up to date"),
            Verdict::UnreadableTimestamp { path, cause } => {
                warn!(path = ?path, cause = %cause, "timestamp unreadable; treating outputs as stale")
            }
            Verdict::EnumerationFailed { group } => {
                warn!(group = %group, "group members unknown; treating outputs as stale")
            }
            other => info!(reason = %other, "outputs are stale"),
        }
        verdict
    }

    fn scan(&self, catalog: &OutputGroupCatalog) -> Verdict {
        let groups = catalog.groups();

        if let Some(group) = groups.iter().find(|g| g.enumeration_failed()) {
            return Verdict::EnumerationFailed {
                group: group.name().to_string(),
            };
        }

        let all_inputs: HashSet<String> = groups
            .iter()
            .filter(|g| g.is_input())
            .flat_map(|g| g.outputs())
            .map(|o| path_key(o.canonical_path()))
            .collect();

        // `None` stands for +infinity.
        let mut earliest_output: Option<SystemTime> = None;

        for group in groups.iter().filter(|g| !g.is_input()) {
            debug!(group = %group.name(), role = %group.role(), "scanning output group");
            for output in group.outputs() {
                match self.check_output(output, &all_inputs) {
                    OutputCheck::Stale(verdict) => return verdict,
                    OutputCheck::Accounted => {}
                    OutputCheck::Modified(modified) => {
                        earliest_output =
                            Some(earliest_output.map_or(modified, |e| e.min(modified)));
                    }
                }
            }
        }

        // `None` stands for -infinity.
        let mut latest_input: Option<(SystemTime, &Path)> = None;

        'inputs: for group in groups.iter().filter(|g| g.is_input()) {
            debug!(group = %group.name(), role = %group.role(), "scanning input group");
            for input in group.outputs() {
                let path = input.canonical_path();
                if !self.fs.exists(path) {
                    continue;
                }
                let modified = match self.fs.modified(path) {
                    Ok(modified) => modified,
                    Err(err) => return unreadable(path, &err),
                };
                if latest_input.is_none_or(|(latest, _)| modified > latest) {
                    latest_input = Some((modified, path));
                }
                if let (Some(earliest), Some((latest, _))) = (earliest_output, latest_input) {
                    if latest > earliest {
                        break 'inputs;
                    }
                }
            }
        }

        match (earliest_output, latest_input) {
            (Some(earliest), Some((latest, input))) if latest > earliest => Verdict::InputNewer {
                input: input.to_path_buf(),
            },
            _ => Verdict::UpToDate,
        }
    }

    fn check_output(&self, output: &Output, all_inputs: &HashSet<String>) -> OutputCheck {
        let path = output.canonical_path();

        if !self.fs.exists(path) {
            return OutputCheck::Stale(Verdict::MissingOutput {
                path: path.to_path_buf(),
            });
        }

        let modified = match self.fs.modified(path) {
            Ok(modified) => modified,
            Err(err) => return OutputCheck::Stale(unreadable(path, &err)),
        };

        if let Some(source) = output.source_file().filter(|s| self.fs.exists(s)) {
            return match self.fs.modified(source) {
                Ok(source_modified) if source_modified > modified => {
                    OutputCheck::Stale(Verdict::SourceNewer {
                        output: path.to_path_buf(),
                        source: source.to_path_buf(),
                    })
                }
                Ok(_) => OutputCheck::Accounted,
                Err(err) => OutputCheck::Stale(unreadable(source, &err)),
            };
        }

        if all_inputs.contains(&path_key(path)) {
            debug!(path = ?path, "output is also an input; skipping");
            return OutputCheck::Accounted;
        }

        OutputCheck::Modified(modified)
    }
}

fn unreadable(path: &Path, err: &anyhow::Error) -> Verdict {
    Verdict::UnreadableTimestamp {
        path: path.to_path_buf(),
        cause: format!("{err:#}"),
    }
}

/// Case-insensitive comparison key for a canonical path.
fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
