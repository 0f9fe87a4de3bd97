// src/staleness/verdict.rs

use std::fmt;
use std::path::PathBuf;

/// Outcome of one staleness pass, with the first reason found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    UpToDate,
    /// The members of a group could not be listed.
    EnumerationFailed { group: String },
    /// An output file does not exist.
    MissingOutput { path: PathBuf },
    /// A timestamp could not be read (permissions, bad path, ...).
    UnreadableTimestamp { path: PathBuf, cause: String },
    /// An output's linked `SourceFile` was written after the output.
    SourceNewer { output: PathBuf, source: PathBuf },
    /// Some input was written after the earliest output.
    InputNewer { input: PathBuf },
}

impl Verdict {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Verdict::UpToDate)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::UpToDate => write!(f, "up to date"),
            Verdict::EnumerationFailed { group } => {
                write!(f, "members of group '{group}' could not be enumerated")
            }
            Verdict::MissingOutput { path } => write!(f, "output {} is missing", path.display()),
            Verdict::UnreadableTimestamp { path, cause } => {
                write!(f, "cannot read timestamp of {}: {cause}", path.display())
            }
            Verdict::SourceNewer { output, source } => write!(
                f,
                "source {} is newer than output {}",
                source.display(),
                output.display()
            ),
            Verdict::InputNewer { input } => {
                write!(f, "input {} is newer than the oldest output", input.display())
            }
        }
    }
}
