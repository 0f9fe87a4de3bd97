// src/exec/mod.rs

//! Build execution layer.
//!
//! - [`backend`] provides the `BuildExecutor` trait the orchestrator calls,
//!   which tests replace with fakes.
//! - [`command`] provides `CommandExecutor`, the production executor that
//!   runs the project's configured shell commands.
//! - [`runner`] runs one command with `tokio::process::Command` and streams
//!   its output.
//! - [`output`] holds the `OutputSink` trait and its console/memory sinks.

pub mod backend;
pub mod command;
pub mod output;
pub mod runner;

pub use backend::{BuildExecutor, BuildRequest, CompletionCallback};
pub use command::CommandExecutor;
pub use output::{ConsoleSink, MemorySink, OutputSink};
