// src/exec/output.rs

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Destination for build output text (the "output pane").
pub trait OutputSink: Send + Sync {
    fn write_line(&self, line: &str);
    fn flush(&self);
}

/// Writes build output to stdout; logs stay on stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }

    fn flush(&self) {
        let _ = io::stdout().lock().flush();
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    flushes: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        lock(&self.lines).iter().any(|l| l.contains(needle))
    }

    pub fn flush_count(&self) -> usize {
        *lock(&self.flushes)
    }
}

impl OutputSink for MemorySink {
    fn write_line(&self, line: &str) {
        lock(&self.lines).push(line.to_string());
    }

    fn flush(&self) {
        *lock(&self.flushes) += 1;
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
