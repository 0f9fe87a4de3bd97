use std::sync::Mutex;

use anyhow::{Result, anyhow};
use buildgate::callbacks::BuildStatusSubscriber;

use crate::fake_executor::EventLog;

/// How a `RecordingSubscriber` behaves in its hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Vote to continue.
    Continue,
    /// Vote to cancel.
    Veto,
    /// Return an error from both hooks.
    Fail,
    /// Panic in both hooks.
    Panic,
}

/// Subscriber that records every hook call.
pub struct RecordingSubscriber {
    name: String,
    behaviour: Behaviour,
    log: Option<EventLog>,
    begins: Mutex<usize>,
    ends: Mutex<Vec<bool>>,
}

impl RecordingSubscriber {
    pub fn new(name: &str, behaviour: Behaviour) -> Self {
        Self {
            name: name.to_string(),
            behaviour,
            log: None,
            begins: Mutex::new(0),
            ends: Mutex::new(Vec::new()),
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn begin_count(&self) -> usize {
        *self.begins.lock().unwrap()
    }

    /// Success flags received by `on_build_end`, in order.
    pub fn ends(&self) -> Vec<bool> {
        self.ends.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(event);
        }
    }
}

impl BuildStatusSubscriber for RecordingSubscriber {
    fn on_build_begin(&self) -> Result<bool> {
        *self.begins.lock().unwrap() += 1;
        self.record(format!("begin:{}", self.name));
        match self.behaviour {
            Behaviour::Continue => Ok(true),
            Behaviour::Veto => Ok(false),
            Behaviour::Fail => Err(anyhow!("{} failed in on_build_begin", self.name)),
            Behaviour::Panic => panic!("{} panicked in on_build_begin", self.name),
        }
    }

    fn on_build_end(&self, success: bool) -> Result<()> {
        self.ends.lock().unwrap().push(success);
        self.record(format!("end:{}:{success}", self.name));
        match self.behaviour {
            Behaviour::Fail => Err(anyhow!("{} failed in on_build_end", self.name)),
            Behaviour::Panic => panic!("{} panicked in on_build_end", self.name),
            Behaviour::Continue | Behaviour::Veto => Ok(()),
        }
    }
}
