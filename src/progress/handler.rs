//! Progress handler trait and events

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Orchestrated stages of a setup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Install,
    Clone,
    Render,
    Build,
    Compose,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Install => "install",
            Stage::Clone => "clone",
            Stage::Render => "render",
            Stage::Build => "build",
            Stage::Compose => "compose",
        };
        write!(f, "{}", name)
    }
}

/// Events emitted during a setup run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started in the given working directory
    Started { work_dir: String },

    StageStarted { stage: Stage },

    StageComplete { stage: Stage, duration: Duration },

    /// Capability probe answered for a dependency
    DependencyProbed { dependency: String, present: bool },

    /// An install strategy step is about to run
    InstallStepStarted {
        dependency: String,
        step: String,
        index: usize,
        total: usize,
    },

    /// Terminal install state reached
    DependencyResolved { dependency: String, outcome: String },

    /// Non-fatal condition worth surfacing
    Warning { message: String },

    Completed { total_time: Duration },

    Failed { error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
