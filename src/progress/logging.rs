//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { work_dir } => {
                info!(work_dir = %work_dir, "Starting setup");
            }
            ProgressEvent::StageStarted { stage } => {
                info!(stage = %stage, "Stage started");
            }
            ProgressEvent::StageComplete { stage, duration } => {
                debug!(
                    stage = %stage,
                    duration_ms = duration.as_millis(),
                    "Stage complete"
                );
            }
            ProgressEvent::DependencyProbed {
                dependency,
                present,
            } => {
                debug!(dependency = %dependency, present, "Dependency probed");
            }
            ProgressEvent::InstallStepStarted {
                dependency,
                step,
                index,
                total,
            } => {
                info!(
                    dependency = %dependency,
                    step = %step,
                    "Install step {}/{}",
                    index + 1,
                    total
                );
            }
            ProgressEvent::DependencyResolved {
                dependency,
                outcome,
            } => {
                info!(dependency = %dependency, outcome = %outcome, "Dependency resolved");
            }
            ProgressEvent::Warning { message } => {
                warn!("{}", message);
            }
            ProgressEvent::Completed { total_time } => {
                info!(total_time_ms = total_time.as_millis(), "Setup complete");
            }
            ProgressEvent::Failed { error } => {
                error!(error = %error, "Setup failed");
            }
        }
    }
}
