//! Structured run logging.
//!
//! Every pipeline log line carries the task id and operation name so a run
//! can be followed across the download, script, crop and assembly steps.

use tracing::{error, info, warn, Span};

/// Logger bound to one pipeline run.
#[derive(Debug, Clone)]
pub struct RunLogger {
    task_id: String,
    operation: String,
}

impl RunLogger {
    /// Create a logger for a task and operation (e.g. "pipeline").
    pub fn new(task_id: &str, operation: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            task_id = %self.task_id,
            operation = %self.operation,
            "Run started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            task_id = %self.task_id,
            operation = %self.operation,
            "Run progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            task_id = %self.task_id,
            operation = %self.operation,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            task_id = %self.task_id,
            operation = %self.operation,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            task_id = %self.task_id,
            operation = %self.operation,
            "Run completed: {}", message
        );
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Tracing span carrying the run's fields.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "pipeline_run",
            task_id = %self.task_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let logger = RunLogger::new("test_111901", "pipeline");

        assert_eq!(logger.task_id(), "test_111901");
        assert_eq!(logger.operation(), "pipeline");
    }
}
