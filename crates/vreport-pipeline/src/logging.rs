//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for pipeline runs with
//! contextual information attached to every line.

use tracing::{error, info, warn, Span};
use vreport_models::{JobId, PipelineStage};

/// Job logger for structured logging with consistent formatting.
///
/// Every line carries the job id so a run's log lines can be correlated
/// across concurrent jobs.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
}

impl JobLogger {
    /// Create a new logger for a pipeline run.
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.to_string(),
        }
    }

    /// Log the start of a pipeline run.
    pub fn log_start(&self, source_url: &str) {
        info!(
            job_id = %self.job_id,
            source_url,
            "Pipeline started"
        );
    }

    /// Log entry into a pipeline stage.
    pub fn log_stage(&self, stage: PipelineStage, message: &str) {
        info!(
            job_id = %self.job_id,
            stage = stage.as_str(),
            "{}", message
        );
    }

    /// Log a warning during the run.
    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, "{}", message);
    }

    /// Log a pipeline failure.
    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, "{}", message);
    }

    /// Log successful completion with assembly figures.
    pub fn log_completion(&self, sections: usize, success_rate: &str) {
        info!(
            job_id = %self.job_id,
            sections,
            success_rate,
            "Pipeline completed"
        );
    }

    /// Get the job ID.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("pipeline", job_id = %self.job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id);

        assert_eq!(logger.job_id(), job_id.to_string());
    }
}
