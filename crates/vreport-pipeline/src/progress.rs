//! Progress reporting seam.
//!
//! Stage transitions are reported fire-and-forget; a sink that fails or
//! drops a report must never affect the pipeline outcome.

use tracing::info;

use vreport_models::JobId;

/// Receives stage-transition progress reports.
pub trait ProgressSink: Send + Sync {
    /// Report progress for a job. Implementations must not block on
    /// slow consumers and must not fail.
    fn report(&self, job_id: &JobId, percent: u8, message: &str);
}

/// Sink that discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _job_id: &JobId, _percent: u8, _message: &str) {}
}

/// Sink that emits each report as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, job_id: &JobId, percent: u8, message: &str) {
        info!(job_id = %job_id, percent, message, "Progress");
    }
}
