//! Job bookkeeping for pipeline runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a pipeline job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of the fixed sequential pipeline.
///
/// Transitions are strictly linear: Captioning → Summarizing → Planning →
/// Rendering → Assembling → Done, with Failed reachable only from the
/// orchestrator's top-level boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Fetching the transcript from the transcription provider
    #[default]
    Captioning,
    /// Generating the long-form narrative report
    Summarizing,
    /// Analyzing the narrative for visualization opportunities
    Planning,
    /// Rendering the planned visualizations
    Rendering,
    /// Reconciling tags and building the final document
    Assembling,
    /// Pipeline completed
    Done,
    /// Pipeline aborted by a fatal error
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captioning => "captioning",
            Self::Summarizing => "summarizing",
            Self::Planning => "planning",
            Self::Rendering => "rendering",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Persistent record of one pipeline run, held in a keyed job store
/// rather than a process-wide registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique job ID
    pub job_id: JobId,

    /// Source video URL
    pub source_url: String,

    /// Current pipeline stage
    #[serde(default)]
    pub stage: PipelineStage,

    /// Progress (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Last human-readable status message
    #[serde(default)]
    pub message: String,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a new record at the start of the pipeline.
    pub fn new(job_id: JobId, source_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            source_url: source_url.into(),
            stage: PipelineStage::Captioning,
            progress: 0,
            message: String::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance to a new stage with an updated progress percentage.
    pub fn advance(mut self, stage: PipelineStage, progress: u8, message: impl Into<String>) -> Self {
        self.stage = stage;
        self.progress = progress.min(100);
        self.message = message.into();
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as failed.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.stage = PipelineStage::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
        self
    }
}
