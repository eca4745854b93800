//! Report generation pipeline.
//!
//! A fixed sequential DAG of model-calling stages: caption extraction →
//! summarization → visualization planning → visualization rendering →
//! assembly. Every stage is total over the pipeline state; failures
//! degrade the affected item or stage output instead of aborting the run.
//!
//! This crate provides:
//! - The stage implementations and the orchestrator that wires them
//! - HTTP clients for the transcription provider and the generative model
//! - A bounded retry-with-backoff policy for external calls
//! - Progress sink and job store seams for callers

pub mod assemble;
pub mod captions;
pub mod config;
pub mod error;
pub mod job_store;
pub mod json_extract;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod plan;
pub mod progress;
pub mod render;
pub mod retry;
pub mod summarize;

pub use captions::{CaptionClient, TranscriptSource, CAPTION_ERROR_PREFIX};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use job_store::{InMemoryJobStore, JobStore};
pub use logging::JobLogger;
pub use model::{GeminiClient, GenerativeModel};
pub use orchestrator::ReportPipeline;
pub use progress::{LogProgress, NoopProgress, ProgressSink};
