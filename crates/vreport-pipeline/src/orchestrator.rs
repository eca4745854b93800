//! Pipeline orchestrator.
//!
//! Runs the fixed stage sequence over one source URL, threading a
//! [`PipelineState`] through captioning, summarization, planning,
//! rendering, and assembly. Each stage is total over its input, so the
//! only thing that can escape is a panic; the top-level boundary
//! converts that into a failure document instead of unwinding into the
//! caller.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use vreport_models::{FinalDocument, JobId, JobRecord, PipelineStage, PipelineState};

use crate::assemble::assemble;
use crate::captions::TranscriptSource;
use crate::config::PipelineConfig;
use crate::job_store::{InMemoryJobStore, JobStore};
use crate::logging::JobLogger;
use crate::model::GenerativeModel;
use crate::plan::plan;
use crate::progress::{NoopProgress, ProgressSink};
use crate::render::render_all;
use crate::summarize::summarize;

/// The content pipeline: source URL in, [`FinalDocument`] out.
pub struct ReportPipeline<M, C> {
    model: M,
    captions: C,
    config: PipelineConfig,
    progress: Arc<dyn ProgressSink>,
    job_store: Arc<dyn JobStore>,
}

impl<M: GenerativeModel, C: TranscriptSource> ReportPipeline<M, C> {
    pub fn new(model: M, captions: C, config: PipelineConfig) -> Self {
        Self {
            model,
            captions,
            config,
            progress: Arc::new(NoopProgress),
            job_store: Arc::new(InMemoryJobStore::new()),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_job_store(mut self, job_store: Arc<dyn JobStore>) -> Self {
        self.job_store = job_store;
        self
    }

    /// Run the full pipeline for one source URL.
    ///
    /// Always returns a well-formed document: stage-level failures
    /// degrade within their stage, and anything that escapes anyway is
    /// caught here and reported as a failure document.
    pub async fn run(&self, source_url: &str, job_id: Option<JobId>) -> FinalDocument {
        let job_id = job_id.unwrap_or_default();
        let logger = JobLogger::new(&job_id);
        logger.log_start(source_url);

        if let Err(e) = self
            .job_store
            .put(JobRecord::new(job_id.clone(), source_url))
        {
            logger.log_warning(&format!("Job store write failed: {}", e));
        }

        let inner = AssertUnwindSafe(self.run_inner(source_url, &job_id, &logger));
        match inner.catch_unwind().await {
            Ok(document) => document,
            Err(panic) => {
                let message = panic_message(panic);
                logger.log_error(&format!("Pipeline aborted: {}", message));
                self.record_failure(&job_id, &message, &logger);
                FinalDocument::failure(source_url, message)
            }
        }
    }

    async fn run_inner(
        &self,
        source_url: &str,
        job_id: &JobId,
        logger: &JobLogger,
    ) -> FinalDocument {
        let mut state = PipelineState::new(source_url);

        self.enter_stage(
            job_id,
            logger,
            PipelineStage::Captioning,
            5,
            "Extracting captions",
        );
        state.transcript = self.captions.extract(source_url).await;

        self.enter_stage(
            job_id,
            logger,
            PipelineStage::Summarizing,
            25,
            "Generating narrative report",
        );
        state.narrative = summarize(&self.model, &state.transcript).await;

        self.enter_stage(
            job_id,
            logger,
            PipelineStage::Planning,
            45,
            "Planning visualizations",
        );
        let outcome = plan(&self.model, &state.narrative).await;
        state.tagged_narrative = outcome.tagged_narrative;
        state.visualization_requests = outcome.requests;

        self.enter_stage(
            job_id,
            logger,
            PipelineStage::Rendering,
            60,
            "Rendering visualizations",
        );
        state.rendered_visualizations = render_all(
            &self.model,
            &state.visualization_requests,
            &state.transcript,
            self.config.max_render_parallel,
        )
        .await;

        self.enter_stage(
            job_id,
            logger,
            PipelineStage::Assembling,
            90,
            "Assembling document",
        );
        let document = assemble(
            &state.source_url,
            &state.tagged_narrative,
            &state.rendered_visualizations,
        );
        state.final_document = Some(document.clone());

        self.enter_stage(job_id, logger, PipelineStage::Done, 100, "Report complete");
        logger.log_completion(document.sections.len(), &document.stats.success_rate);

        document
    }

    /// Record a stage transition. Store and sink failures are logged
    /// and swallowed; bookkeeping never fails the run.
    fn enter_stage(
        &self,
        job_id: &JobId,
        logger: &JobLogger,
        stage: PipelineStage,
        percent: u8,
        message: &str,
    ) {
        logger.log_stage(stage, message);
        self.progress.report(job_id, percent, message);

        let update = self.job_store.get(job_id).and_then(|record| match record {
            Some(record) => self.job_store.put(record.advance(stage, percent, message)),
            None => Ok(()),
        });
        if let Err(e) = update {
            logger.log_warning(&format!("Job store update failed: {}", e));
        }
    }

    fn record_failure(&self, job_id: &JobId, error: &str, logger: &JobLogger) {
        let update = self.job_store.get(job_id).and_then(|record| match record {
            Some(record) => self.job_store.put(record.fail(error)),
            None => Ok(()),
        });
        if let Err(e) = update {
            logger.log_warning(&format!("Job store update failed: {}", e));
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected internal error".to_string()
    }
}
