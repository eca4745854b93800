//! Pipeline state threaded through every stage.

use serde::{Deserialize, Serialize};

use crate::{FinalDocument, RenderedVisualization, VisualizationRequest};

/// The single mutable record carried through the whole pipeline.
///
/// Each stage reads only fields populated by earlier stages and writes only
/// its own designated fields; no stage mutates a field owned by an earlier
/// stage (append-only threading).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// Source video URL. Never mutated after creation.
    pub source_url: String,

    /// Raw extracted captions. Carries a sentinel error string on failure.
    #[serde(default)]
    pub transcript: String,

    /// Model-generated long-form report text. Empty or a failure message
    /// when summarization could not run.
    #[serde(default)]
    pub narrative: String,

    /// Narrative with inline `[VIZ_<id>]` markers. Equals `narrative` when
    /// no visualization requests were planned.
    #[serde(default)]
    pub tagged_narrative: String,

    /// Planned visualization requests, in model-output order.
    #[serde(default)]
    pub visualization_requests: Vec<VisualizationRequest>,

    /// Successfully rendered visualizations. Order is not significant;
    /// correlation with markers is by tag id.
    #[serde(default)]
    pub rendered_visualizations: Vec<RenderedVisualization>,

    /// Assembled document, present once assembly has run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_document: Option<FinalDocument>,
}

impl PipelineState {
    /// Create a fresh state for one pipeline run.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }
}
