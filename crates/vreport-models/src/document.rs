//! Assembled final document: ordered text and visualization sections.

use serde::{Deserialize, Serialize};

use crate::{VisualizationPayload, VisualizationRequest};

/// One ordered slice of the assembled document.
///
/// Concatenating all `text` sections with the inserted visualizations, in
/// section order, reproduces the tagged narrative with every marker
/// replaced (or dropped, when no rendering succeeded for its tag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Text {
        content: String,
    },
    Visualization {
        tag_id: String,
        payload: VisualizationPayload,
        #[serde(default)]
        insight: String,
        original_request: VisualizationRequest,
        /// The narrative excerpt the visualization is anchored near.
        anchor_text: String,
    },
}

impl Section {
    pub fn is_text(&self) -> bool {
        matches!(self, Section::Text { .. })
    }

    pub fn is_visualization(&self) -> bool {
        matches!(self, Section::Visualization { .. })
    }
}

/// Tag reconciliation statistics for one assembly pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Count of `[VIZ_<id>]` markers matched in the tagged narrative.
    pub tags_found: u32,
    /// Count of visualization sections actually emitted.
    pub visualizations_inserted: u32,
    /// `"inserted/found"`, e.g. `"2/3"`.
    pub success_rate: String,
}

impl AssemblyStats {
    pub fn new(tags_found: u32, visualizations_inserted: u32) -> Self {
        Self {
            tags_found,
            visualizations_inserted,
            success_rate: format!("{}/{}", visualizations_inserted, tags_found),
        }
    }
}

/// The pipeline's final output. Always a well-formed shape: on fatal
/// failure `success` is false, `error` carries the triggering message,
/// and `sections` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDocument {
    pub success: bool,

    pub source_url: String,

    pub sections: Vec<Section>,

    pub stats: AssemblyStats,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FinalDocument {
    /// A successfully assembled document.
    pub fn assembled(
        source_url: impl Into<String>,
        sections: Vec<Section>,
        stats: AssemblyStats,
    ) -> Self {
        Self {
            success: true,
            source_url: source_url.into(),
            sections,
            stats,
            error: None,
        }
    }

    /// The error document returned when a fatal failure escapes to the
    /// orchestrator boundary.
    pub fn failure(source_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            source_url: source_url.into(),
            sections: Vec::new(),
            stats: AssemblyStats::new(0, 0),
            error: Some(error.into()),
        }
    }

    pub fn text_section_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_text()).count()
    }

    pub fn visualization_section_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_visualization()).count()
    }
}
