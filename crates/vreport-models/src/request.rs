//! Visualization planning output types.

use serde::{Deserialize, Serialize};

/// Why a visualization was requested.
///
/// Unknown purpose strings from the model deserialize to [`Concept`],
/// the most generic classification.
///
/// [`Concept`]: VisualizationPurpose::Concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationPurpose {
    Comparison,
    Process,
    Overview,
    Detail,
    Data,
    Timeline,
    Structure,
    #[default]
    #[serde(other)]
    Concept,
}

impl VisualizationPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comparison => "comparison",
            Self::Process => "process",
            Self::Overview => "overview",
            Self::Detail => "detail",
            Self::Data => "data",
            Self::Timeline => "timeline",
            Self::Structure => "structure",
            Self::Concept => "concept",
        }
    }
}

/// Coarse position hint from the model: which third of the narrative the
/// visualization belongs in. Unknown hints deserialize to `Middle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationHint {
    Beginning,
    End,
    #[default]
    #[serde(other)]
    Middle,
}

impl LocationHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginning => "beginning",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// One planned visualization, anchored to a narrative excerpt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationRequest {
    /// Unique within one pipeline run; assigned sequentially ("1", "2", ...)
    /// at planning time and matching the `[VIZ_<id>]` marker inserted into
    /// the tagged narrative.
    pub tag_id: String,

    /// Purpose classification.
    pub purpose: VisualizationPurpose,

    /// What should be depicted.
    pub content_description: String,

    /// Verbatim excerpt from the narrative. Used as the rendering stage's
    /// primary factual grounding and as the anchor text in the document.
    pub related_content: String,

    /// Which third of the narrative the model placed this in.
    #[serde(default)]
    pub location_hint: LocationHint,
}

impl VisualizationRequest {
    pub fn new(
        tag_id: impl Into<String>,
        purpose: VisualizationPurpose,
        content_description: impl Into<String>,
        related_content: impl Into<String>,
    ) -> Self {
        Self {
            tag_id: tag_id.into(),
            purpose,
            content_description: content_description.into(),
            related_content: related_content.into(),
            location_hint: LocationHint::default(),
        }
    }

    pub fn with_location_hint(mut self, hint: LocationHint) -> Self {
        self.location_hint = hint;
        self
    }
}
