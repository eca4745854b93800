//! Rendered visualization envelope and kind-specific payloads.
//!
//! The model selects one of several output shapes; the rendering stage
//! validates and normalizes each into the closed [`VisualizationPayload`]
//! variant set. String-typed dispatch is confined to that normalization
//! boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::VisualizationRequest;

/// Closed set of visualization kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationKind {
    Chart,
    Network,
    Flow,
    Table,
    Creative,
}

impl VisualizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Network => "network",
            Self::Flow => "flow",
            Self::Table => "table",
            Self::Creative => "creative",
        }
    }
}

/// Kind-specific visualization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisualizationPayload {
    Chart(ChartSpec),
    Network(DiagramSpec),
    Flow(DiagramSpec),
    /// Node-link graph with numeric weights (timeline/advanced shapes).
    WeightedGraph(WeightedGraphSpec),
    Table(TableSpec),
    Creative(CreativeSpec),
}

impl VisualizationPayload {
    /// The kind this payload renders as.
    pub fn kind(&self) -> VisualizationKind {
        match self {
            Self::Chart(_) => VisualizationKind::Chart,
            Self::Network(_) | Self::WeightedGraph(_) => VisualizationKind::Network,
            Self::Flow(_) => VisualizationKind::Flow,
            Self::Table(_) => VisualizationKind::Table,
            Self::Creative(_) => VisualizationKind::Creative,
        }
    }
}

/// Chart.js family chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Radar,
    Scatter,
    Doughnut,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Radar => "radar",
            Self::Scatter => "scatter",
            Self::Doughnut => "doughnut",
        }
    }
}

/// Chart payload: engine, type, and a Chart.js-shaped config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default = "default_chart_engine")]
    pub chart_engine: String,
    pub chart_type: ChartType,
    pub config: ChartConfig,
}

fn default_chart_engine() -> String {
    "chartjs".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Mirrors `chart_type`; Chart.js expects it inside the config too.
    #[serde(rename = "type", default)]
    pub config_type: String,
    pub data: ChartData,
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    #[serde(default)]
    pub label: String,
    /// Numbers for most chart types, `{x, y}` points for scatter.
    pub data: Vec<Value>,
    #[serde(
        rename = "backgroundColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<Value>,
}

/// Node-link diagram payload shared by the network and flow kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    pub nodes: Vec<DiagramNode>,
    #[serde(default)]
    pub edges: Vec<DiagramEdge>,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "TB".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub position: NodePosition,
    pub data: NodeData,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramEdge {
    /// Filled with a generated id during normalization when the model
    /// omits one.
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Weighted node-link payload (timeline/advanced shapes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedGraphSpec {
    pub nodes: Vec<WeightedNode>,
    #[serde(default)]
    pub links: Vec<WeightedLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedNode {
    pub id: String,
    pub name: String,
    #[serde(default = "default_weight")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedLink {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub value: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Table payload: headers plus string rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Free-form fallback when no structured shape fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeSpec {
    #[serde(default = "default_creative_method")]
    pub method: String,
    pub description: String,
}

fn default_creative_method() -> String {
    "creative".to_string()
}

/// One successfully rendered visualization, correlated with its request
/// by tag id. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedVisualization {
    /// Foreign key into `VisualizationRequest.tag_id`.
    pub tag_id: String,

    pub kind: VisualizationKind,

    pub payload: VisualizationPayload,

    /// One-sentence human-readable takeaway; may be empty.
    #[serde(default)]
    pub insight: String,

    /// Retained for traceability and for the assembled document's
    /// contextual anchor text.
    pub original_request: VisualizationRequest,
}
