//! Shared data models for the vreport pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Pipeline state threaded through the stages
//! - Visualization requests and rendered visualization envelopes
//! - The assembled final document and its statistics
//! - Job bookkeeping (ids, stages, records)

pub mod document;
pub mod job;
pub mod request;
pub mod state;
pub mod visualization;

// Re-export common types
pub use document::{AssemblyStats, FinalDocument, Section};
pub use job::{JobId, JobRecord, PipelineStage};
pub use request::{LocationHint, VisualizationPurpose, VisualizationRequest};
pub use state::PipelineState;
pub use visualization::{
    ChartConfig, ChartData, ChartDataset, ChartSpec, ChartType, CreativeSpec, DiagramEdge,
    DiagramNode, DiagramSpec, NodePosition, RenderedVisualization, TableSpec, VisualizationKind,
    VisualizationPayload, WeightedGraphSpec, WeightedLink, WeightedNode,
};
