//! Visualization rendering stage.
//!
//! Each planned request becomes one model call rendered concurrently up
//! to a parallelism cap. A failed render drops that one visualization;
//! it never cancels siblings or fails the stage.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use vreport_models::{
    ChartSpec, CreativeSpec, DiagramSpec, RenderedVisualization, TableSpec, VisualizationPayload,
    VisualizationRequest, WeightedGraphSpec,
};

use crate::error::{PipelineError, PipelineResult};
use crate::json_extract::extract_json_object;
use crate::model::GenerativeModel;

const RENDER_SYSTEM_PROMPT: &str = "\
You are a data visualization generator. Produce one visualization as a single \
JSON object, choosing the shape that fits the request best.

Supported shapes, selected by the top-level \"type\" field:

- \"chart\": {\"type\": \"chart\", \"chart_type\": one of \"bar\", \"line\", \"pie\", \"radar\", \"scatter\", \"doughnut\", \"config\": {\"data\": {\"labels\": [...], \"datasets\": [{\"label\": ..., \"data\": [...]}]}, \"options\": {...}}}
- \"network\" or \"flow\": {\"type\": ..., \"nodes\": [{\"id\": ..., \"data\": {\"label\": ...}}], \"edges\": [{\"source\": ..., \"target\": ...}], \"direction\": \"TB\" or \"LR\"}
- \"advanced\" or \"timeline\": {\"type\": ..., \"nodes\": [{\"id\": ..., \"name\": ..., \"value\": number}], \"links\": [{\"source\": ..., \"target\": ..., \"value\": number}]}
- \"table\": {\"type\": \"table\", \"headers\": [...], \"rows\": [[...], ...]}
- \"creative\": {\"type\": \"creative\", \"method\": ..., \"description\": ...}

Also include an \"insight\" field: one sentence on what the visualization \
shows. Ground every value in the provided content; never invent numbers. \
Reply with the JSON object only.";

/// Render all planned visualizations, at most `max_parallel` at a time.
///
/// Returns only the successes; failures are logged and dropped.
pub async fn render_all<M: GenerativeModel>(
    model: &M,
    requests: &[VisualizationRequest],
    transcript: &str,
    max_parallel: usize,
) -> Vec<RenderedVisualization> {
    if requests.is_empty() {
        return Vec::new();
    }

    let total = requests.len();
    info!(total, max_parallel, "Rendering visualizations");

    let rendered: Vec<RenderedVisualization> = stream::iter(requests)
        .map(|request| async move {
            match render_one(model, request, transcript).await {
                Ok(viz) => Some(viz),
                Err(e) => {
                    warn!(tag_id = %request.tag_id, error = %e, "Visualization render failed");
                    None
                }
            }
        })
        .buffer_unordered(max_parallel.max(1))
        .filter_map(|outcome| async move { outcome })
        .collect()
        .await;

    info!(
        rendered = rendered.len(),
        failed = total - rendered.len(),
        "Rendering complete"
    );
    rendered
}

async fn render_one<M: GenerativeModel>(
    model: &M,
    request: &VisualizationRequest,
    transcript: &str,
) -> PipelineResult<RenderedVisualization> {
    let user = format!(
        "Purpose: {}\nWhat to show: {}\nGrounding passage:\n{}\n\nTranscript context:\n{}\n\n\
         Use only the grounding passage and transcript context above; do not invent data.",
        request.purpose.as_str(),
        request.content_description,
        request.related_content,
        transcript
    );

    let raw = model.generate(RENDER_SYSTEM_PROMPT, &user).await?;
    let value = extract_json_object(&raw)?;
    normalize(request, value)
}

/// Validate the raw model object against its declared shape and convert
/// it into a typed payload.
pub fn normalize(
    request: &VisualizationRequest,
    value: Value,
) -> PipelineResult<RenderedVisualization> {
    let insight = value
        .get("insight")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let declared = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let payload = match declared.as_str() {
        "chart" => {
            let spec: ChartSpec = from_shape(value)?;
            if spec.config.data.labels.is_empty() {
                return Err(PipelineError::validation("chart has no labels"));
            }
            if spec.config.data.datasets.is_empty() {
                return Err(PipelineError::validation("chart has no datasets"));
            }
            VisualizationPayload::Chart(spec)
        }
        "network" | "flow" => {
            let mut spec: DiagramSpec = from_shape(value)?;
            if spec.nodes.is_empty() {
                return Err(PipelineError::validation("diagram has no nodes"));
            }
            for (i, edge) in spec.edges.iter_mut().enumerate() {
                if edge.id.is_empty() {
                    edge.id = format!("e{}", i + 1);
                }
            }
            if declared == "flow" {
                VisualizationPayload::Flow(spec)
            } else {
                VisualizationPayload::Network(spec)
            }
        }
        "advanced" | "timeline" => {
            let spec: WeightedGraphSpec = from_shape(value)?;
            if spec.nodes.is_empty() {
                return Err(PipelineError::validation("weighted graph has no nodes"));
            }
            VisualizationPayload::WeightedGraph(spec)
        }
        "table" => {
            let spec: TableSpec = from_shape(value)?;
            if spec.headers.is_empty() {
                return Err(PipelineError::validation("table has no headers"));
            }
            VisualizationPayload::Table(spec)
        }
        "creative" => {
            let spec: CreativeSpec = from_shape(value)?;
            if spec.description.is_empty() {
                return Err(PipelineError::validation("creative item has no description"));
            }
            VisualizationPayload::Creative(spec)
        }
        other => {
            // Unknown shape still renders if it reads as a creative item.
            let description = value
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if description.is_empty() {
                return Err(PipelineError::validation(format!(
                    "unsupported visualization type '{}'",
                    other
                )));
            }
            let method = value
                .get("method")
                .and_then(Value::as_str)
                .unwrap_or("creative")
                .to_string();
            warn!(tag_id = %request.tag_id, declared = other, "Coercing unknown shape to creative");
            VisualizationPayload::Creative(CreativeSpec {
                method,
                description,
            })
        }
    };

    Ok(RenderedVisualization {
        tag_id: request.tag_id.clone(),
        kind: payload.kind(),
        payload,
        insight,
        original_request: request.clone(),
    })
}

fn from_shape<T: serde::de::DeserializeOwned>(mut value: Value) -> PipelineResult<T> {
    // The envelope's "type" and "insight" fields are not payload fields.
    if let Some(obj) = value.as_object_mut() {
        obj.remove("type");
        obj.remove("insight");
    }
    serde_json::from_value(value)
        .map_err(|e| PipelineError::validation(format!("payload has wrong shape: {}", e)))
}
