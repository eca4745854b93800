//! Visualization planning stage.
//!
//! One model call over the narrative proposes visualization candidates;
//! accepted candidates get sequential tag ids and a `[VIZ_<id>]` marker
//! anchored into the paragraph their description matches best. The
//! tagged narrative and the request list leave this stage together and
//! must stay consistent: every request's marker appears exactly once.

use serde::Deserialize;
use tracing::{info, warn};

use vreport_models::{LocationHint, VisualizationPurpose, VisualizationRequest};

use crate::json_extract::extract_json_object;
use crate::model::GenerativeModel;
use crate::summarize::is_failure_narrative;

/// Narratives shorter than this are not worth visualizing.
const MIN_NARRATIVE_CHARS: usize = 100;

/// Excerpts shorter than this give the renderer too little grounding.
const MIN_EXCERPT_CHARS: usize = 100;

/// How many leading description words participate in anchor scoring.
const ANCHOR_KEYWORDS: usize = 5;

const PLANNING_SYSTEM_PROMPT: &str = "\
You are a data visualization planner. Given a written report, identify the \
places where a visualization would genuinely help the reader, and describe \
each one.

Reply with a single JSON object of this exact shape:
{
  \"visualization_requests\": [
    {
      \"purpose\": one of \"comparison\", \"process\", \"overview\", \"detail\", \"data\", \"timeline\", \"structure\", \"concept\",
      \"description\": what the visualization should show,
      \"excerpt\": the report passage the visualization is grounded in, quoted verbatim,
      \"location_hint\": one of \"beginning\", \"middle\", \"end\"
    }
  ]
}

Rules: propose at most five visualizations; only propose one where the report \
contains enough concrete content to support it; the excerpt must be copied \
verbatim from the report and must be at least 100 characters long; reply with \
the JSON object only, no commentary.";

/// Result of the planning stage: the narrative with `[VIZ_<id>]` markers
/// inserted, plus one request per marker.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub tagged_narrative: String,
    pub requests: Vec<VisualizationRequest>,
}

impl PlanOutcome {
    fn untagged(narrative: &str) -> Self {
        Self {
            tagged_narrative: narrative.to_string(),
            requests: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlanResponse {
    #[serde(default)]
    visualization_requests: Vec<PlannedItem>,
}

/// One candidate straight out of the planner's JSON, before tag
/// assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannedItem {
    #[serde(default)]
    pub purpose: VisualizationPurpose,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub location_hint: LocationHint,
}

/// Plan visualizations for a narrative.
///
/// Total over its input: planning failure degrades to a text-only
/// outcome with the narrative untouched.
pub async fn plan<M: GenerativeModel>(model: &M, narrative: &str) -> PlanOutcome {
    if narrative.chars().count() < MIN_NARRATIVE_CHARS {
        info!(
            chars = narrative.chars().count(),
            "Narrative too short to visualize, skipping planning"
        );
        return PlanOutcome::untagged(narrative);
    }
    if is_failure_narrative(narrative) {
        warn!("Narrative is a failure message, skipping planning");
        return PlanOutcome::untagged(narrative);
    }

    let user = format!("Report:\n\n{}", narrative);

    let raw = match model.generate(PLANNING_SYSTEM_PROMPT, &user).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Planning call failed, continuing without visualizations");
            return PlanOutcome::untagged(narrative);
        }
    };

    let items = match parse_plan(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Planning output unusable, continuing without visualizations");
            return PlanOutcome::untagged(narrative);
        }
    };

    let accepted = validate_items(items, narrative);
    if accepted.is_empty() {
        info!("Planner proposed no usable visualizations");
        return PlanOutcome::untagged(narrative);
    }

    let outcome = apply_tags(narrative, accepted);
    info!(
        requests = outcome.requests.len(),
        "Planning complete"
    );
    outcome
}

fn parse_plan(raw: &str) -> crate::error::PipelineResult<Vec<PlannedItem>> {
    let value = extract_json_object(raw)?;
    let parsed: PlanResponse = serde_json::from_value(value).map_err(|e| {
        crate::error::PipelineError::contract(format!("planner output has wrong shape: {}", e))
    })?;
    Ok(parsed.visualization_requests)
}

/// Drop items with neither a description nor an excerpt, and items
/// whose excerpt is not a verbatim narrative span (the excerpt becomes
/// the renderer's factual grounding and the document's anchor text, so
/// an invented one cannot be trusted). A short excerpt only warns; the
/// length floor is asked of the model in the prompt.
fn validate_items(items: Vec<PlannedItem>, narrative: &str) -> Vec<PlannedItem> {
    items
        .into_iter()
        .filter(|item| {
            if item.description.is_empty() && item.excerpt.is_empty() {
                warn!("Dropping planned visualization with no description or excerpt");
                return false;
            }
            if !item.excerpt.is_empty() && !narrative.contains(&item.excerpt) {
                warn!("Dropping planned visualization: excerpt is not a verbatim narrative passage");
                return false;
            }
            if item.excerpt.chars().count() < MIN_EXCERPT_CHARS {
                warn!(
                    chars = item.excerpt.chars().count(),
                    "Planned excerpt shorter than requested"
                );
            }
            true
        })
        .collect()
}

/// Assign sequential tag ids and insert each `[VIZ_<id>]` marker at the
/// end of its anchor paragraph.
pub fn apply_tags(narrative: &str, items: Vec<PlannedItem>) -> PlanOutcome {
    let paragraphs = paragraph_spans(narrative);

    // (byte offset of insertion, item index)
    let mut insertions: Vec<(usize, usize)> = Vec::with_capacity(items.len());
    let mut requests: Vec<VisualizationRequest> = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let tag_id = (index + 1).to_string();
        let paragraph =
            anchor_paragraph(narrative, &paragraphs, &item.description, item.location_hint);
        insertions.push((paragraphs[paragraph].1, index));

        requests.push(
            VisualizationRequest::new(&tag_id, item.purpose, &item.description, &item.excerpt)
                .with_location_hint(item.location_hint),
        );
    }

    // Insert right to left so earlier offsets stay valid. For equal
    // offsets the lower item index must end up first in the text, so it
    // is inserted last at that offset.
    let mut tagged = narrative.to_string();
    insertions.sort_by(|a, b| b.cmp(a));
    for (offset, index) in insertions {
        tagged.insert_str(offset, &format!("[VIZ_{}]", index + 1));
    }

    PlanOutcome {
        tagged_narrative: tagged,
        requests,
    }
}

/// Byte spans `(start, end)` of blank-line separated paragraphs,
/// excluding whitespace-only ones.
fn paragraph_spans(narrative: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for chunk in narrative.split("\n\n") {
        if !chunk.trim().is_empty() {
            spans.push((offset, offset + chunk.len()));
        }
        offset += chunk.len() + 2;
    }
    if spans.is_empty() {
        spans.push((0, narrative.len()));
    }
    spans
}

/// Pick the paragraph whose text best matches the description: one
/// point per matched leading keyword, plus two when the paragraph's
/// tertile matches the model's location hint. Ties keep the earliest
/// paragraph.
fn anchor_paragraph(
    narrative: &str,
    paragraphs: &[(usize, usize)],
    description: &str,
    hint: LocationHint,
) -> usize {
    let keywords: Vec<String> = description
        .to_lowercase()
        .split_whitespace()
        .take(ANCHOR_KEYWORDS)
        .map(str::to_string)
        .collect();

    let hint_tertile = match hint {
        LocationHint::Beginning => 0,
        LocationHint::Middle => 1,
        LocationHint::End => 2,
    };

    let mut best = 0;
    let mut best_score = 0usize;

    for (i, (start, end)) in paragraphs.iter().enumerate() {
        let text = narrative[*start..*end].to_lowercase();
        let mut score = keywords.iter().filter(|k| text.contains(k.as_str())).count();
        if i * 3 / paragraphs.len() == hint_tertile {
            score += 2;
        }
        if score > best_score {
            best_score = score;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, PipelineResult};
    use std::future::Future;

    struct FixedModel {
        reply: PipelineResult<String>,
    }

    impl GenerativeModel for FixedModel {
        fn generate(
            &self,
            _system: &str,
            _user: &str,
        ) -> impl Future<Output = PipelineResult<String>> + Send {
            let reply = self.reply.clone();
            async move { reply }
        }
    }

    fn narrative_fixture() -> String {
        [
            "This report reviews quarterly performance across the product line and sets the stage for the detailed figures below.",
            "Sales rose 10% in Q1 and 20% in Q2, with the growth concentrated in the entry-level segment according to the transcript.",
            "In conclusion, the trajectory suggests continued growth if the pricing strategy holds through the rest of the year.",
        ]
        .join("\n\n")
    }

    fn item(description: &str, excerpt: &str) -> PlannedItem {
        PlannedItem {
            purpose: VisualizationPurpose::Data,
            description: description.to_string(),
            excerpt: excerpt.to_string(),
            location_hint: LocationHint::Middle,
        }
    }

    #[derive(Default)]
    struct CountingModel {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl GenerativeModel for CountingModel {
        fn generate(
            &self,
            _system: &str,
            _user: &str,
        ) -> impl Future<Output = PipelineResult<String>> + Send {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move { Ok("{\"visualization_requests\": []}".to_string()) }
        }
    }

    #[tokio::test]
    async fn test_failure_narrative_never_reaches_the_model() {
        use crate::summarize::{NARRATIVE_FAILURE_PREFIX, NARRATIVE_UNAVAILABLE};

        let generation_failure = format!(
            "{} model endpoint returned 500 after every retry attempt was \
             exhausted while generating the report",
            NARRATIVE_FAILURE_PREFIX
        );

        for narrative in [NARRATIVE_UNAVAILABLE.to_string(), generation_failure] {
            // Long enough that the length floor alone would not skip it.
            assert!(narrative.chars().count() >= MIN_NARRATIVE_CHARS);

            let model = CountingModel::default();
            let outcome = plan(&model, &narrative).await;

            assert_eq!(outcome.tagged_narrative, narrative);
            assert!(outcome.requests.is_empty());
            assert_eq!(model.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_short_narrative_skips_planning() {
        let model = FixedModel {
            reply: Err(PipelineError::fatal("must not be called")),
        };
        let outcome = plan(&model, "Too short.").await;

        assert_eq!(outcome.tagged_narrative, "Too short.");
        assert!(outcome.requests.is_empty());
    }

    #[tokio::test]
    async fn test_unusable_plan_degrades_to_text_only() {
        let narrative = narrative_fixture();
        let model = FixedModel {
            reply: Ok("I could not find anything to visualize.".to_string()),
        };
        let outcome = plan(&model, &narrative).await;

        assert_eq!(outcome.tagged_narrative, narrative);
        assert!(outcome.requests.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_text_only() {
        let narrative = narrative_fixture();
        let model = FixedModel {
            reply: Err(PipelineError::transport("unreachable")),
        };
        let outcome = plan(&model, &narrative).await;

        assert_eq!(outcome.tagged_narrative, narrative);
        assert!(outcome.requests.is_empty());
    }

    #[tokio::test]
    async fn test_planned_items_get_sequential_unique_tags() {
        let narrative = narrative_fixture();
        let reply = serde_json::json!({
            "visualization_requests": [
                {
                    "purpose": "data",
                    "description": "sales growth by quarter",
                    "excerpt": "Sales rose 10% in Q1 and 20% in Q2, with the growth concentrated in the entry-level segment according to the transcript.",
                    "location_hint": "middle"
                },
                {
                    "purpose": "overview",
                    "description": "report structure overview",
                    "excerpt": "This report reviews quarterly performance across the product line and sets the stage for the detailed figures below.",
                    "location_hint": "beginning"
                }
            ]
        });
        let model = FixedModel {
            reply: Ok(reply.to_string()),
        };
        let outcome = plan(&model, &narrative).await;

        assert_eq!(outcome.requests.len(), 2);
        assert_eq!(outcome.requests[0].tag_id, "1");
        assert_eq!(outcome.requests[1].tag_id, "2");
        for request in &outcome.requests {
            let marker = format!("[VIZ_{}]", request.tag_id);
            assert_eq!(outcome.tagged_narrative.matches(&marker).count(), 1);
        }
        // Markers removed, the text is the original narrative.
        let stripped = outcome
            .tagged_narrative
            .replace("[VIZ_1]", "")
            .replace("[VIZ_2]", "");
        assert_eq!(stripped, narrative);
    }

    #[tokio::test]
    async fn test_invented_excerpt_dropped() {
        let narrative = narrative_fixture();
        let reply = serde_json::json!({
            "visualization_requests": [
                {
                    "purpose": "data",
                    "description": "fabricated figures",
                    "excerpt": "Revenue tripled overnight according to numbers that appear nowhere in the report text at all."
                },
                {
                    "purpose": "data",
                    "description": "sales growth by quarter",
                    "excerpt": "Sales rose 10% in Q1 and 20% in Q2, with the growth concentrated in the entry-level segment according to the transcript.",
                }
            ]
        });
        let model = FixedModel {
            reply: Ok(reply.to_string()),
        };
        let outcome = plan(&model, &narrative).await;

        assert_eq!(outcome.requests.len(), 1);
        assert_eq!(outcome.requests[0].tag_id, "1");
        assert_eq!(
            outcome.requests[0].content_description,
            "sales growth by quarter"
        );
        assert!(!outcome.tagged_narrative.contains("[VIZ_2]"));
    }

    #[tokio::test]
    async fn test_item_without_description_or_excerpt_dropped() {
        let narrative = narrative_fixture();
        let reply = serde_json::json!({
            "visualization_requests": [
                {"purpose": "data", "description": "", "excerpt": ""},
                {
                    "purpose": "data",
                    "description": "sales growth by quarter",
                    "excerpt": "Sales rose 10% in Q1 and 20% in Q2, with the growth concentrated in the entry-level segment according to the transcript.",
                }
            ]
        });
        let model = FixedModel {
            reply: Ok(reply.to_string()),
        };
        let outcome = plan(&model, &narrative).await;

        assert_eq!(outcome.requests.len(), 1);
        assert_eq!(outcome.requests[0].tag_id, "1");
    }

    #[test]
    fn test_marker_lands_at_end_of_matching_paragraph() {
        let narrative = "Intro para.\n\nSales rose 10% in Q1 and 20% in Q2.\n\nConclusion para.";
        let outcome = apply_tags(
            narrative,
            vec![item("sales rose by quarter", "Sales rose 10% in Q1 and 20% in Q2.")],
        );

        assert_eq!(
            outcome.tagged_narrative,
            "Intro para.\n\nSales rose 10% in Q1 and 20% in Q2.[VIZ_1]\n\nConclusion para."
        );
    }

    #[test]
    fn test_unmatched_description_follows_location_hint() {
        let narrative = "Alpha text.\n\nBeta text.";
        let outcome = apply_tags(narrative, vec![item("zeppelin cargo manifest", "")]);

        // No keyword overlap anywhere; the middle hint's tertile bonus
        // decides.
        assert_eq!(outcome.tagged_narrative, "Alpha text.\n\nBeta text.[VIZ_1]");
    }

    #[test]
    fn test_beginning_hint_biases_toward_first_paragraph() {
        let narrative = "Alpha text.\n\nBeta text.\n\nGamma text.";
        let mut planned = item("zeppelin cargo manifest", "");
        planned.location_hint = LocationHint::Beginning;
        let outcome = apply_tags(narrative, vec![planned]);

        assert_eq!(
            outcome.tagged_narrative,
            "Alpha text.[VIZ_1]\n\nBeta text.\n\nGamma text."
        );
    }

    #[test]
    fn test_shared_paragraph_keeps_tag_order() {
        let narrative = "Only paragraph mentioning sales and growth together.";
        let outcome = apply_tags(
            narrative,
            vec![item("sales figures", ""), item("growth figures", "")],
        );

        assert_eq!(
            outcome.tagged_narrative,
            "Only paragraph mentioning sales and growth together.[VIZ_1][VIZ_2]"
        );
    }
}
