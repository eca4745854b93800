//! Final document assembly.
//!
//! Walks the tagged narrative once, splitting at `[VIZ_<id>]` markers
//! and splicing rendered visualizations in at their marker positions.
//! Total over its inputs: markers with no rendered counterpart are
//! consumed and logged, never propagated as errors.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use vreport_models::{AssemblyStats, FinalDocument, RenderedVisualization, Section};

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[VIZ_(\d+)\]").unwrap());

/// Interleave narrative text with rendered visualizations at their
/// marker positions.
pub fn assemble(
    source_url: &str,
    tagged_narrative: &str,
    rendered: &[RenderedVisualization],
) -> FinalDocument {
    let by_tag: HashMap<&str, &RenderedVisualization> = rendered
        .iter()
        .map(|viz| (viz.tag_id.as_str(), viz))
        .collect();

    let mut sections: Vec<Section> = Vec::new();
    let mut tags_found = 0u32;
    let mut inserted = 0u32;
    let mut cursor = 0usize;

    for captures in TAG_PATTERN.captures_iter(tagged_narrative) {
        let marker = captures.get(0).unwrap();
        let tag_id = captures.get(1).unwrap().as_str();
        tags_found += 1;

        push_text(&mut sections, &tagged_narrative[cursor..marker.start()]);

        match by_tag.get(tag_id) {
            Some(viz) => {
                sections.push(Section::Visualization {
                    tag_id: viz.tag_id.clone(),
                    payload: viz.payload.clone(),
                    insight: viz.insight.clone(),
                    original_request: viz.original_request.clone(),
                    anchor_text: viz.original_request.related_content.clone(),
                });
                inserted += 1;
            }
            None => {
                warn!(tag_id, "No rendered visualization for marker, dropping it");
            }
        }

        cursor = marker.end();
    }

    push_text(&mut sections, &tagged_narrative[cursor..]);

    let stats = AssemblyStats::new(tags_found, inserted);
    info!(
        tags_found,
        inserted,
        sections = sections.len(),
        "Document assembled"
    );

    FinalDocument::assembled(source_url, sections, stats)
}

fn push_text(sections: &mut Vec<Section>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        sections.push(Section::Text {
            content: trimmed.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vreport_models::{
        CreativeSpec, TableSpec, VisualizationPayload, VisualizationPurpose, VisualizationRequest,
    };

    fn rendered(tag_id: &str, excerpt: &str) -> RenderedVisualization {
        let payload = VisualizationPayload::Table(TableSpec {
            headers: vec!["Metric".into(), "Value".into()],
            rows: vec![vec!["Growth".into(), "10%".into()]],
        });
        RenderedVisualization {
            tag_id: tag_id.to_string(),
            kind: payload.kind(),
            payload,
            insight: "Growth is positive.".to_string(),
            original_request: VisualizationRequest::new(
                tag_id,
                VisualizationPurpose::Data,
                "growth figures",
                excerpt,
            ),
        }
    }

    #[test]
    fn test_untagged_narrative_is_single_text_section() {
        let doc = assemble("https://example.com/v", "Just prose, no markers.", &[]);

        assert!(doc.success);
        assert_eq!(doc.sections.len(), 1);
        assert!(doc.sections[0].is_text());
        assert_eq!(doc.stats.tags_found, 0);
        assert_eq!(doc.stats.visualizations_inserted, 0);
        assert_eq!(doc.stats.success_rate, "0/0");
    }

    #[test]
    fn test_marker_splits_text_and_inserts_visualization() {
        let tagged = "Intro para.\n\nSales rose 10% in Q1 and 20% in Q2.[VIZ_1]\n\nConclusion para.";
        let doc = assemble(
            "https://example.com/v",
            tagged,
            &[rendered("1", "Sales rose 10% in Q1 and 20% in Q2.")],
        );

        assert_eq!(doc.sections.len(), 3);
        match &doc.sections[0] {
            Section::Text { content } => {
                assert_eq!(content, "Intro para.\n\nSales rose 10% in Q1 and 20% in Q2.")
            }
            other => panic!("unexpected section: {:?}", other),
        }
        match &doc.sections[1] {
            Section::Visualization {
                tag_id,
                anchor_text,
                ..
            } => {
                assert_eq!(tag_id, "1");
                assert_eq!(anchor_text, "Sales rose 10% in Q1 and 20% in Q2.");
            }
            other => panic!("unexpected section: {:?}", other),
        }
        match &doc.sections[2] {
            Section::Text { content } => assert_eq!(content, "Conclusion para."),
            other => panic!("unexpected section: {:?}", other),
        }
        assert_eq!(doc.stats.success_rate, "1/1");
    }

    #[test]
    fn test_section_order_follows_marker_order() {
        let tagged = "A[VIZ_2]B[VIZ_1]C";
        let doc = assemble(
            "https://example.com/v",
            tagged,
            &[rendered("1", "x"), rendered("2", "y")],
        );

        let tag_ids: Vec<&str> = doc
            .sections
            .iter()
            .filter_map(|s| match s {
                Section::Visualization { tag_id, .. } => Some(tag_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tag_ids, vec!["2", "1"]);
    }

    #[test]
    fn test_unmatched_marker_is_consumed() {
        let tagged = "Before text.[VIZ_2]After text.";
        let doc = assemble("https://example.com/v", tagged, &[rendered("1", "x")]);

        assert_eq!(doc.sections.len(), 2);
        assert!(doc.sections.iter().all(Section::is_text));
        assert!(!doc
            .sections
            .iter()
            .any(|s| matches!(s, Section::Text { content } if content.contains("[VIZ_"))));
        assert_eq!(doc.stats.tags_found, 1);
        assert_eq!(doc.stats.visualizations_inserted, 0);
    }

    #[test]
    fn test_partial_render_coverage() {
        let tagged = "One.[VIZ_1]Two.[VIZ_2]Three.[VIZ_3]End.";
        let doc = assemble(
            "https://example.com/v",
            tagged,
            &[rendered("1", "a"), rendered("3", "c")],
        );

        assert_eq!(doc.stats.tags_found, 3);
        assert_eq!(doc.stats.visualizations_inserted, 2);
        assert_eq!(doc.stats.success_rate, "2/3");
        assert_eq!(doc.visualization_section_count(), 2);
        // The text around the dropped marker survives on both sides.
        assert!(doc.sections.iter().any(
            |s| matches!(s, Section::Text { content } if content == "Two.")
        ));
        assert!(doc.sections.iter().any(
            |s| matches!(s, Section::Text { content } if content == "Three.")
        ));
    }

    #[test]
    fn test_adjacent_markers_produce_adjacent_sections() {
        let tagged = "Lead.[VIZ_1][VIZ_2]";
        let extra = RenderedVisualization {
            payload: VisualizationPayload::Creative(CreativeSpec {
                method: "metaphor".into(),
                description: "A tree of ideas.".into(),
            }),
            ..rendered("2", "y")
        };
        let doc = assemble(
            "https://example.com/v",
            tagged,
            &[rendered("1", "x"), extra],
        );

        assert_eq!(doc.sections.len(), 3);
        assert!(doc.sections[0].is_text());
        assert!(doc.sections[1].is_visualization());
        assert!(doc.sections[2].is_visualization());
    }
}
