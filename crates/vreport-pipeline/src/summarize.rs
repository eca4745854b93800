//! Summarization stage: transcript → long-form narrative report.
//!
//! Long transcripts are pre-reduced with an importance-weighted sentence
//! selection before the model call, so that both the edges and the
//! keyword-heavy middle of the video survive the context limit.

use tracing::{info, warn};

use crate::captions::is_caption_failure;
use crate::model::GenerativeModel;

/// Transcripts longer than this (in characters) are pre-reduced before
/// the model call.
pub const REDUCTION_THRESHOLD: usize = 6000;

/// Replies shorter than this trigger one elaboration follow-up.
const MIN_NARRATIVE_CHARS: usize = 500;

const HEAD_SENTENCES: usize = 10;
const TAIL_SENTENCES: usize = 10;
const TOP_SCORED_SENTENCES: usize = 30;
const SAMPLED_SENTENCES: usize = 20;
const ELLIPSIS: &str = "...";

/// Returned without calling the model when the transcript carries the
/// caption failure sentinel.
pub const NARRATIVE_UNAVAILABLE: &str = "The video could not be analyzed. \
The video has no captions available or caption extraction failed upstream.";

/// Prefix of the narrative returned when the summarization call itself
/// fails.
pub const NARRATIVE_FAILURE_PREFIX: &str = "Report generation failed:";

/// True when a narrative is one of this stage's failure messages rather
/// than model output. Later stages skip such narratives the same way
/// they skip sentinel transcripts.
pub fn is_failure_narrative(narrative: &str) -> bool {
    narrative == NARRATIVE_UNAVAILABLE || narrative.starts_with(NARRATIVE_FAILURE_PREFIX)
}

/// Signal words weighted as importance markers during pre-reduction:
/// ordinals, comparison, definition, result, caution, recommendation,
/// and statistic vocabulary.
const IMPORTANCE_KEYWORDS: &[&str] = &[
    "important", "key", "essential", "critical", "main", "core",
    "first", "second", "third", "finally", "last", "also", "therefore", "thus",
    "advantage", "disadvantage", "benefit", "feature", "method", "reason",
    "result", "cause", "effect", "conclusion", "summary",
    "note", "caution", "warning", "tip", "recommend", "suggest",
    "data", "statistic", "percent", "number", "increase", "decrease",
    "compare", "comparison", "analysis",
    "definition", "concept", "principle", "theory", "rule",
];

const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a professional content analyst. Convert the provided video transcript \
into a complete written report with the following structure:

1. A title for the report.
2. A top summary: one paragraph of three to four lines that compresses the \
whole video so it can be understood without reading further.
3. An overview: an analytic introduction covering the core message, the \
background context, and why the content matters.
4. Main content analysis: at least three sub-sections, each with a short \
heading, a one-line summary, and a detailed explanation grounded in the \
transcript.
5. Key insights: the main takeaways, including any concrete figures or \
comparisons mentioned.
6. A conclusion with practical recommendations where applicable.

Rules: write in complete, formal prose; convert spoken language into written \
language; include every concrete number, statistic, or comparison the \
transcript contains; do not invent content that is not in the transcript. \
Separate paragraphs with blank lines.";

const ELABORATION_SYSTEM_PROMPT: &str = "\
The previous report draft was too brief. Rewrite it as a more detailed and \
comprehensive analysis, covering all important content from the original \
transcript. Keep the same report structure and do not invent content.";

/// Produce the narrative report for a transcript.
///
/// Total over its input: model failures are folded into a failure-message
/// narrative, never propagated.
pub async fn summarize<M: GenerativeModel>(model: &M, transcript: &str) -> String {
    if is_caption_failure(transcript) {
        warn!("No usable transcript, skipping summarization");
        return NARRATIVE_UNAVAILABLE.to_string();
    }

    let processed = reduce_transcript(transcript);

    let user = format!(
        "Analyze the following video transcript and write the full report:\n\n{}",
        processed
    );

    let draft = match model.generate(SUMMARY_SYSTEM_PROMPT, &user).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "Summarization call failed");
            return format!("{} {}", NARRATIVE_FAILURE_PREFIX, e);
        }
    };

    if draft.chars().count() >= MIN_NARRATIVE_CHARS {
        info!(chars = draft.chars().count(), "Narrative generated");
        return draft;
    }

    warn!(
        chars = draft.chars().count(),
        "Narrative below quality threshold, requesting elaboration"
    );

    let followup = format!(
        "Original transcript:\n{}\n\nPrevious draft:\n{}\n\nWrite the more detailed report now.",
        processed, draft
    );

    match model.generate(ELABORATION_SYSTEM_PROMPT, &followup).await {
        Ok(second) => second.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "Elaboration call failed, keeping short draft");
            draft
        }
    }
}

/// Importance-weighted sentence selection for long transcripts.
///
/// Keeps the first and last sentences verbatim, the top-scored middle by
/// keyword weight, and a uniform sample of the unscored remainder, so the
/// reduction is neither purely positional nor purely frequency-based.
pub fn reduce_transcript(transcript: &str) -> String {
    if transcript.chars().count() <= REDUCTION_THRESHOLD {
        return transcript.to_string();
    }

    let flattened = transcript.replace('\n', " ");
    let sentences: Vec<&str> = flattened
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    info!(
        original_chars = transcript.chars().count(),
        sentences = sentences.len(),
        "Transcript too long, applying pre-reduction"
    );

    let scores: Vec<usize> = sentences.iter().map(|s| importance_score(s)).collect();

    let mut selected: Vec<&str> = Vec::new();

    // Head
    selected.extend(sentences.iter().take(HEAD_SENTENCES));

    // Keyword-weighted middle, score descending, stable for ties
    let mut scored: Vec<(usize, usize)> = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score > 0)
        .map(|(i, score)| (i, *score))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    selected.extend(
        scored
            .iter()
            .take(TOP_SCORED_SENTENCES)
            .map(|(i, _)| sentences[*i]),
    );

    // Uniform sample of the unscored remainder
    let regular: Vec<&str> = sentences
        .iter()
        .zip(scores.iter())
        .filter(|(_, score)| **score == 0)
        .map(|(s, _)| *s)
        .collect();
    let step = (regular.len() / SAMPLED_SENTENCES).max(1);
    selected.extend(regular.iter().step_by(step).take(SAMPLED_SENTENCES));

    // Tail
    let tail_start = sentences.len().saturating_sub(TAIL_SENTENCES);
    selected.extend(sentences[tail_start..].iter());

    // De-duplicate preserving first-seen order
    let mut seen = std::collections::HashSet::new();
    let deduped: Vec<&str> = selected
        .into_iter()
        .filter(|s| seen.insert(*s))
        .collect();

    let mut processed = deduped.join(". ");

    if processed.chars().count() > REDUCTION_THRESHOLD {
        processed = processed.chars().take(REDUCTION_THRESHOLD).collect();
        processed.push_str(ELLIPSIS);
    }

    info!(
        reduced_chars = processed.chars().count(),
        "Pre-reduction complete"
    );
    processed
}

fn importance_score(sentence: &str) -> usize {
    let lower = sentence.to_lowercase();
    IMPORTANCE_KEYWORDS
        .iter()
        .map(|keyword| lower.matches(keyword).count())
        .sum()
}
