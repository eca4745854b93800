//! JSON extraction from free-form model output.
//!
//! Models wrap JSON in prose and markdown fences; this is the one place
//! where that untyped text becomes typed pipeline data. Every model call
//! in the pipeline funnels through [`extract_json_object`].

use serde_json::Value;

use crate::error::{PipelineError, PipelineResult};

/// Locate and parse the single JSON object embedded in `raw`.
///
/// Leading/trailing markdown fence lines are stripped first, then the
/// slice between the first `{` and the last `}` (inclusive) is parsed.
/// Failure is a per-item contract error, never a pipeline-level one.
pub fn extract_json_object(raw: &str) -> PipelineResult<Value> {
    let stripped = strip_code_fences(raw);

    let start = stripped
        .find('{')
        .ok_or_else(|| PipelineError::contract("no opening brace in model output"))?;
    let end = stripped
        .rfind('}')
        .ok_or_else(|| PipelineError::contract("no closing brace in model output"))?;

    if end < start {
        return Err(PipelineError::contract(
            "closing brace precedes opening brace in model output",
        ));
    }

    serde_json::from_str(&stripped[start..=end])
        .map_err(|e| PipelineError::contract(format!("model output is not valid JSON: {}", e)))
}

/// Drop a leading and/or trailing line that consists of a markdown code
/// fence, tolerating surrounding blank lines.
fn strip_code_fences(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    if lines.first().is_some_and(|l| l.trim().starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim().starts_with("```")) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_json_object() {
        let value = extract_json_object(r#"{"a": 1, "b": [2, 3]}"#).unwrap();
        assert_eq!(value, json!({"a": 1, "b": [2, 3]}));
    }

    #[test]
    fn test_json_wrapped_in_prose() {
        let raw = "Here is the analysis you asked for:\n{\"topic\": \"sales\"}\nLet me know if you need more.";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value, json!({"topic": "sales"}));
    }

    #[test]
    fn test_json_in_markdown_fence() {
        let raw = "```json\n{\"ok\": true}\n```";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn test_fence_with_surrounding_blank_lines() {
        let raw = "\n\n```\n{\"x\": 5}\n```\n\n";
        let value = extract_json_object(raw).unwrap();
        assert_eq!(value, json!({"x": 5}));
    }

    #[test]
    fn test_prefix_and_suffix_without_braces() {
        // Property: prefix + "{" + json + "}" + suffix parses the same as
        // the json alone, when neither side adds unbalanced braces.
        let inner = json!({"labels": ["a", "b"], "n": 7});
        let raw = format!("Sure thing! {} -- done.", inner);
        assert_eq!(extract_json_object(&raw).unwrap(), inner);
    }

    #[test]
    fn test_no_braces_is_contract_error() {
        let err = extract_json_object("no json here at all").unwrap_err();
        assert!(matches!(err, PipelineError::Contract(_)));
    }

    #[test]
    fn test_unparseable_slice_is_contract_error() {
        let err = extract_json_object("{not valid json}").unwrap_err();
        assert!(matches!(err, PipelineError::Contract(_)));
    }

    #[test]
    fn test_reversed_braces_is_contract_error() {
        let err = extract_json_object("} weird {").unwrap_err();
        assert!(matches!(err, PipelineError::Contract(_)));
    }
}
