//! Best-effort recovery of the comparison object from free model text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Score reported when the model reply held no JSON object.
pub const SCORE_UNAVAILABLE: &str = "N/A";

/// Characters of the raw reply kept as the fallback status summary.
pub const STATUS_SUMMARY_CHARS: usize = 500;

/// Message of the error object returned for undecodable JSON.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse AI response";

static GREEDY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static pattern compiles"));

/// Strategy used to locate the JSON object inside the reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BraceMatch {
    /// From the first `{` to the last `}` of the whole reply.
    #[default]
    Greedy,
    /// The first balanced `{...}` region, ignoring braces inside strings.
    Balanced,
}

/// The eight-field comparison shape requested in the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub wireframe_elements: Vec<String>,
    pub webpage_elements: Vec<String>,
    pub implemented_elements: Vec<String>,
    pub missing_elements: Vec<String>,
    pub additional_elements: Vec<String>,
    pub layout_differences: Vec<String>,
    pub overall_similarity_score: String,
    pub implementation_status: String,
}

impl ComparisonReport {
    /// Report with no detected elements, summarising the reply text instead.
    pub fn summary(reply: &str) -> Self {
        Self {
            wireframe_elements: Vec::new(),
            webpage_elements: Vec::new(),
            implemented_elements: Vec::new(),
            missing_elements: Vec::new(),
            additional_elements: Vec::new(),
            layout_differences: Vec::new(),
            overall_similarity_score: SCORE_UNAVAILABLE.to_string(),
            implementation_status: truncate_summary(reply),
        }
    }
}

/// Outcome of the extraction, serialized as the `comparison_results` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComparisonResult {
    /// The object decoded from the reply, relayed as the model wrote it.
    Parsed(Map<String, Value>),
    /// No object found in the reply.
    Summary(ComparisonReport),
    /// An object-like region was found but is not valid JSON.
    Unparsed { error: String, raw_response: String },
}

impl ComparisonResult {
    /// Typed view of the result when it carries the eight-field shape.
    pub fn report(&self) -> Option<ComparisonReport> {
        match self {
            ComparisonResult::Parsed(map) => {
                serde_json::from_value(Value::Object(map.clone())).ok()
            }
            ComparisonResult::Summary(report) => Some(report.clone()),
            ComparisonResult::Unparsed { .. } => None,
        }
    }
}

/// Extracts the comparison from `reply`. Never fails.
pub fn extract_comparison(reply: &str, brace_match: BraceMatch) -> ComparisonResult {
    let candidate = match brace_match {
        BraceMatch::Greedy => greedy_candidate(reply),
        BraceMatch::Balanced => balanced_candidate(reply),
    };

    let Some(candidate) = candidate else {
        log::warn!("No JSON object in model reply, summarising text");
        return ComparisonResult::Summary(ComparisonReport::summary(reply));
    };

    match serde_json::from_str::<Map<String, Value>>(candidate) {
        Ok(object) => ComparisonResult::Parsed(object),
        Err(e) => {
            log::warn!("Model reply holds malformed JSON: {e}");
            ComparisonResult::Unparsed {
                error: PARSE_FAILURE_MESSAGE.to_string(),
                raw_response: reply.to_string(),
            }
        }
    }
}

fn greedy_candidate(text: &str) -> Option<&str> {
    GREEDY_OBJECT.find(text).map(|m| m.as_str())
}

fn balanced_candidate(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate_summary(text: &str) -> String {
    if text.chars().count() > STATUS_SUMMARY_CHARS {
        let mut summary: String = text.chars().take(STATUS_SUMMARY_CHARS).collect();
        summary.push_str("...");
        summary
    } else {
        text.to_string()
    }
}
