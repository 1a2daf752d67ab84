//! Deterministic keyword planner
//!
//! Cues are checked in a fixed order: governance, arithmetic, search, then a
//! direct answer. Overlapping vocabularies ("add note" vs "add 2 + 2") are
//! resolved by that order alone.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use crate::agent::planner::Planner;
use crate::agent::state::ExecutionStep;
use crate::core::{Decision, JsonMap, Result, ToolDefinition};

const GOVERNANCE_KEYWORDS: &[&str] = &[
    "proposal",
    "governance",
    "note",
    "prop-",
    "add note",
    "record",
    "document decision",
];

const MATH_KEYWORDS: &[&str] = &[
    "calculate",
    "compute",
    "solve",
    "evaluate",
    "sum",
    "product",
    "result of",
    "multiply",
    "divide",
    "add",
    "subtract",
];

const SEARCH_KEYWORDS: &[&str] = &[
    "search",
    "find",
    "look up",
    "information about",
    "who is",
    "where is",
    "latest",
    "current",
    "research",
    "discover",
    "learn about",
];

const DEFAULT_NOTE: &str = "Note added via agent";

static PROPOSAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PROP-[\w-]+").expect("valid regex"));
static NOTE_AFTER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)note[:\s]+"?([^"\n]+)"?"#).expect("valid regex"));
static BINARY_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[+\-*/]\s*\d+").expect("valid regex"));
static POWER_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*\*\*\s*\d+").expect("valid regex"));
static WHAT_IS_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"what\s+is\s+[\d\s+\-*/().]+").expect("valid regex"));
static MATH_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(calculate|compute|what is|evaluate|solve|result of|the)\b")
        .expect("valid regex")
});
static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d\s+\-*/().]+").expect("valid regex"));
static SEARCH_LEAD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(search for|find|look up|information about|who is|where is|what is|research|learn about)\b",
    )
    .expect("valid regex")
});

/// Keyword-driven planner that needs no model
///
/// Only the goal text is inspected; the offered tools and the history are
/// ignored, so the same goal always produces the same decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedPlanner;

impl RuleBasedPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Pure decision function behind [`Planner::decide`]
    pub fn plan(goal: &str) -> Decision {
        let lower = goal.to_lowercase();

        if is_governance(&lower) {
            let (proposal_id, note) = extract_governance(goal);
            return Decision::use_tool(
                "governance_note",
                object(json!({ "proposal_id": proposal_id, "note": note })),
            );
        }

        if is_math(&lower) {
            return Decision::use_tool(
                "math",
                object(json!({ "expression": extract_expression(goal) })),
            );
        }

        if is_search(&lower) {
            return Decision::use_tool(
                "web_search",
                object(json!({ "query": extract_query(goal) })),
            );
        }

        Decision::answer(format!(
            "I understand your query about '{}'. No tool is needed to answer it directly.",
            goal
        ))
    }
}

#[async_trait]
impl Planner for RuleBasedPlanner {
    async fn decide(
        &self,
        goal: &str,
        _context: Option<&str>,
        _tools: &[ToolDefinition],
        _history: &[ExecutionStep],
    ) -> Result<Decision> {
        Ok(Self::plan(goal))
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}

fn object(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn is_governance(lower: &str) -> bool {
    contains_any(lower, GOVERNANCE_KEYWORDS)
}

fn is_math(lower: &str) -> bool {
    if !lower.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    BINARY_OPERATOR.is_match(lower)
        || POWER_OPERATOR.is_match(lower)
        || WHAT_IS_NUMERIC.is_match(lower)
        || contains_any(lower, MATH_KEYWORDS)
}

fn is_search(lower: &str) -> bool {
    contains_any(lower, SEARCH_KEYWORDS)
}

fn trim_sentence(text: &str) -> &str {
    text.trim_matches(|c: char| c == '?' || c == '.' || c == ' ')
}

fn extract_governance(goal: &str) -> (String, String) {
    let proposal_id = PROPOSAL_ID
        .find(goal)
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let after_id = Regex::new(&format!(r"(?i){}[:\s]+([^\n]+)", regex::escape(&proposal_id)))
        .ok()
        .and_then(|re| re.captures(goal))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());

    let note = after_id
        .or_else(|| {
            NOTE_AFTER_LABEL
                .captures(goal)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .unwrap_or_else(|| DEFAULT_NOTE.to_string());

    let note = trim_sentence(&note).to_string();
    (proposal_id, note)
}

fn extract_expression(goal: &str) -> String {
    let cleaned = MATH_FILLER.replace_all(goal, "");
    let cleaned = cleaned.trim();

    NUMERIC_RUN
        .find_iter(cleaned)
        .map(|m| {
            m.as_str()
                .trim_matches(|c: char| matches!(c, '+' | '-' | '*' | '/') || c.is_whitespace())
        })
        // Blank runs between words are skipped on purpose; the first run with digits wins.
        .find(|expr| !expr.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| trim_sentence(cleaned).to_string())
}

fn extract_query(goal: &str) -> String {
    let cleaned = SEARCH_LEAD_IN.replace_all(goal, "");
    let query = trim_sentence(cleaned.trim());
    if query.is_empty() {
        goal.to_string()
    } else {
        query.to_string()
    }
}
