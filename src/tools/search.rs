//! Web search tool
//!
//! Returns three canned but query-specific results. Swapping in a real
//! search API only means replacing `results_for`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{JsonMap, ToolError};
use crate::tools::{parse_input, require_non_empty, to_output, Tool};

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
}

/// One search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Serialize)]
struct SearchOutput {
    results: Vec<SearchResult>,
    query: String,
}

/// Deterministic search tool
#[derive(Debug, Clone, Default)]
pub struct WebSearchTool;

impl WebSearchTool {
    /// Create a new search tool
    pub fn new() -> Self {
        Self
    }

    /// Build the canned results for a query
    pub fn results_for(query: &str) -> Vec<SearchResult> {
        let slug = query.to_lowercase().replace(' ', "-");

        vec![
            SearchResult {
                title: format!("Understanding {}: A Comprehensive Guide", query),
                url: format!("https://example.com/guide/{}", slug),
                snippet: format!(
                    "Learn everything about {} with this detailed guide covering \
                     best practices, examples, and common pitfalls.",
                    query
                ),
            },
            SearchResult {
                title: format!("{} - Official Documentation", query),
                url: format!("https://docs.example.com/{}", slug),
                snippet: format!(
                    "Official documentation for {}. Includes API reference, \
                     tutorials, and migration guides.",
                    query
                ),
            },
            SearchResult {
                title: format!("Top 10 Tips for {}", query),
                url: format!("https://blog.example.com/tips/{}", slug),
                snippet: format!(
                    "Discover the top 10 expert tips for mastering {}. \
                     From beginners to advanced users.",
                    query
                ),
            },
        ]
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Searches the web for information. \
         Input: {'query': 'search terms'}. \
         Returns: list of relevant web results with titles, URLs, and snippets."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Search query string"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: &JsonMap) -> Result<JsonMap, ToolError> {
        let input: SearchInput = parse_input(input)?;
        require_non_empty("query", &input.query)?;

        to_output(&SearchOutput {
            results: Self::results_for(&input.query),
            query: input.query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_results_are_query_specific() {
        let results = WebSearchTool::results_for("Rust async");
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].url, "https://example.com/guide/rust-async");
        assert!(results.iter().all(|r| r.title.contains("Rust async")));
    }

    #[tokio::test]
    async fn test_execute() {
        let mut input = JsonMap::new();
        input.insert("query".to_string(), json!("tokio"));

        let output = WebSearchTool::new().execute(&input).await.unwrap();
        assert_eq!(output["query"], json!("tokio"));
        assert_eq!(output["results"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_wrong_type_is_invalid_input() {
        let mut input = JsonMap::new();
        input.insert("query".to_string(), json!(42));

        let err = WebSearchTool::new().execute(&input).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
