use crate::agent::ExecContext;
use crate::schema::{FieldType, ObjectSchema};
use crate::traits::TypedTool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Mock web search returning canned results, no network.
pub struct SearchTool;

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub results: Vec<SearchResult>,
}

const DEFAULT_MAX_RESULTS: usize = 3;

#[async_trait]
impl TypedTool for SearchTool {
    type Input = SearchArgs;
    type Output = SearchOutput;

    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web and return a list of results"
    }

    fn input_schema(&self) -> ObjectSchema {
        ObjectSchema::new()
            .field("query", FieldType::String, "Search terms")
            .optional(
                "max_results",
                FieldType::Integer,
                "Maximum number of results (default: 3)",
            )
    }

    async fn invoke(&self, input: SearchArgs, _ctx: &ExecContext) -> anyhow::Result<SearchOutput> {
        let count = input.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        let slug: String = input
            .query
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let results = (1..=count)
            .map(|i| SearchResult {
                title: format!("Result {} for '{}'", i, input.query),
                url: format!("https://example.com/{slug}/{i}"),
                snippet: format!("Summary {} of material about {}.", i, input.query),
            })
            .collect();
        Ok(SearchOutput {
            query: input.query,
            results,
        })
    }
}
