//! Web-search tool.
//!
//! Talks to a hosted search API (`POST {base_url}/api/web_search`) with a
//! bearer API key. A missing key is an ordinary tool failure; the engine
//! sees `{"error": ...}` and can answer without search results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use palmchat_core::ports::tool::{names, Tool, ToolError};

const DEFAULT_BASE_URL: &str = "https://search.ollama.ai";
const DEFAULT_MAX_RESULTS: u32 = 5;

/// Configuration for the search tool.
#[derive(Debug, Clone)]
pub struct SearchToolConfig {
    /// Base URL of the search API.
    pub base_url: String,
    /// Bearer API key; `None` leaves the tool permanently failing.
    pub api_key: Option<String>,
}

impl Default for SearchToolConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct WebSearchRequest<'a> {
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize, Serialize)]
struct SearchResult {
    title: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct WebSearchResponse {
    results: Vec<SearchResult>,
}

/// Performs a web search on the engine's behalf.
#[derive(Debug, Clone)]
pub struct SearchTool {
    client: reqwest::Client,
    config: SearchToolConfig,
}

impl SearchTool {
    #[must_use]
    pub fn new(config: SearchToolConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &'static str {
        names::SEARCH
    }

    fn description(&self) -> &'static str {
        "Searches the web; arguments: {\"query\": string, \"max_results\"?: number}"
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let Some(api_key) = &self.config.api_key else {
            return Err(ToolError::Unavailable("search API key not configured".into()));
        };

        let query = args
            .get("query")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ToolError::Invocation("missing 'query' argument".into()))?;
        let max_results = args
            .get("max_results")
            .and_then(serde_json::Value::as_u64)
            .map_or(DEFAULT_MAX_RESULTS, |n| u32::try_from(n).unwrap_or(DEFAULT_MAX_RESULTS));

        let url = format!("{}/api/web_search", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&WebSearchRequest { query, max_results })
            .send()
            .await
            .map_err(|e| ToolError::Unavailable(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ToolError::Invocation(format!(
                "search API returned {}",
                response.status()
            )));
        }

        let body: WebSearchResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Invocation(format!("decoding search response: {e}")))?;

        tracing::debug!(query, results = body.results.len(), "Web search completed");
        Ok(serde_json::json!({ "results": body.results }))
    }
}
