//! Web search through the Tavily API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{required, ToolError};

const TAVILY_API_URL: &str = "https://api.tavily.com";

/// Search the web via Tavily.
pub struct TavilySearch {
    api_key: String,
    max_results: u32,
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct TavilySearchArgs {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TavilyResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub const NAME: &'static str = "tavily_search";
    pub const DESCRIPTION: &'static str = "Search the web for information on a given query.";

    pub fn new(api_key: String, max_results: u32) -> Self {
        Self {
            api_key,
            max_results,
            client: Client::new(),
            base_url: TAVILY_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn parameters_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    pub async fn invoke(&self, args: TavilySearchArgs) -> Result<String, ToolError> {
        let query = required(&args.query, "query")?;

        tracing::info!("Searching the web: {}", query);

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": self.max_results,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Remote(format!(
                "Tavily search failed ({}): {}",
                status, body
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ToolError::Remote(format!("Unreadable Tavily response: {}", e)))?;

        if parsed.results.is_empty() {
            return Ok(format!("No results found for: {}", query));
        }

        serde_json::to_string(&parsed.results)
            .map_err(|e| ToolError::Remote(format!("Failed to encode results: {}", e)))
    }
}
