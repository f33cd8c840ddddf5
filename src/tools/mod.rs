//! Tool adapters exposed to the agent.
//!
//! The catalogue is closed: every tool is a [`Tool`] variant, and the
//! [`ToolRegistry`] maps tool names to the variants enabled for this process.

mod news;
mod summary;
mod web;

pub use news::{NewsApiClient, NewsEverything, NewsSources, NewsTopHeadlines};
pub use summary::NewsEventSummary;
pub use web::TavilySearch;

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;
use crate::llm::LlmClient;

/// Observations longer than this are cut before reaching the scratchpad.
const MAX_OBSERVATION_CHARS: usize = 20_000;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing required argument, wrong type, or provider-side validation.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The external provider failed.
    #[error("{0}")]
    Remote(String),
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        ToolError::Remote(format!("Request failed: {}", e))
    }
}

/// Name and description of a registered tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// A callable tool.
pub enum Tool {
    TavilySearch(TavilySearch),
    NewsTopHeadlines(NewsTopHeadlines),
    NewsEverything(NewsEverything),
    NewsSources(NewsSources),
    NewsEventSummary(NewsEventSummary),
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::TavilySearch(_) => TavilySearch::NAME,
            Tool::NewsTopHeadlines(_) => NewsTopHeadlines::NAME,
            Tool::NewsEverything(_) => NewsEverything::NAME,
            Tool::NewsSources(_) => NewsSources::NAME,
            Tool::NewsEventSummary(_) => NewsEventSummary::NAME,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::TavilySearch(_) => TavilySearch::DESCRIPTION,
            Tool::NewsTopHeadlines(_) => NewsTopHeadlines::DESCRIPTION,
            Tool::NewsEverything(_) => NewsEverything::DESCRIPTION,
            Tool::NewsSources(_) => NewsSources::DESCRIPTION,
            Tool::NewsEventSummary(_) => NewsEventSummary::DESCRIPTION,
        }
    }

    pub fn parameters_schema(&self) -> Value {
        match self {
            Tool::TavilySearch(_) => TavilySearch::parameters_schema(),
            Tool::NewsTopHeadlines(_) => NewsTopHeadlines::parameters_schema(),
            Tool::NewsEverything(_) => NewsEverything::parameters_schema(),
            Tool::NewsSources(_) => NewsSources::parameters_schema(),
            Tool::NewsEventSummary(_) => NewsEventSummary::parameters_schema(),
        }
    }

    /// Field that receives a bare (non-JSON) action input.
    fn primary_field(&self) -> Option<&'static str> {
        match self {
            Tool::TavilySearch(_) => Some("query"),
            Tool::NewsTopHeadlines(_) | Tool::NewsEverything(_) | Tool::NewsEventSummary(_) => {
                Some("q")
            }
            Tool::NewsSources(_) => None,
        }
    }

    /// Turn the model's raw `Action Input` text into tool arguments.
    pub fn coerce_input(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
            return value;
        }
        match self.primary_field() {
            Some(field) => json!({ field: trimmed.trim_matches('"').trim() }),
            None => json!({}),
        }
    }

    /// Run the tool with already-structured arguments.
    pub async fn invoke(&self, args: Value) -> Result<String, ToolError> {
        let output = match self {
            Tool::TavilySearch(t) => t.invoke(parse_args(args)?).await?,
            Tool::NewsTopHeadlines(t) => t.invoke(parse_args(args)?).await?,
            Tool::NewsEverything(t) => t.invoke(parse_args(args)?).await?,
            Tool::NewsSources(t) => t.invoke(parse_args(args)?).await?,
            Tool::NewsEventSummary(t) => t.invoke(parse_args(args)?).await?,
        };
        Ok(truncate_observation(output))
    }

    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name(),
            description: self.description(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Tools available to the agent, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Tool>,
    /// Registration order, used for the prompt catalogue
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalogue enabled by the configuration.
    ///
    /// News tools are only registered when a NewsAPI key is configured.
    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Tool::TavilySearch(TavilySearch::new(
            config.tavily_api_key.clone(),
            config.tavily_max_results,
        )));

        match &config.news_api_key {
            Some(key) => {
                let news = NewsApiClient::new(key.clone());
                registry.register(Tool::NewsTopHeadlines(NewsTopHeadlines::new(news.clone())));
                registry.register(Tool::NewsEverything(NewsEverything::new(news.clone())));
                registry.register(Tool::NewsSources(NewsSources::new(news.clone())));
                registry.register(Tool::NewsEventSummary(NewsEventSummary::new(news, llm)));
            }
            None => tracing::warn!("NEWS_API_KEY not set; news tools disabled"),
        }

        registry
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Tool) {
        let name = tool.name();
        if self.tools.insert(name, tool).is_none() {
            self.order.push(name);
        }
    }

    /// Case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(Tool::info)
            .collect()
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Treat blank optional strings as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Required string argument, rejected when blank.
pub(crate) fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidArguments(format!(
            "'{}' is required and must be a non-empty string",
            field
        )));
    }
    Ok(trimmed)
}

fn truncate_observation(output: String) -> String {
    if output.chars().count() <= MAX_OBSERVATION_CHARS {
        return output;
    }
    let cut: String = output.chars().take(MAX_OBSERVATION_CHARS).collect();
    format!(
        "{}... [truncated, showing first {} chars]",
        cut, MAX_OBSERVATION_CHARS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news_registry() -> ToolRegistry {
        let mut config = Config::new("sk-ant".into(), "tvly".into());
        config.news_api_key = Some("news".into());
        ToolRegistry::from_config(&config, Arc::new(crate::agent::testing::ScriptedLlm::new(Vec::<String>::new())))
    }

    #[test]
    fn news_tools_require_api_key() {
        let config = Config::new("sk-ant".into(), "tvly".into());
        let llm = Arc::new(crate::agent::testing::ScriptedLlm::new(Vec::<String>::new()));
        let registry = ToolRegistry::from_config(&config, llm);
        assert_eq!(registry.names(), vec!["tavily_search"]);

        let registry = news_registry();
        assert_eq!(
            registry.names(),
            vec![
                "tavily_search",
                "news_top_headlines",
                "news_everything",
                "news_sources",
                "news_event_summary"
            ]
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = news_registry();
        assert!(registry.get("news_sources").is_some());
        assert!(registry.get("News_Sources").is_none());
    }

    #[test]
    fn bare_input_goes_to_primary_field() {
        let registry = news_registry();
        let search = registry.get("tavily_search").unwrap();
        assert_eq!(search.coerce_input(" \"rust 1.80\" "), json!({"query": "rust 1.80"}));

        let everything = registry.get("news_everything").unwrap();
        assert_eq!(
            everything.coerce_input(r#"{"q": "bitcoin", "page_size": 5}"#),
            json!({"q": "bitcoin", "page_size": 5})
        );

        let sources = registry.get("news_sources").unwrap();
        assert_eq!(sources.coerce_input("None"), json!({}));
    }

    #[tokio::test]
    async fn wrong_argument_types_are_invalid_arguments() {
        let registry = news_registry();
        let everything = registry.get("news_everything").unwrap();
        let err = everything
            .invoke(json!({"q": "bitcoin", "page": "two"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn long_observations_are_truncated() {
        let long = "é".repeat(MAX_OBSERVATION_CHARS + 10);
        let out = truncate_observation(long);
        assert!(out.ends_with("[truncated, showing first 20000 chars]"));
        assert_eq!(out.chars().filter(|c| *c == 'é').count(), MAX_OBSERVATION_CHARS);
    }
}
