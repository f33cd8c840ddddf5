//! Multi-article news summarization.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::news::TopHeadlinesArgs;
use super::{required, NewsApiClient, ToolError};
use crate::llm::{CompletionRequest, LlmClient};

/// Articles that feed one summary.
const MAX_ARTICLES: usize = 3;
const SNIPPET_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Deserialize)]
pub struct EventSummaryArgs {
    #[serde(default)]
    pub q: String,
    pub sources: Option<String>,
    pub language: Option<String>,
    pub page_size: Option<u32>,
}

/// `news_event_summary` tool: headlines for a query, distilled by the model.
pub struct NewsEventSummary {
    news: NewsApiClient,
    llm: Arc<dyn LlmClient>,
}

impl NewsEventSummary {
    pub const NAME: &'static str = "news_event_summary";
    pub const DESCRIPTION: &'static str = "Fetch the top 3 headlines for `q`, extract each article's content (or description), and distill the most important points across them into three bullet points.";

    pub fn new(news: NewsApiClient, llm: Arc<dyn LlmClient>) -> Self {
        Self { news, llm }
    }

    pub fn parameters_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "q": {"type": "string", "description": "Event or topic to summarize"},
                "sources": {"type": "string", "description": "Comma-separated source ids"},
                "language": {"type": "string", "description": "2-letter ISO-639-1 language code"},
                "page_size": {"type": "integer", "description": "Headlines to fetch (default: 3)"}
            },
            "required": ["q"]
        })
    }

    pub async fn invoke(&self, args: EventSummaryArgs) -> Result<String, ToolError> {
        let q = required(&args.q, "q")?.to_string();

        let data = self
            .news
            .top_headlines(&TopHeadlinesArgs {
                q: Some(q.clone()),
                sources: args.sources,
                language: args.language,
                page_size: Some(args.page_size.unwrap_or(MAX_ARTICLES as u32)),
                ..Default::default()
            })
            .await?;

        let articles = data["articles"].as_array().cloned().unwrap_or_default();
        if articles.is_empty() {
            return Ok(format!("No recent articles found for '{}'.", q));
        }

        let snippets = extract_snippets(&articles);
        if snippets.is_empty() {
            return Ok("Couldn't find any text to summarize in the top articles.".to_string());
        }

        let prompt = summary_prompt(&snippets.join(SNIPPET_SEPARATOR));
        tracing::debug!(articles = snippets.len(), "Summarizing news snippets");

        self.llm
            .complete(&CompletionRequest::prompt(prompt))
            .await
            .map_err(|e| ToolError::Remote(format!("Summary model call failed: {}", e)))
    }
}

/// `content`, falling back to `description`, for the first few articles.
fn extract_snippets(articles: &[Value]) -> Vec<String> {
    articles
        .iter()
        .take(MAX_ARTICLES)
        .filter_map(|article| {
            ["content", "description"]
                .iter()
                .filter_map(|field| article[*field].as_str())
                .map(str::trim)
                .find(|text| !text.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn summary_prompt(combined: &str) -> String {
    format!(
        "Below are snippets from the top 3 news articles matching your query. \
         Summarize the most important points across these snippets into three concise bullet points:\n\n\
         {}\n\n\
         Bullet points:",
        combined
    )
}
