//! NewsAPI tools: headlines, article search and source listing.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{non_blank, required, ToolError};

const NEWS_API_URL: &str = "https://newsapi.org";
const SORT_BY_CHOICES: [&str; 3] = ["relevancy", "popularity", "publishedAt"];
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Thin NewsAPI v2 client shared by the news tools.
#[derive(Clone)]
pub struct NewsApiClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
            base_url: NEWS_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `GET /v2/top-headlines`
    pub async fn top_headlines(&self, args: &TopHeadlinesArgs) -> Result<Value, ToolError> {
        if non_blank(&args.sources).is_some()
            && (non_blank(&args.country).is_some() || non_blank(&args.category).is_some())
        {
            return Err(ToolError::InvalidArguments(
                "cannot mix country/category param with sources param".to_string(),
            ));
        }

        let mut query = Query::default();
        query.opt("q", &args.q);
        query.opt("sources", &args.sources);
        query.opt("category", &args.category);
        query.opt("language", &args.language);
        query.opt("country", &args.country);
        query.push("pageSize", page_size(args.page_size)?);
        query.push("page", args.page.unwrap_or(1));

        self.get("/v2/top-headlines", query).await
    }

    /// `GET /v2/everything`
    pub async fn everything(&self, args: &EverythingArgs) -> Result<Value, ToolError> {
        let q = required(&args.q, "q")?;

        if let Some(sort_by) = non_blank(&args.sort_by) {
            if !SORT_BY_CHOICES.contains(&sort_by) {
                return Err(ToolError::InvalidArguments(format!(
                    "sort_by must be one of {}",
                    SORT_BY_CHOICES.join(", ")
                )));
            }
        }

        let mut query = Query::default();
        query.push("q", q);
        query.opt("sources", &args.sources);
        query.opt("domains", &args.domains);
        query.opt("from", &args.from_param);
        query.opt("to", &args.to);
        query.opt("language", &args.language);
        query.opt("sortBy", &args.sort_by);
        query.push("page", args.page.unwrap_or(1));
        query.push("pageSize", page_size(args.page_size)?);

        self.get("/v2/everything", query).await
    }

    /// `GET /v2/top-headlines/sources`
    pub async fn sources(&self, args: &SourcesArgs) -> Result<Value, ToolError> {
        let mut query = Query::default();
        query.opt("category", &args.category);
        query.opt("language", &args.language);
        query.opt("country", &args.country);

        self.get("/v2/top-headlines/sources", query).await
    }

    async fn get(&self, endpoint: &str, query: Query) -> Result<Value, ToolError> {
        tracing::debug!(endpoint, "NewsAPI request");
        let response = self
            .client
            .get(format!("{}{}", self.base_url, endpoint))
            .header("X-Api-Key", &self.api_key)
            .query(&query.0)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            ToolError::Remote(format!("NewsAPI returned unreadable body ({}): {}", status, e))
        })?;

        if !status.is_success() || body["status"] == "error" {
            let message = body["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            let code = body["code"].as_str().unwrap_or("error");
            return Err(ToolError::Remote(format!(
                "NewsAPI error ({}, {}): {}",
                status.as_u16(),
                code,
                message
            )));
        }

        Ok(body)
    }
}

#[derive(Default)]
struct Query(Vec<(&'static str, String)>);

impl Query {
    fn push(&mut self, key: &'static str, value: impl ToString) {
        self.0.push((key, value.to_string()));
    }

    fn opt(&mut self, key: &'static str, value: &Option<String>) {
        if let Some(v) = non_blank(value) {
            self.push(key, v);
        }
    }
}

fn page_size(value: Option<u32>) -> Result<u32, ToolError> {
    let size = value.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=100).contains(&size) {
        return Err(ToolError::InvalidArguments(
            "page_size param should be an int between 1 and 100".to_string(),
        ));
    }
    Ok(size)
}

#[derive(Debug, Default, Deserialize)]
pub struct TopHeadlinesArgs {
    pub q: Option<String>,
    pub sources: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EverythingArgs {
    #[serde(default)]
    pub q: String,
    pub sources: Option<String>,
    pub domains: Option<String>,
    pub from_param: Option<String>,
    pub to: Option<String>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourcesArgs {
    pub category: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// `news_top_headlines` tool.
pub struct NewsTopHeadlines {
    news: NewsApiClient,
}

impl NewsTopHeadlines {
    pub const NAME: &'static str = "news_top_headlines";
    pub const DESCRIPTION: &'static str = "Fetch top headlines. Params mirror NewsAPI: q, sources, category, language, country, page_size, page.";

    pub fn new(news: NewsApiClient) -> Self {
        Self { news }
    }

    pub fn parameters_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "q": {"type": "string", "description": "Keywords or phrase to search for"},
                "sources": {"type": "string", "description": "Comma-separated source ids (not combinable with country/category)"},
                "category": {"type": "string", "description": "business, entertainment, general, health, science, sports or technology"},
                "language": {"type": "string", "description": "2-letter ISO-639-1 language code"},
                "country": {"type": "string", "description": "2-letter ISO 3166-1 country code"},
                "page_size": {"type": "integer", "description": "Results per page (default: 20, max: 100)"},
                "page": {"type": "integer", "description": "Page number (default: 1)"}
            }
        })
    }

    pub async fn invoke(&self, args: TopHeadlinesArgs) -> Result<String, ToolError> {
        self.news.top_headlines(&args).await.map(|v| render(&v))
    }
}

/// `news_everything` tool.
pub struct NewsEverything {
    news: NewsApiClient,
}

impl NewsEverything {
    pub const NAME: &'static str = "news_everything";
    pub const DESCRIPTION: &'static str =
        "Search all articles. Required: q. Others match NewsAPI's everything endpoint.";

    pub fn new(news: NewsApiClient) -> Self {
        Self { news }
    }

    pub fn parameters_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "q": {"type": "string", "description": "Keywords or phrase to search for"},
                "sources": {"type": "string", "description": "Comma-separated source ids"},
                "domains": {"type": "string", "description": "Comma-separated domains to restrict the search to"},
                "from_param": {"type": "string", "description": "Oldest article date (ISO 8601)"},
                "to": {"type": "string", "description": "Newest article date (ISO 8601)"},
                "language": {"type": "string", "description": "2-letter ISO-639-1 language code"},
                "sort_by": {"type": "string", "description": "relevancy, popularity or publishedAt"},
                "page": {"type": "integer", "description": "Page number (default: 1)"},
                "page_size": {"type": "integer", "description": "Results per page (default: 20, max: 100)"}
            },
            "required": ["q"]
        })
    }

    pub async fn invoke(&self, args: EverythingArgs) -> Result<String, ToolError> {
        self.news.everything(&args).await.map(|v| render(&v))
    }
}

/// `news_sources` tool.
pub struct NewsSources {
    news: NewsApiClient,
}

impl NewsSources {
    pub const NAME: &'static str = "news_sources";
    pub const DESCRIPTION: &'static str =
        "List available news sources. Filters: category, language, country.";

    pub fn new(news: NewsApiClient) -> Self {
        Self { news }
    }

    pub fn parameters_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {"type": "string", "description": "Source category"},
                "language": {"type": "string", "description": "2-letter ISO-639-1 language code"},
                "country": {"type": "string", "description": "2-letter ISO 3166-1 country code"}
            }
        })
    }

    pub async fn invoke(&self, args: SourcesArgs) -> Result<String, ToolError> {
        self.news.sources(&args).await.map(|v| render(&v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> NewsApiClient {
        NewsApiClient::new("news-key".into()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn top_headlines_sends_defaults_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(header("X-Api-Key", "news-key"))
            .and(query_param("q", "rust"))
            .and(query_param("country", "us"))
            .and(query_param("pageSize", "20"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "totalResults": 1,
                "articles": [{"title": "Rust 2.0"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = NewsTopHeadlines::new(client(&server).await);
        let out = tool
            .invoke(TopHeadlinesArgs {
                q: Some("rust".into()),
                country: Some("us".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(out.contains("Rust 2.0"));
    }

    #[tokio::test]
    async fn sources_cannot_mix_with_country() {
        let tool = NewsTopHeadlines::new(NewsApiClient::new("k".into()).with_base_url("http://127.0.0.1:9"));
        let err = tool
            .invoke(TopHeadlinesArgs {
                sources: Some("bbc-news".into()),
                country: Some("gb".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn everything_requires_query() {
        let tool = NewsEverything::new(NewsApiClient::new("k".into()).with_base_url("http://127.0.0.1:9"));
        let args: EverythingArgs = serde_json::from_value(json!({"q": ""})).unwrap();
        let err = tool.invoke(args).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid arguments: 'q' is required and must be a non-empty string"
        );

        let args: EverythingArgs = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            tool.invoke(args).await,
            Err(ToolError::InvalidArguments(_))
        ));
    }

    #[tokio::test]
    async fn everything_rejects_unknown_sort_and_page_size() {
        let tool = NewsEverything::new(NewsApiClient::new("k".into()).with_base_url("http://127.0.0.1:9"));
        let args: EverythingArgs =
            serde_json::from_value(json!({"q": "ai", "sort_by": "newest"})).unwrap();
        assert!(matches!(
            tool.invoke(args).await,
            Err(ToolError::InvalidArguments(_))
        ));

        let args: EverythingArgs =
            serde_json::from_value(json!({"q": "ai", "page_size": 500})).unwrap();
        assert!(matches!(
            tool.invoke(args).await,
            Err(ToolError::InvalidArguments(_))
        ));
    }

    #[tokio::test]
    async fn everything_maps_renamed_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "ai"))
            .and(query_param("from", "2024-01-01"))
            .and(query_param("sortBy", "popularity"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "articles": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = NewsEverything::new(client(&server).await);
        let args: EverythingArgs = serde_json::from_value(json!({
            "q": "ai",
            "from_param": "2024-01-01",
            "sort_by": "popularity"
        }))
        .unwrap();
        tool.invoke(args).await.unwrap();
    }

    #[tokio::test]
    async fn provider_errors_become_remote_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines/sources"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid"
            })))
            .mount(&server)
            .await;

        let tool = NewsSources::new(client(&server).await);
        let err = tool.invoke(SourcesArgs::default()).await.unwrap_err();
        match err {
            ToolError::Remote(message) => {
                assert!(message.contains("apiKeyInvalid"));
                assert!(message.contains("Your API key is invalid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
