//! Configuration management for newshound.
//!
//! Configuration is read from environment variables (a `.env` file in the
//! working directory is loaded first, if present):
//! - `ANTHROPIC_API_KEY` - Required. Anthropic API key used for the agent model.
//! - `TAVILY_API_KEY` - Required. Tavily API key used by `tavily_search`.
//! - `NEWS_API_KEY` - Optional. Enables the NewsAPI tools when set.
//! - `REDIS_URL` - Optional. Redis conversation store.
//! - `HISTORY_DB_PATH` - Optional. SQLite conversation store (ignored when `REDIS_URL` is set).
//! - `ANTHROPIC_MODEL` - Optional. Defaults to `claude-3-5-sonnet-20240620`.
//! - `ANTHROPIC_MAX_TOKENS` - Optional. Defaults to `1024`.
//! - `TAVILY_MAX_RESULTS` - Optional. Defaults to `5`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `6`.
//! - `MAX_EXECUTION_SECS` - Optional. Agent loop wall-clock ceiling. Defaults to `60`.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `CORS_ALLOW_CREDENTIALS` - Optional. Defaults to `false`.
//! - `CHAT_ERROR_STATUS` - Optional. Status for failed chat calls, `500` or `200`. Defaults to `500`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Where conversation history is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryBackend {
    /// Process-local map, lost on restart.
    Memory,
    /// SQLite database file.
    Sqlite(PathBuf),
    /// Redis server URL.
    Redis(String),
}

/// Agent loop limits.
#[derive(Debug, Clone)]
pub struct AgentLimits {
    /// Maximum THINKING steps per chat call
    pub max_iterations: usize,

    /// Wall-clock ceiling for one chat call
    pub max_execution_time: Duration,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            max_execution_time: Duration::from_secs(60),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Allow credentialed CORS requests (origins are mirrored instead of `*`)
    pub cors_allow_credentials: bool,

    /// Status code returned with a failed chat response
    pub error_status: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allow_credentials: false,
            error_status: 500,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Anthropic API key
    pub anthropic_api_key: String,

    /// Anthropic model identifier
    pub model: String,

    /// Completion token budget per model call
    pub max_tokens: u32,

    /// Tavily API key
    pub tavily_api_key: String,

    /// Number of Tavily results per search
    pub tavily_max_results: u32,

    /// NewsAPI key; news tools are disabled without it
    pub news_api_key: Option<String>,

    pub history: HistoryBackend,

    pub limits: AgentLimits,

    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `ANTHROPIC_API_KEY` or
    /// `TAVILY_API_KEY` is not set, and `ConfigError::InvalidValue` if an
    /// optional variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal in deployments.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_api_key = var("ANTHROPIC_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))?;
        let tavily_api_key = var("TAVILY_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("TAVILY_API_KEY".to_string()))?;

        let model = var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let max_tokens = parse_or("ANTHROPIC_MAX_TOKENS", var("ANTHROPIC_MAX_TOKENS"), 1024)?;
        let tavily_max_results = parse_or("TAVILY_MAX_RESULTS", var("TAVILY_MAX_RESULTS"), 5)?;

        let history = match (var("REDIS_URL"), var("HISTORY_DB_PATH")) {
            (Some(url), _) => HistoryBackend::Redis(url),
            (None, Some(path)) => HistoryBackend::Sqlite(PathBuf::from(path)),
            (None, None) => HistoryBackend::Memory,
        };

        let defaults = AgentLimits::default();
        let max_iterations: usize =
            parse_or("MAX_ITERATIONS", var("MAX_ITERATIONS"), defaults.max_iterations)?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let max_execution_secs: u64 = parse_or(
            "MAX_EXECUTION_SECS",
            var("MAX_EXECUTION_SECS"),
            defaults.max_execution_time.as_secs(),
        )?;
        if max_execution_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_EXECUTION_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let server_defaults = ServerConfig::default();
        let cors_allow_credentials = var("CORS_ALLOW_CREDENTIALS")
            .map(|v| {
                parse_bool(&v)
                    .map_err(|e| ConfigError::InvalidValue("CORS_ALLOW_CREDENTIALS".to_string(), e))
            })
            .transpose()?
            .unwrap_or(server_defaults.cors_allow_credentials);
        let error_status: u16 = parse_or(
            "CHAT_ERROR_STATUS",
            var("CHAT_ERROR_STATUS"),
            server_defaults.error_status,
        )?;
        if error_status != 200 && error_status != 500 {
            return Err(ConfigError::InvalidValue(
                "CHAT_ERROR_STATUS".to_string(),
                format!("expected 200 or 500, got {}", error_status),
            ));
        }

        let server = ServerConfig {
            host: var("HOST").unwrap_or(server_defaults.host),
            port: parse_or("PORT", var("PORT"), server_defaults.port)?,
            cors_allow_credentials,
            error_status,
        };

        Ok(Self {
            anthropic_api_key,
            model,
            max_tokens,
            tavily_api_key,
            tavily_max_results,
            news_api_key: var("NEWS_API_KEY"),
            history,
            limits: AgentLimits {
                max_iterations,
                max_execution_time: Duration::from_secs(max_execution_secs),
            },
            server,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(anthropic_api_key: String, tavily_api_key: String) -> Self {
        Self {
            anthropic_api_key,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            tavily_api_key,
            tavily_max_results: 5,
            news_api_key: None,
            history: HistoryBackend::Memory,
            limits: AgentLimits::default(),
            server: ServerConfig::default(),
        }
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}
