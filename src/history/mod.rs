//! Conversation history storage.
//!
//! Turns are append-only and keyed by a caller-supplied session id. The
//! backend is chosen once at startup from [`HistoryBackend`].

mod memory;
mod redis;
mod sqlite;

pub use self::memory::InMemoryConversationStore;
pub use self::redis::RedisConversationStore;
pub use self::sqlite::SqliteConversationStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::HistoryBackend;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to open conversation store: {0}")]
    Open(String),

    #[error("Conversation store error: {0}")]
    Backend(String),
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Label used in rendered transcripts.
    pub fn label(self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Assistant => "AI",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(TurnRole::User),
            "assistant" => Some(TurnRole::Assistant),
            _ => None,
        }
    }
}

/// One stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only per-session log of turns.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// All turns for the session, oldest first. Unknown sessions are empty.
    async fn read(&self, session_id: &str) -> Result<Vec<ConversationTurn>, HistoryError>;

    async fn append(&self, session_id: &str, turn: ConversationTurn) -> Result<(), HistoryError>;
}

pub type SharedConversationStore = Arc<dyn ConversationStore>;

/// Open the configured backend.
pub fn open_store(backend: &HistoryBackend) -> Result<SharedConversationStore, HistoryError> {
    let store: SharedConversationStore = match backend {
        HistoryBackend::Memory => Arc::new(InMemoryConversationStore::new()),
        HistoryBackend::Sqlite(path) => Arc::new(SqliteConversationStore::open(path)?),
        HistoryBackend::Redis(url) => Arc::new(RedisConversationStore::open(url)?),
    };
    tracing::info!("Conversation store: {}", store.backend_name());
    Ok(store)
}

/// Render turns as `"<Role>: <content>\n"` lines in order.
pub fn render_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}\n", turn.role.label(), turn.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_role_prefixed_and_ordered() {
        let turns = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello!"),
            ConversationTurn::user("what's new?"),
        ];
        assert_eq!(
            render_transcript(&turns),
            "User: hi\nAI: hello!\nUser: what's new?\n"
        );
        assert_eq!(render_transcript(&[]), "");
    }

    #[tokio::test]
    async fn open_store_defaults_to_memory() {
        let store = open_store(&HistoryBackend::Memory).unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(store.read("nobody").await.unwrap().is_empty());
    }

    #[test]
    fn open_store_rejects_malformed_redis_url() {
        let err = open_store(&HistoryBackend::Redis("not a url".into()))
            .err()
            .unwrap();
        assert!(matches!(err, HistoryError::Open(_)));
    }
}
