//! Redis-backed conversation store.
//!
//! Each session is a list at `message_store:{session_id}`. New entries are
//! pushed to the head, so reads reverse the list to get chronological order.
//! Entries are JSON documents of the form
//! `{"type": "human" | "ai", "data": {"content": "..."}}`.

use ::redis::AsyncCommands;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ConversationStore, ConversationTurn, HistoryError, TurnRole};

const KEY_PREFIX: &str = "message_store:";

#[derive(Debug, Serialize, Deserialize)]
struct StoredMessage {
    #[serde(rename = "type")]
    kind: String,
    data: StoredData,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredData {
    content: String,
}

impl From<&ConversationTurn> for StoredMessage {
    fn from(turn: &ConversationTurn) -> Self {
        let kind = match turn.role {
            TurnRole::User => "human",
            TurnRole::Assistant => "ai",
        };
        Self {
            kind: kind.to_string(),
            data: StoredData {
                content: turn.content.clone(),
            },
        }
    }
}

impl StoredMessage {
    fn into_turn(self) -> Option<ConversationTurn> {
        let role = match self.kind.as_str() {
            "human" => TurnRole::User,
            "ai" => TurnRole::Assistant,
            _ => return None,
        };
        Some(ConversationTurn {
            role,
            content: self.data.content,
        })
    }
}

pub struct RedisConversationStore {
    client: ::redis::Client,
}

impl RedisConversationStore {
    /// Validate the URL; connections are opened per operation.
    pub fn open(url: &str) -> Result<Self, HistoryError> {
        let client = ::redis::Client::open(url)
            .map_err(|e| HistoryError::Open(format!("invalid Redis URL: {e}")))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<::redis::aio::MultiplexedConnection, HistoryError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| HistoryError::Backend(format!("Redis connection failed: {e}")))
    }
}

fn session_key(session_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, session_id)
}

/// Decode a newest-first list into chronological turns, skipping foreign entries.
fn decode_entries(entries: Vec<String>) -> Vec<ConversationTurn> {
    entries
        .into_iter()
        .rev()
        .filter_map(|raw| match serde_json::from_str::<StoredMessage>(&raw) {
            Ok(message) => message.into_turn(),
            Err(e) => {
                tracing::warn!("Skipping unreadable history entry: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn read(&self, session_id: &str) -> Result<Vec<ConversationTurn>, HistoryError> {
        let mut conn = self.connection().await?;
        let entries = conn
            .lrange::<_, Vec<String>>(session_key(session_id), 0, -1)
            .await
            .map_err(|e| HistoryError::Backend(format!("LRANGE failed: {e}")))?;
        Ok(decode_entries(entries))
    }

    async fn append(&self, session_id: &str, turn: ConversationTurn) -> Result<(), HistoryError> {
        let payload = serde_json::to_string(&StoredMessage::from(&turn))
            .map_err(|e| HistoryError::Backend(e.to_string()))?;
        let mut conn = self.connection().await?;
        conn.lpush::<_, _, ()>(session_key(session_id), payload)
            .await
            .map_err(|e| HistoryError::Backend(format!("LPUSH failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_use_human_and_ai_types() {
        let user = serde_json::to_value(StoredMessage::from(&ConversationTurn::user("hi"))).unwrap();
        assert_eq!(user, serde_json::json!({"type": "human", "data": {"content": "hi"}}));

        let ai = serde_json::to_value(StoredMessage::from(&ConversationTurn::assistant("yo"))).unwrap();
        assert_eq!(ai["type"], "ai");
    }

    #[test]
    fn newest_first_lists_decode_chronologically() {
        let entries = vec![
            r#"{"type": "ai", "data": {"content": "second", "additional_kwargs": {}}}"#.to_string(),
            "garbage".to_string(),
            r#"{"type": "system", "data": {"content": "ignored"}}"#.to_string(),
            r#"{"type": "human", "data": {"content": "first"}}"#.to_string(),
        ];
        assert_eq!(
            decode_entries(entries),
            vec![
                ConversationTurn::user("first"),
                ConversationTurn::assistant("second"),
            ]
        );
    }

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(session_key("abc"), "message_store:abc");
    }
}
