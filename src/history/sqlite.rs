//! SQLite-backed conversation store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};

use super::{ConversationStore, ConversationTurn, HistoryError, TurnRole};

#[derive(Clone)]
pub struct SqliteConversationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConversationStore {
    pub fn open(db_path: &Path) -> Result<Self, HistoryError> {
        tracing::info!("Opening conversation store at {}", db_path.display());
        let conn = Connection::open(db_path)
            .map_err(|e| HistoryError::Open(format!("failed to open database: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| HistoryError::Open(format!("failed to set pragmas: {e}")))?;

        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| HistoryError::Open(format!("failed to open in-memory database: {e}")))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS conversation_turns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_turns_session
                ON conversation_turns(session_id, id);",
        )
        .map_err(|e| HistoryError::Open(format!("migration failed: {e}")))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, HistoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| HistoryError::Backend("connection mutex poisoned".to_string()))?;
            f(&guard).map_err(|e| HistoryError::Backend(e.to_string()))
        })
        .await
        .map_err(|e| HistoryError::Backend(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn read(&self, session_id: &str) -> Result<Vec<ConversationTurn>, HistoryError> {
        let session_id = session_id.to_string();
        let rows: Vec<(String, String)> = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT role, content FROM conversation_turns
                     WHERE session_id = ?1 ORDER BY id ASC",
                )?;
                let rows = stmt
                    .query_map(params![session_id], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(role, content)| {
                TurnRole::parse(&role)
                    .map(|role| ConversationTurn { role, content })
                    .ok_or_else(|| HistoryError::Backend(format!("unknown role in store: {role}")))
            })
            .collect()
    }

    async fn append(&self, session_id: &str, turn: ConversationTurn) -> Result<(), HistoryError> {
        let session_id = session_id.to_string();
        let created_at = Utc::now().to_rfc3339();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO conversation_turns (session_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![session_id, turn.role.as_str(), turn.content, created_at],
            )?;
            Ok(())
        })
        .await
    }
}
