//! Chat service: conversation history around one agent run.

use std::sync::Arc;

use thiserror::Error;

use crate::agent::Agent;
use crate::config::Config;
use crate::history::{
    open_store, render_transcript, ConversationTurn, HistoryError, SharedConversationStore,
};
use crate::llm::{AnthropicClient, LlmClient, LlmError};
use crate::tools::ToolRegistry;

/// Failures that reach the HTTP boundary.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Failed to read conversation history")]
    HistoryRead(#[source] HistoryError),

    #[error("Failed to save conversation history")]
    HistoryWrite(#[source] HistoryError),

    #[error("Model call failed")]
    Model(#[from] LlmError),
}

/// Process-wide chat handler, built once at startup.
pub struct ChatService {
    agent: Agent,
    store: SharedConversationStore,
}

impl ChatService {
    pub fn new(agent: Agent, store: SharedConversationStore) -> Self {
        Self { agent, store }
    }

    /// Wire up the Anthropic client, tool catalogue and conversation store.
    pub fn from_config(config: &Config) -> Result<Self, HistoryError> {
        let llm: Arc<dyn LlmClient> = Arc::new(AnthropicClient::new(
            config.anthropic_api_key.clone(),
            config.model.clone(),
            config.max_tokens,
        ));
        let tools = ToolRegistry::from_config(config, llm.clone());
        tracing::info!("Registered tools: {}", tools.names().join(", "));

        let agent = Agent::new(llm, tools, config.limits.clone());
        let store = open_store(&config.history)?;
        Ok(Self::new(agent, store))
    }

    /// Answer one message, returning the agent's final text.
    ///
    /// With a session id, prior turns are read and flattened into the agent
    /// input, then the user message and the final answer are appended.
    /// Without one the store is not touched.
    pub async fn chat(&self, message: &str, session_id: Option<&str>) -> Result<String, ChatError> {
        let Some(session_id) = session_id else {
            return self.run_agent(message).await;
        };

        let history = self
            .store
            .read(session_id)
            .await
            .map_err(ChatError::HistoryRead)?;
        tracing::debug!(turns = history.len(), "Loaded conversation history");

        self.store
            .append(session_id, ConversationTurn::user(message))
            .await
            .map_err(ChatError::HistoryWrite)?;

        let reply = self.run_agent(&agent_input(&history, message)).await?;

        self.store
            .append(session_id, ConversationTurn::assistant(reply.clone()))
            .await
            .map_err(ChatError::HistoryWrite)?;

        Ok(reply)
    }

    async fn run_agent(&self, input: &str) -> Result<String, ChatError> {
        let run = self.agent.run(input).await?;
        tracing::info!(
            outcome = ?run.outcome,
            iterations = run.iterations,
            tool_calls = run.steps.iter().filter(|s| s.tool.is_some()).count(),
            elapsed_ms = run.elapsed.as_millis() as u64,
            "Agent run complete"
        );
        Ok(run.output)
    }
}

/// Prefix the message with the flattened transcript, if any.
pub fn agent_input(history: &[ConversationTurn], message: &str) -> String {
    if history.is_empty() {
        return message.to_string();
    }
    format!(
        "Chat History:\n{}User Message: {}",
        render_transcript(history),
        message
    )
}
