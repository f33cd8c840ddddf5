//! Scripted model client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{CompletionRequest, LlmClient, LlmError};

/// Replays canned completions and records every request.
pub(crate) struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    fail: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub(crate) fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            repeat: None,
            fail: false,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with the same text.
    pub(crate) fn repeating(response: impl Into<String>) -> Self {
        let mut llm = Self::new(Vec::<String>::new());
        llm.repeat = Some(response.into());
        llm
    }

    /// Fail every request as an overloaded API would.
    pub(crate) fn failing() -> Self {
        let mut llm = Self::new(Vec::<String>::new());
        llm.fail = true;
        llm
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Text of the last message in each request.
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| r.messages.last().map(|m| m.content.clone()))
            .collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(LlmError::Api {
                status: 529,
                body: "overloaded".to_string(),
            });
        }

        let next = self.responses.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| LlmError::MalformedResponse("script exhausted".to_string()))
    }
}
