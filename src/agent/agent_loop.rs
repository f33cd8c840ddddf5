//! Core agent loop implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AgentLimits;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::tools::{ToolError, ToolRegistry};

use super::parser::{parse, AgentAction, AgentOutput};
use super::prompt::{build_prompt, OBSERVATION_STOP};

/// Answer returned when a limit stops the loop.
pub const STOPPED_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

const FORMAT_REMINDER: &str = "Respond with a Thought followed by either an Action and Action Input, or a Final Answer.";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model produced a final answer.
    Finished,
    /// `max_iterations` THINKING steps were used up.
    IterationLimit,
    /// The wall-clock ceiling passed.
    TimeLimit,
}

/// One THINKING → ACTING → OBSERVING round trip.
#[derive(Debug, Clone)]
pub struct AgentStep {
    /// Raw model output for the step
    pub log: String,
    /// Requested tool, absent when the output could not be parsed
    pub tool: Option<String>,
    pub tool_input: Option<String>,
    pub observation: String,
}

/// Result of a single agent run.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub output: String,
    pub outcome: LoopOutcome,
    /// Number of model calls made
    pub iterations: usize,
    pub steps: Vec<AgentStep>,
    pub elapsed: Duration,
}

/// The tool-using agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    limits: AgentLimits,
}

impl Agent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, limits: AgentLimits) -> Self {
        Self { llm, tools, limits }
    }

    /// Run the loop for one input.
    ///
    /// Limits never produce an error: the run ends with [`STOPPED_MESSAGE`]
    /// and the matching [`LoopOutcome`]. Only a failed model call is an error.
    /// Limits are checked between steps, so an in-flight call always completes.
    pub async fn run(&self, input: &str) -> Result<AgentRun, LlmError> {
        let started = Instant::now();
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut iterations = 0;

        loop {
            if iterations >= self.limits.max_iterations {
                return Ok(self.stopped(LoopOutcome::IterationLimit, iterations, steps, started));
            }
            if started.elapsed() >= self.limits.max_execution_time {
                return Ok(self.stopped(LoopOutcome::TimeLimit, iterations, steps, started));
            }

            iterations += 1;
            tracing::debug!("Agent iteration {}", iterations);

            // THINKING
            let prompt = build_prompt(&self.tools, input, &format_scratchpad(&steps));
            let text = self
                .llm
                .complete(&CompletionRequest::prompt(prompt).with_stop(OBSERVATION_STOP))
                .await?;

            match parse(&text) {
                Ok(AgentOutput::Finish(answer)) => {
                    tracing::debug!(iterations, "Agent finished: {}", truncate_for_log(&answer, 500));
                    return Ok(AgentRun {
                        output: answer,
                        outcome: LoopOutcome::Finished,
                        iterations,
                        steps,
                        elapsed: started.elapsed(),
                    });
                }
                Ok(AgentOutput::Action(action)) => {
                    // ACTING, then OBSERVING
                    let observation = self.execute_action(&action).await;
                    tracing::debug!("Observation: {}", truncate_for_log(&observation, 1000));
                    steps.push(AgentStep {
                        log: action.log,
                        tool: Some(action.tool),
                        tool_input: Some(action.input),
                        observation,
                    });
                }
                Err(e) => {
                    tracing::warn!("Unparseable model output: {}", e);
                    steps.push(AgentStep {
                        log: text,
                        tool: None,
                        tool_input: None,
                        observation: format!("{} {}", e, FORMAT_REMINDER),
                    });
                }
            }
        }
    }

    /// Execute the requested tool; every failure becomes observation text.
    async fn execute_action(&self, action: &AgentAction) -> String {
        let Some(tool) = self.tools.get(&action.tool) else {
            tracing::warn!("Model requested unknown tool: {}", action.tool);
            return format!(
                "{} is not a valid tool, try one of [{}].",
                action.tool,
                self.tools.names().join(", ")
            );
        };

        let args = tool.coerce_input(&action.input);
        tracing::info!("Calling tool: {} with args: {}", action.tool, args);

        match tool.invoke(args).await {
            Ok(output) => output,
            Err(e @ ToolError::InvalidArguments(_)) => {
                format!("{}. Correct the Action Input and try again.", e)
            }
            Err(e) => {
                tracing::error!("Tool {} failed: {}", action.tool, e);
                format!("Error: {}", e)
            }
        }
    }

    fn stopped(
        &self,
        outcome: LoopOutcome,
        iterations: usize,
        steps: Vec<AgentStep>,
        started: Instant,
    ) -> AgentRun {
        tracing::warn!(
            ?outcome,
            iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Agent stopped before a final answer"
        );
        AgentRun {
            output: STOPPED_MESSAGE.to_string(),
            outcome,
            iterations,
            steps,
            elapsed: started.elapsed(),
        }
    }
}

/// Render prior steps as the text the model continues from.
fn format_scratchpad(steps: &[AgentStep]) -> String {
    steps
        .iter()
        .map(|step| format!("{}\nObservation: {}\nThought: ", step.log, step.observation))
        .collect()
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}... [truncated]", cut)
    }
}
