//! Agent module - the ReAct tool-use loop.
//!
//! The agent follows a "tools in a loop" pattern over a text scratchpad:
//! 1. THINKING: send the prompt, tool catalogue and scratchpad to the model
//! 2. ACTING: run the tool the model named (unknown names become observations)
//! 3. OBSERVING: append the tool output to the scratchpad and think again
//! 4. Stop on `Final Answer:` (DONE) or when the iteration/time limit is hit (FAILED)

mod agent_loop;
mod parser;
mod prompt;

pub use agent_loop::{Agent, AgentRun, AgentStep, LoopOutcome, STOPPED_MESSAGE};
pub use parser::{parse, AgentAction, AgentOutput, ParseError};
pub use prompt::{build_prompt, OBSERVATION_STOP};

#[cfg(test)]
pub(crate) mod testing;
