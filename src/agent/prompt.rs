//! ReAct prompt template for the agent.

use crate::tools::ToolRegistry;

/// Stop sequence that keeps the model from inventing its own observations.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// Build the full prompt for one THINKING step.
pub fn build_prompt(tools: &ToolRegistry, input: &str, scratchpad: &str) -> String {
    let catalogue = tools.list_tools();

    let tool_descriptions = catalogue
        .iter()
        .map(|t| format!("{}: {} Input schema: {}", t.name, t.description, t.parameters))
        .collect::<Vec<_>>()
        .join("\n");

    let tool_names = catalogue
        .iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Answer the following questions as best you can. You have access to the following tools:

{tool_descriptions}

Use the information from the tools to answer questions!

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action, as a JSON object matching the tool's input schema
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought: Let me approach this step by step
{scratchpad}"#
    )
}
