//! Parser for the Thought/Action/Action Input/Final Answer grammar.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

const FINAL_ANSWER: &str = "Final Answer:";

/// A tool the model asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    pub tool: String,
    pub input: String,
    /// Raw model text for this step, kept for the scratchpad
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutput {
    Action(AgentAction),
    Finish(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid Format: Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Invalid Format: Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,

    #[error("Could not parse LLM output")]
    Unparseable,

    #[error("Parsing LLM output produced both a final answer and a parse-able action")]
    AnswerAndAction,
}

fn action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("action regex should compile")
    })
}

fn action_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Action\s*\d*\s*:").expect("action label regex should compile"))
}

fn action_input_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("input label regex should compile")
    })
}

/// Parse one model completion.
///
/// Text holding both a final answer and a complete action is rejected.
pub fn parse(text: &str) -> Result<AgentOutput, ParseError> {
    let final_at = text.find(FINAL_ANSWER);

    if let Some(caps) = action_re().captures(text) {
        if final_at.is_some() {
            return Err(ParseError::AnswerAndAction);
        }

        let tool = caps.get(1).map(|m| m.as_str()).unwrap_or("").trim();
        let input = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
        return Ok(AgentOutput::Action(AgentAction {
            tool: tool.to_string(),
            input: input.trim_matches('"').to_string(),
            log: text.to_string(),
        }));
    }

    if let Some(at) = final_at {
        return Ok(AgentOutput::Finish(final_answer(text, at)));
    }

    if !action_label_re().is_match(text) {
        Err(ParseError::MissingAction)
    } else if !action_input_label_re().is_match(text) {
        Err(ParseError::MissingActionInput)
    } else {
        Err(ParseError::Unparseable)
    }
}

fn final_answer(text: &str, at: usize) -> String {
    text[at + FINAL_ANSWER.len()..].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_answer_takes_trailing_text() {
        let out = parse("Thought: I now know the final answer\nFinal Answer:  Paris.\n").unwrap();
        assert_eq!(out, AgentOutput::Finish("Paris.".to_string()));
    }

    #[test]
    fn action_and_input_are_extracted() {
        let text = "Thought: search it\nAction: tavily_search\nAction Input: \"rust async\"";
        match parse(text).unwrap() {
            AgentOutput::Action(action) => {
                assert_eq!(action.tool, "tavily_search");
                assert_eq!(action.input, "rust async");
                assert_eq!(action.log, text);
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn multiline_json_input_is_kept_whole() {
        let text = "Action: news_everything\nAction Input: {\n  \"q\": \"ai\",\n  \"page_size\": 3\n}\n";
        match parse(text).unwrap() {
            AgentOutput::Action(action) => {
                assert_eq!(action.tool, "news_everything");
                assert_eq!(action.input, "{\n  \"q\": \"ai\",\n  \"page_size\": 3\n}");
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn answer_and_action_together_are_rejected() {
        let answer_first = "Thought: x\nFinal Answer: 42\nAction: tavily_search\nAction Input: rust";
        assert_eq!(parse(answer_first), Err(ParseError::AnswerAndAction));

        let action_first = "Thought: x\nAction: tavily_search\nAction Input: rust\nFinal Answer: 42";
        assert_eq!(parse(action_first), Err(ParseError::AnswerAndAction));
    }

    #[test]
    fn answer_with_dangling_action_label_is_still_an_answer() {
        let text = "Thought: no Action: needed\nFinal Answer: 42";
        assert_eq!(parse(text).unwrap(), AgentOutput::Finish("42".to_string()));
    }

    #[test]
    fn malformed_output_reports_what_is_missing() {
        assert_eq!(parse("I think the answer is 4"), Err(ParseError::MissingAction));
        assert_eq!(
            parse("Thought: look it up\nAction: tavily_search"),
            Err(ParseError::MissingActionInput)
        );
    }
}
