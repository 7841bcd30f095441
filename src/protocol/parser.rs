// src/protocol/parser.rs

use crate::protocol::PlanStep;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*:\s*(.*?)\s*Action\s*Input\s*:\s*(.*)").expect("static action regex")
});
static ACTION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action\s*:").expect("static action regex"));
static ACTION_INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action\s*Input\s*:").expect("static action input regex"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanParseError {
    #[error("Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,

    #[error("'Action:' does not name a tool")]
    EmptyToolName,

    #[error("Output contains both a final answer and an action")]
    ConflictingOutput,
}

impl PlanParseError {
    /// Observation text shown to the planner so it can correct itself.
    pub fn as_observation(&self) -> String {
        format!("Invalid Format: {self}")
    }
}

/// Parse raw planner text into a [`PlanStep`].
///
/// Accepts `Thought:/Action:/Action Input:` or `Thought:/Final Answer:`,
/// tolerating surrounding whitespace. Anything else is a [`PlanParseError`].
pub fn parse_plan_step(text: &str) -> Result<PlanStep, PlanParseError> {
    let has_final_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if has_final_answer {
            return Err(PlanParseError::ConflictingOutput);
        }

        let tool = caps[1].trim();
        if tool.is_empty() {
            return Err(PlanParseError::EmptyToolName);
        }

        let raw_input = &caps[2];
        // The model sometimes runs past the stop sequence and invents an observation.
        let raw_input = raw_input
            .split("\nObservation")
            .next()
            .unwrap_or(raw_input);
        let input = raw_input.trim().trim_matches('"').trim();

        let thought = thought_before(text, caps.get(0).map_or(0, |m| m.start()));

        return Ok(PlanStep::Action {
            tool: tool.to_string(),
            input: input.to_string(),
            thought,
        });
    }

    if has_final_answer {
        let answer = text
            .rsplit(FINAL_ANSWER_MARKER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        let thought = thought_before(text, text.find(FINAL_ANSWER_MARKER).unwrap_or(0));
        return Ok(PlanStep::Finish { answer, thought });
    }

    if !ACTION_ONLY_RE.is_match(text) {
        return Err(PlanParseError::MissingAction);
    }
    if !ACTION_INPUT_RE.is_match(text) {
        return Err(PlanParseError::MissingActionInput);
    }

    Err(PlanParseError::MissingAction)
}

fn thought_before(text: &str, end: usize) -> String {
    let head = text[..end].trim();
    head.strip_prefix("Thought:").unwrap_or(head).trim().to_string()
}
