// src/protocol/mod.rs

//! The text contract between the planner and the reasoning loop.

pub mod parser;
pub mod prompt;

pub use parser::{PlanParseError, parse_plan_step};
pub use prompt::{OBSERVATION_STOP, render_planning_prompt, render_scratchpad};

/// What the planner decided to do in one iteration.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanStep {
    Action {
        tool: String,
        input: String,
        thought: String,
    },
    Finish {
        answer: String,
        thought: String,
    },
}

impl PlanStep {
    pub fn thought(&self) -> &str {
        match self {
            PlanStep::Action { thought, .. } | PlanStep::Finish { thought, .. } => thought,
        }
    }
}

/// Text fed back to the planner after a step. `tool` is `None` when the step
/// never reached a tool (unparseable planner output).
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub tool: Option<String>,
    pub output: String,
}

/// One planner turn of the scratch transcript: the raw planner text and the
/// observation recorded for it.
#[derive(Clone, Debug, PartialEq)]
pub struct ScratchEntry {
    pub log: String,
    pub observation: Observation,
}
