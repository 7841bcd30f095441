// src/agent/mod.rs

//! The reasoning loop that answers questions with tools.
//!
//! Each question runs the "think, act, observe" cycle:
//! 1. Render the planning prompt (tools, conversation history, question, scratch transcript)
//! 2. Ask the model for the next step
//! 3. Execute the named tool and record its output as an observation
//! 4. Repeat until the model gives a final answer or the iteration cap is hit

mod reasoning_loop;

pub use reasoning_loop::{LoopState, ReasoningLoop};

use crate::model::ModelError;
use crate::tools::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Planner call failed: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Finished,
    IterationLimit,
}

/// A tool invocation that actually reached a registered tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCall {
    pub tool: String,
    pub input: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub answer: String,
    pub iterations: usize,
    pub tool_calls: Vec<ToolCall>,
    pub termination: Termination,
}

/// Request/response entry point used by the front ends.
pub trait Agent {
    fn ask(&mut self, question: &str) -> Result<RunOutcome, AgentError>;

    /// Forget the conversation so far.
    fn reset(&mut self);
}
