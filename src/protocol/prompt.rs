// src/protocol/prompt.rs

use crate::protocol::ScratchEntry;
use crate::tools::ToolSpec;

/// Stop sequence for planning calls; observations always come from tools.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// Render the scratch transcript the way the planner is told to write it.
pub fn render_scratchpad(entries: &[ScratchEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{}\nObservation: {}\nThought: ",
                entry.log, entry.observation.output
            )
        })
        .collect()
}

/// Build the full planning prompt for one iteration.
pub fn render_planning_prompt(
    tools: &[ToolSpec],
    chat_history: &str,
    question: &str,
    scratchpad: &[ScratchEntry],
) -> String {
    let tool_descriptions = tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let agent_scratchpad = render_scratchpad(scratchpad);

    format!(
        r#"You are an advanced Research Assistant Agent that can answer complex questions by using external tools.
You have access to the following tools:

{tool_descriptions}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Previous conversation history:
{chat_history}

Question: {question}
{agent_scratchpad}"#
    )
}
