// src/agent/reasoning_loop.rs

use std::sync::Arc;

use colored::Colorize;

use crate::agent::{Agent, AgentError, RunOutcome, Termination, ToolCall};
use crate::config::{AgentConfig, DEFAULT_MAX_ITERATIONS};
use crate::memory::{ConversationMemory, Memory};
use crate::model::{LanguageModel, OpenAiChatModel};
use crate::protocol::{
    OBSERVATION_STOP, Observation, PlanStep, ScratchEntry, parse_plan_step, render_planning_prompt,
};
use crate::tools::weather::OpenMeteoClient;
use crate::tools::wikipedia::WikipediaClient;
use crate::tools::{CalculatorTool, ToolRegistry, WeatherTool, WikipediaTool};

/// Where a run is between planner calls.
#[derive(Clone, Debug, PartialEq)]
pub enum LoopState {
    Planning,
    Acting {
        log: String,
        tool: String,
        input: String,
    },
    Finished(String),
    Aborted,
}

pub struct ReasoningLoop {
    llm: Arc<dyn LanguageModel>,
    tools: ToolRegistry,
    memory: ConversationMemory,
    max_iterations: usize,
    verbose: bool,
}

impl ReasoningLoop {
    pub fn new(llm: Arc<dyn LanguageModel>, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools,
            memory: ConversationMemory::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }

    /// Wire the OpenAI planner and the default Wikipedia, calculator and weather tools.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiChatModel::new(
            &config.api_key,
            &config.model_name,
            config.temperature,
            &config.llm_base_url,
        )?);

        let endpoints = &config.endpoints;
        let tools = ToolRegistry::new()
            .register(WikipediaTool::new(WikipediaClient::new(&endpoints.wikipedia_api)?))?
            .register(CalculatorTool::new(Arc::clone(&llm)))?
            .register(WeatherTool::new(OpenMeteoClient::new(
                &endpoints.geocoding_api,
                &endpoints.forecast_api,
            )?))?;

        Ok(Self::new(llm, tools)
            .with_max_iterations(config.max_iterations)
            .with_verbose_trace(config.verbose))
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_verbose_trace(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_memory(mut self, memory: ConversationMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Answer one question.
    pub fn run(&mut self, question: &str) -> Result<String, AgentError> {
        self.run_detailed(question).map(|outcome| outcome.answer)
    }

    /// Answer one question and report how the run went.
    pub fn run_detailed(&mut self, question: &str) -> Result<RunOutcome, AgentError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::EmptyQuestion);
        }

        let specs = self.tools.specs();
        let history = self.memory.render();
        let mut scratch: Vec<ScratchEntry> = Vec::new();
        let mut tool_calls = Vec::new();
        let mut iterations = 0;
        let mut state = LoopState::Planning;

        if self.verbose {
            eprintln!("\n{} {}", "Question:".bold(), question);
        }

        let (answer, termination) = loop {
            state = match state {
                LoopState::Planning if iterations >= self.max_iterations => LoopState::Aborted,
                LoopState::Planning => {
                    iterations += 1;
                    tracing::debug!(iteration = iterations, "planning");

                    let prompt = render_planning_prompt(&specs, &history, question, &scratch);
                    let raw = self.llm.complete(&prompt, &[OBSERVATION_STOP])?;
                    if self.verbose {
                        eprintln!("{}", raw.green());
                    }

                    match parse_plan_step(&raw) {
                        Ok(step) => {
                            tracing::debug!(thought = step.thought(), "planner step");
                            match step {
                                PlanStep::Finish { answer, .. } => LoopState::Finished(answer),
                                PlanStep::Action { tool, input, .. } => {
                                    tracing::debug!(%tool, %input, "planner chose action");
                                    LoopState::Acting {
                                        log: raw,
                                        tool,
                                        input,
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "unparseable planner output");
                            self.record(
                                &mut scratch,
                                raw,
                                Observation {
                                    tool: None,
                                    output: e.as_observation(),
                                },
                            );
                            LoopState::Planning
                        }
                    }
                }
                LoopState::Acting { log, tool, input } => {
                    let output = match self.tools.get(&tool) {
                        Ok(handler) => {
                            tool_calls.push(ToolCall {
                                tool: tool.clone(),
                                input: input.clone(),
                            });
                            handler.execute(&input)
                        }
                        Err(not_found) => {
                            tracing::warn!(%tool, "planner named an unknown tool");
                            not_found.to_string()
                        }
                    };
                    self.record(
                        &mut scratch,
                        log,
                        Observation {
                            tool: Some(tool),
                            output,
                        },
                    );
                    LoopState::Planning
                }
                LoopState::Finished(answer) => break (answer, Termination::Finished),
                LoopState::Aborted => {
                    tracing::warn!(iterations, "iteration limit reached without a final answer");
                    break (degraded_answer(iterations, &scratch), Termination::IterationLimit);
                }
            };
        };

        if self.verbose {
            eprintln!("{} {}", "Final Answer:".bold(), answer.cyan());
        }
        tracing::info!(iterations, tools = tool_calls.len(), ?termination, "question answered");

        self.memory.record_exchange(question, &answer);

        Ok(RunOutcome {
            answer,
            iterations,
            tool_calls,
            termination,
        })
    }

    fn record(&self, scratch: &mut Vec<ScratchEntry>, log: String, observation: Observation) {
        if self.verbose {
            match &observation.tool {
                Some(tool) => eprintln!(
                    "{} {}",
                    format!("Observation ({tool}):").bold(),
                    observation.output.yellow()
                ),
                None => eprintln!("{} {}", "Observation:".bold(), observation.output.red()),
            }
        }
        scratch.push(ScratchEntry { log, observation });
    }
}

fn degraded_answer(iterations: usize, scratch: &[ScratchEntry]) -> String {
    match scratch.last() {
        Some(entry) => format!(
            "Agent stopped after {iterations} iterations without a final answer. Last observation: {}",
            entry.observation.output
        ),
        None => format!("Agent stopped after {iterations} iterations without a final answer."),
    }
}

impl Agent for ReasoningLoop {
    fn ask(&mut self, question: &str) -> Result<RunOutcome, AgentError> {
        self.run_detailed(question)
    }

    fn reset(&mut self) {
        self.clear_memory();
    }
}
