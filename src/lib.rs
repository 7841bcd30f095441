//! # Research Agent
//!
//! A question-answering agent that reasons in a loop over three lookup tools:
//! Wikipedia search, a language-model-backed calculator, and Open-Meteo weather.
//!
//! The agent follows the "think, act, observe" pattern:
//! 1. Render a planning prompt with the tool catalog, conversation history and question
//! 2. Parse the model's reply into either a tool action or a final answer
//! 3. Execute the tool and feed its output back as an observation
//! 4. Stop on a final answer, or with a degraded answer at the iteration cap
//!
//! ## Example
//!
//! ```rust,ignore
//! use research_agent::{AgentConfig, ReasoningLoop};
//!
//! let config = AgentConfig::from_env()?;
//! let mut agent = ReasoningLoop::from_config(&config)?;
//! let answer = agent.run("What's the current weather in London?")?;
//! ```

pub mod agent;
pub mod config;
pub mod eval;
pub mod memory;
pub mod model;
pub mod protocol;
pub mod tools;

pub use agent::{Agent, AgentError, ReasoningLoop, RunOutcome, Termination};
pub use config::AgentConfig;

/// Install the stderr log subscriber used by the binaries.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "research_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
