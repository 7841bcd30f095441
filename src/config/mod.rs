// src/config/mod.rs

//! Configuration for the research agent.
//!
//! Values come from environment variables (a `.env` file is loaded by the binaries):
//! - `OPENAI_API_KEY` - Required. Credential for the planning model.
//! - `MODEL_NAME` - Optional. Defaults to `gpt-4o`.
//! - `TEMPERATURE` - Optional. Defaults to `0`.
//! - `MAX_ITERATIONS` - Optional. Planner iteration cap, defaults to `10`.
//! - `VERBOSE` - Optional. `true`/`1` prints the reasoning trace.
//! - `OPENAI_BASE_URL` - Optional. OpenAI-compatible endpoint root.
//! - `WIKIPEDIA_API_URL`, `GEOCODING_API_URL`, `FORECAST_API_URL` - Optional service overrides.

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Base URLs of the public services the tools talk to.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoints {
    pub wikipedia_api: String,
    pub geocoding_api: String,
    pub forecast_api: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            wikipedia_api: "https://en.wikipedia.org/w/api.php".to_string(),
            geocoding_api: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_api: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

/// Agent configuration, passed explicitly into the reasoning loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Planning model credential
    pub api_key: String,

    /// Model identifier sent with every completion request
    pub model_name: String,

    /// Sampling temperature; 0 keeps planning deterministic
    pub temperature: f32,

    /// Maximum planner calls per question
    pub max_iterations: usize,

    /// Print the thought/action/observation trace
    pub verbose: bool,

    /// Root of the OpenAI-compatible API
    pub llm_base_url: String,

    pub endpoints: ServiceEndpoints,
}

impl AgentConfig {
    /// Config with defaults for everything except the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_name: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            endpoints: ServiceEndpoints::default(),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key =
            get("OPENAI_API_KEY").ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".into()))?;
        let mut config = Self::new(api_key);

        if let Some(model) = get("MODEL_NAME") {
            config.model_name = model;
        }

        if let Some(raw) = get("TEMPERATURE") {
            config.temperature = raw
                .parse::<f32>()
                .ok()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .ok_or_else(|| ConfigError::InvalidValue("TEMPERATURE".into(), raw.clone()))?;
        }

        if let Some(raw) = get("MAX_ITERATIONS") {
            config.max_iterations = parse_iteration_cap(&raw)?;
        }

        if let Some(raw) = get("VERBOSE") {
            config.verbose = parse_flag(&raw);
        }

        if let Some(url) = get("OPENAI_BASE_URL") {
            config.llm_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("WIKIPEDIA_API_URL") {
            config.endpoints.wikipedia_api = url;
        }
        if let Some(url) = get("GEOCODING_API_URL") {
            config.endpoints.geocoding_api = url;
        }
        if let Some(url) = get("FORECAST_API_URL") {
            config.endpoints.forecast_api = url;
        }

        Ok(config)
    }
}

/// Parse a planner iteration cap; it must be a positive integer.
pub fn parse_iteration_cap(raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidValue("MAX_ITERATIONS".into(), raw.to_string()))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
