// src/tools/mod.rs

/// Name and description advertised to the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Trait that defines a lookup tool usable by the reasoning loop.
///
/// `execute` never fails: adapter errors are rendered into the returned text,
/// since every output is fed back to the planner as an observation.
pub trait Tool {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn execute(&self, input: &str) -> String;

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.name(), self.description())
    }
}

pub mod calculator;
pub mod math_expr;
pub mod registry;
pub mod weather;
pub mod wikipedia;

pub use calculator::CalculatorTool;
pub use registry::{RegistryError, ToolNotFound, ToolRegistry};
pub use weather::WeatherTool;
pub use wikipedia::WikipediaTool;
