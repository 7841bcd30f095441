// src/tools/registry.rs

use crate::tools::{Tool, ToolSpec};
use thiserror::Error;

/// The planner named a tool that is not registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{name} is not a valid tool, try one of [{}].", .available.join(", "))]
pub struct ToolNotFound {
    pub name: String,
    pub available: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateName(String),
}

/// Fixed, ordered set of tools. Order only affects how the catalog is listed.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool + Send + Sync>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Add a tool; names must be unique.
    pub fn register<T: Tool + Send + Sync + 'static>(mut self, tool: T) -> Result<Self, RegistryError> {
        if self.tools.iter().any(|t| t.name() == tool.name()) {
            return Err(RegistryError::DuplicateName(tool.name().to_string()));
        }
        self.tools.push(Box::new(tool));
        Ok(self)
    }

    /// Case-sensitive exact lookup.
    pub fn get(&self, name: &str) -> Result<&(dyn Tool + Send + Sync), ToolNotFound> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| ToolNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool(&'static str);

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echoes the input back"
        }

        fn execute(&self, input: &str) -> String {
            format!("{}: {}", self.0, input)
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .register(EchoTool("WikipediaTool"))
            .and_then(|r| r.register(EchoTool("CalculatorTool")))
            .and_then(|r| r.register(EchoTool("WeatherTool")))
            .unwrap()
    }

    #[test]
    fn every_registered_name_resolves() {
        let registry = registry();
        for name in registry.names() {
            let tool = registry.get(&name).unwrap();
            assert_eq!(tool.name(), name);
        }
    }

    #[test]
    fn unknown_or_differently_cased_names_fail() {
        let registry = registry();
        for name in ["wikipediatool", "Wikipedia", "", "WeatherTool "] {
            let err = registry.get(name).err().unwrap();
            assert_eq!(err.name, name);
        }
    }

    #[test]
    fn not_found_message_lists_available_tools() {
        let err = registry().get("SearchTool").err().unwrap();
        assert_eq!(
            err.to_string(),
            "SearchTool is not a valid tool, try one of [WikipediaTool, CalculatorTool, WeatherTool]."
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ToolRegistry::new()
            .register(EchoTool("WeatherTool"))
            .and_then(|r| r.register(EchoTool("WeatherTool")))
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::DuplicateName("WeatherTool".into()));
    }

    #[test]
    fn specs_keep_insertion_order() {
        let names: Vec<_> = registry().specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["WikipediaTool", "CalculatorTool", "WeatherTool"]);
    }
}
