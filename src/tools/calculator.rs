// src/tools/calculator.rs

use crate::model::{LanguageModel, ModelError};
use crate::tools::Tool;
use crate::tools::math_expr::{self, MathError};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```text\s*(.*?)\s*(?:```|$)").expect("static expression regex")
});

const OUTPUT_STOP: &str = "```output";

#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error("empty math problem")]
    EmptyInput,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{source} while evaluating \"{expression}\"")]
    Evaluation {
        expression: String,
        #[source]
        source: MathError,
    },

    #[error("unknown format from LLM: {0}")]
    UnknownFormat(String),
}

/// Math tool backed by a language model that turns the question into an
/// expression, which is then evaluated locally.
pub struct CalculatorTool {
    llm: Arc<dyn LanguageModel>,
}

impl CalculatorTool {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub fn evaluate(&self, question: &str) -> Result<String, CalculatorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CalculatorError::EmptyInput);
        }

        let prompt = format!(
            r#"Translate a math problem into a single expression that can be evaluated by a plain arithmetic evaluator.
Supported: numbers, + - * / % ^ **, parentheses, pi, e, and the functions sqrt, log (natural), log10, log2, exp, abs, sin, cos, tan, asin, acos, atan, floor, ceil, round, pow(x, y).
Do not use thousands separators, units or variables.

Use this format:

Question: ${{Question with math problem.}}
```text
${{single line mathematical expression that solves the problem}}
```
```output
${{Output of evaluating the expression}}
```
Answer: ${{Answer}}

Begin.

Question: What is 37593 * 67?
```text
37593 * 67
```
```output
2518731
```
Answer: 2518731

Question: 37593^(1/5)
```text
37593**(1/5)
```
```output
8.222831614237718
```
Answer: 8.222831614237718

Question: {question}
"#
        );

        let reply = self.llm.complete(&prompt, &[OUTPUT_STOP])?;
        tracing::debug!(%reply, "calculator chain reply");
        interpret_reply(&reply)
    }
}

/// Turn the chain's reply into `Answer: <value>`.
fn interpret_reply(reply: &str) -> Result<String, CalculatorError> {
    let reply = reply.trim();

    if let Some(caps) = EXPRESSION_RE.captures(reply) {
        let expression = caps[1].trim().to_string();
        let value = math_expr::evaluate(&expression).map_err(|source| {
            CalculatorError::Evaluation {
                expression: expression.clone(),
                source,
            }
        })?;
        return Ok(format!("Answer: {}", math_expr::format_number(value)));
    }

    if reply.starts_with("Answer:") {
        return Ok(reply.to_string());
    }

    if let Some(rest) = reply.rsplit("Answer:").next().filter(|_| reply.contains("Answer:")) {
        return Ok(format!("Answer: {}", rest.trim()));
    }

    Err(CalculatorError::UnknownFormat(reply.to_string()))
}

impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "CalculatorTool"
    }

    fn description(&self) -> &str {
        "Useful for performing mathematical calculations. Input should be a mathematical expression (e.g., \"2 + 2\", \"5 * 10\", \"sqrt(16)\", \"log(100)\"). Use this when you need to compute a numerical result."
    }

    fn execute(&self, input: &str) -> String {
        match self.evaluate(input) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "calculation failed");
                format!("Error performing calculation: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedModel {
        reply: Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    impl LanguageModel for CannedModel {
        fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, ModelError> {
            assert_eq!(stop, &[OUTPUT_STOP]);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ModelError::Api {
                    status: *status,
                    body: "rate limited".into(),
                }),
            }
        }
    }

    #[test]
    fn evaluates_translated_expression() {
        let model = CannedModel::replying("```text\n15**2 + 27\n```\n");
        let tool = CalculatorTool::new(model.clone());

        assert_eq!(tool.execute("What is 15 squared plus 27?"), "Answer: 252");
        assert!(model.prompts.lock().unwrap()[0].ends_with("Question: What is 15 squared plus 27?\n"));
    }

    #[test]
    fn direct_answer_is_passed_through() {
        let tool = CalculatorTool::new(CannedModel::replying("Answer: 42"));
        assert_eq!(tool.execute("the answer to everything"), "Answer: 42");
    }

    #[test]
    fn trailing_answer_after_prose_is_extracted() {
        let tool = CalculatorTool::new(CannedModel::replying("No evaluation needed.\nAnswer: 7"));
        assert_eq!(tool.execute("seven"), "Answer: 7");
    }

    #[test]
    fn bad_expression_becomes_error_text() {
        let tool = CalculatorTool::new(CannedModel::replying("```text\n1 / 0\n```"));
        assert_eq!(
            tool.execute("one over zero"),
            "Error performing calculation: division by zero while evaluating \"1 / 0\""
        );
    }

    #[test]
    fn unstructured_reply_becomes_error_text() {
        let tool = CalculatorTool::new(CannedModel::replying("I cannot do that."));
        assert_eq!(
            tool.execute("2 + 2"),
            "Error performing calculation: unknown format from LLM: I cannot do that."
        );
    }

    #[test]
    fn model_failure_becomes_error_text() {
        let tool = CalculatorTool::new(CannedModel::failing(429));
        let output = tool.execute("2 + 2");
        assert!(output.starts_with("Error performing calculation: Model API returned 429"));
    }

    #[test]
    fn blank_input_is_rejected_without_model_call() {
        let model = CannedModel::replying("Answer: 0");
        let tool = CalculatorTool::new(model.clone());

        assert_eq!(tool.execute("   "), "Error performing calculation: empty math problem");
        assert!(model.prompts.lock().unwrap().is_empty());
    }
}
