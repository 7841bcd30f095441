// src/eval/mod.rs

//! Batch evaluation: run a fixed question suite and report tool usage and latency.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::agent::Agent;

/// A question and the tools a good run is expected to use.
#[derive(Debug, Clone)]
pub struct EvalCase {
    pub query: &'static str,
    pub expected_tools: &'static [&'static str],
}

pub const TEST_QUERIES: &[EvalCase] = &[
    EvalCase {
        query: "Who is the CEO of Microsoft?",
        expected_tools: &["WikipediaTool"],
    },
    EvalCase {
        query: "What is 15 squared plus 27?",
        expected_tools: &["CalculatorTool"],
    },
    EvalCase {
        query: "What's the current weather in London?",
        expected_tools: &["WeatherTool"],
    },
    EvalCase {
        query: "What was the population of Japan in 2020 divided by 100?",
        expected_tools: &["WikipediaTool", "CalculatorTool"],
    },
    EvalCase {
        query: "If the distance from Los Angeles to New York is about 2,800 miles, how many kilometers is that?",
        expected_tools: &["CalculatorTool"],
    },
    EvalCase {
        query: "What's the capital of France and what's the current temperature there?",
        expected_tools: &["WikipediaTool", "WeatherTool"],
    },
    EvalCase {
        query: "What was the population of India in 2020 squared?",
        expected_tools: &["WikipediaTool", "CalculatorTool"],
    },
    EvalCase {
        query: "What's the square root of the distance in kilometers between Tokyo and Seoul?",
        expected_tools: &["WikipediaTool", "CalculatorTool"],
    },
    EvalCase {
        query: "Is it currently raining in Seattle?",
        expected_tools: &["WeatherTool"],
    },
    EvalCase {
        query: "What's the current temperature in Celsius in New York and what's its population?",
        expected_tools: &["WikipediaTool", "WeatherTool"],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct EvalResult {
    pub query: String,
    pub expected_tools: Vec<String>,
    pub called_tools: Vec<String>,
    pub used_expected_tools: bool,
    pub used_tool: bool,
    pub execution_time: f64,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    pub total_queries: usize,
    pub exact_tool_matches: usize,
    pub exact_tool_match_percentage: f64,
    pub queries_with_tool_usage: usize,
    pub tool_usage_percentage: f64,
    pub failed_queries: usize,
    pub median_execution_time: f64,
    pub p90_execution_time: f64,
    pub average_execution_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub results: Vec<EvalResult>,
    pub summary: EvalSummary,
}

/// Run one case on `agent`, starting from an empty conversation.
pub fn run_case<A: Agent>(agent: &mut A, case: &EvalCase) -> EvalResult {
    agent.reset();

    let start = Instant::now();
    let outcome = agent.ask(case.query);
    let elapsed = start.elapsed();

    let expected_tools: Vec<String> = case.expected_tools.iter().map(|t| t.to_string()).collect();

    let (called_tools, answer, error) = match outcome {
        Ok(outcome) => {
            let called: BTreeSet<String> = outcome.tool_calls.into_iter().map(|c| c.tool).collect();
            (called.into_iter().collect::<Vec<_>>(), outcome.answer, None)
        }
        Err(e) => {
            tracing::warn!(query = case.query, error = %e, "evaluation query failed");
            (Vec::new(), String::new(), Some(e.to_string()))
        }
    };

    EvalResult {
        query: case.query.to_string(),
        used_expected_tools: expected_tools.iter().all(|t| called_tools.contains(t)),
        used_tool: !called_tools.is_empty(),
        expected_tools,
        called_tools,
        execution_time: elapsed.as_secs_f64(),
        answer,
        error,
    }
}

/// Run every case, calling `on_result` after each one.
pub fn run_suite<A, F>(agent: &mut A, cases: &[EvalCase], mut on_result: F) -> EvalReport
where
    A: Agent,
    F: FnMut(usize, &EvalResult),
{
    let mut results = Vec::with_capacity(cases.len());
    for (index, case) in cases.iter().enumerate() {
        let result = run_case(agent, case);
        on_result(index, &result);
        results.push(result);
    }
    let summary = summarize(&results);
    EvalReport { results, summary }
}

/// Nearest-rank percentile over `sorted`, `p` in `0.0..=1.0`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

pub fn summarize(results: &[EvalResult]) -> EvalSummary {
    let total = results.len();
    let exact = results.iter().filter(|r| r.used_expected_tools).count();
    let with_tools = results.iter().filter(|r| r.used_tool).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();

    let mut times: Vec<f64> = results.iter().map(|r| r.execution_time).collect();
    times.sort_by(|a, b| a.total_cmp(b));

    let pct = |n: usize| if total == 0 { 0.0 } else { n as f64 * 100.0 / total as f64 };
    let average = if total == 0 {
        0.0
    } else {
        times.iter().sum::<f64>() / total as f64
    };

    EvalSummary {
        total_queries: total,
        exact_tool_matches: exact,
        exact_tool_match_percentage: pct(exact),
        queries_with_tool_usage: with_tools,
        tool_usage_percentage: pct(with_tools),
        failed_queries: failed,
        median_execution_time: times.get(total / 2).copied().unwrap_or(0.0),
        p90_execution_time: percentile(&times, 0.9),
        average_execution_time: average,
    }
}

pub fn write_report(report: &EvalReport, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn format_duration(duration: Duration) -> String {
    format!("{:.2} seconds", duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, RunOutcome, Termination, ToolCall};

    /// Answers from a fixed table of tool calls per question.
    struct TableAgent {
        resets: usize,
    }

    impl Agent for TableAgent {
        fn ask(&mut self, question: &str) -> Result<RunOutcome, AgentError> {
            let tools: &[&str] = match question {
                "Who is the CEO of Microsoft?" => &["WikipediaTool", "WikipediaTool"],
                "What is 15 squared plus 27?" => &["CalculatorTool"],
                "Is it currently raining in Seattle?" => return Err(AgentError::EmptyQuestion),
                _ => &[],
            };
            Ok(RunOutcome {
                answer: format!("answer to {question}"),
                iterations: tools.len() + 1,
                tool_calls: tools
                    .iter()
                    .map(|t| ToolCall {
                        tool: t.to_string(),
                        input: question.to_string(),
                    })
                    .collect(),
                termination: Termination::Finished,
            })
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn result(time: f64, used_expected: bool, used_tool: bool) -> EvalResult {
        EvalResult {
            query: "q".into(),
            expected_tools: vec![],
            called_tools: vec![],
            used_expected_tools: used_expected,
            used_tool,
            execution_time: time,
            answer: String::new(),
            error: None,
        }
    }

    #[test]
    fn run_case_deduplicates_called_tools() {
        let mut agent = TableAgent { resets: 0 };
        let result = run_case(&mut agent, &TEST_QUERIES[0]);

        assert_eq!(result.called_tools, vec!["WikipediaTool".to_string()]);
        assert!(result.used_expected_tools);
        assert!(result.used_tool);
        assert_eq!(agent.resets, 1);
    }

    #[test]
    fn missing_expected_tool_is_not_a_match() {
        let mut agent = TableAgent { resets: 0 };
        let result = run_case(&mut agent, &TEST_QUERIES[3]);

        assert!(!result.used_expected_tools);
        assert!(!result.used_tool);
    }

    #[test]
    fn failed_query_is_recorded_not_fatal() {
        let mut agent = TableAgent { resets: 0 };
        let report = run_suite(&mut agent, TEST_QUERIES, |_, _| {});

        assert_eq!(report.results.len(), 10);
        assert_eq!(agent.resets, 10);
        assert_eq!(report.summary.failed_queries, 1);
        assert_eq!(report.summary.exact_tool_matches, 2);
        assert_eq!(report.summary.queries_with_tool_usage, 2);
        assert_eq!(report.summary.tool_usage_percentage, 20.0);
        let failed = &report.results[8];
        assert_eq!(failed.error.as_deref(), Some("Question must not be empty"));
    }

    #[test]
    fn summary_statistics() {
        let results: Vec<_> = [5.0, 1.0, 3.0, 2.0, 4.0]
            .into_iter()
            .enumerate()
            .map(|(i, t)| result(t, i % 2 == 0, i != 4))
            .collect();
        let summary = summarize(&results);

        assert_eq!(summary.total_queries, 5);
        assert_eq!(summary.exact_tool_matches, 3);
        assert_eq!(summary.exact_tool_match_percentage, 60.0);
        assert_eq!(summary.queries_with_tool_usage, 4);
        assert_eq!(summary.median_execution_time, 3.0);
        assert_eq!(summary.p90_execution_time, 5.0);
        assert_eq!(summary.average_execution_time, 3.0);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_queries, 0);
        assert_eq!(summary.median_execution_time, 0.0);
        assert_eq!(summary.tool_usage_percentage, 0.0);
    }

    #[test]
    fn percentile_uses_nearest_rank() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&sorted, 0.5), 5.0);
        assert_eq!(percentile(&sorted, 0.9), 9.0);
        assert_eq!(percentile(&sorted, 1.0), 10.0);
        assert_eq!(percentile(&sorted, 0.0), 1.0);
    }

    #[test]
    fn report_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluation_results.json");
        let report = EvalReport {
            results: vec![result(1.5, true, true)],
            summary: summarize(&[result(1.5, true, true)]),
        };

        write_report(&report, &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["total_queries"], 1);
        assert_eq!(written["results"][0]["execution_time"], 1.5);
        assert!(written["results"][0].get("error").is_none());
    }
}
