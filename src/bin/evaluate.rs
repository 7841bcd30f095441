//! Batch evaluation of the research agent over the fixed question suite.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use research_agent::config::parse_iteration_cap;
use research_agent::eval::{TEST_QUERIES, run_suite, write_report};
use research_agent::{AgentConfig, ReasoningLoop};

#[derive(Parser, Debug)]
#[command(name = "evaluate", about = "Evaluate the Research Assistant Agent")]
struct Args {
    /// Model to use (default: MODEL_NAME from the environment or gpt-4o)
    #[arg(long)]
    model: Option<String>,

    /// Maximum planner iterations per question
    #[arg(long, value_parser = parse_iteration_cap)]
    max_iterations: Option<usize>,

    /// Where to write the JSON report
    #[arg(long, default_value = "evaluation_results.json")]
    output: PathBuf,
}

fn truncate(answer: &str, max_chars: usize) -> String {
    if answer.chars().count() > max_chars {
        format!("{}...", answer.chars().take(max_chars).collect::<String>())
    } else {
        answer.to_string()
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    research_agent::init_tracing();

    let args = Args::parse();

    let mut config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!("Please set it in your environment or in a .env file.");
            std::process::exit(1);
        }
    };
    if let Some(model) = args.model {
        config.model_name = model;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    config.verbose = false;

    println!(
        "Initializing Research Assistant Agent with model: {}",
        config.model_name
    );
    let mut agent = ReasoningLoop::from_config(&config)?;

    let total = TEST_QUERIES.len();
    println!("\nEvaluating agent on {total} queries...\n");

    let report = run_suite(&mut agent, TEST_QUERIES, |index, result| {
        let yes_no = |b: bool| if b { "Yes".green() } else { "No".red() };
        println!("Query {}/{}: {}", index + 1, total, result.query);
        println!("  Tools called: {}", result.called_tools.join(", "));
        println!("  Expected tools: {}", result.expected_tools.join(", "));
        println!("  Used expected tools: {}", yes_no(result.used_expected_tools));
        println!("  Execution time: {:.2} seconds", result.execution_time);
        match &result.error {
            Some(error) => println!("  {} {}", "Error:".red(), error),
            None => println!("  Answer: {}", truncate(&result.answer, 100)),
        }
        println!();
    });

    let s = &report.summary;
    println!("\n{}", "===== EVALUATION SUMMARY =====".bold());
    println!("Total queries: {}", s.total_queries);
    println!(
        "Exact tool matches: {}/{} ({:.1}%)",
        s.exact_tool_matches, s.total_queries, s.exact_tool_match_percentage
    );
    println!(
        "Queries with tool usage: {}/{} ({:.1}%)",
        s.queries_with_tool_usage, s.total_queries, s.tool_usage_percentage
    );
    println!("Failed queries: {}", s.failed_queries);
    println!("Median execution time: {:.2} seconds", s.median_execution_time);
    println!("P90 execution time: {:.2} seconds", s.p90_execution_time);
    println!("Average execution time: {:.2} seconds", s.average_execution_time);

    write_report(&report, &args.output)?;
    println!("\nDetailed results saved to {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_cap_override_is_validated() {
        let args = Args::try_parse_from(["evaluate", "--max-iterations", "5"]).unwrap();
        assert_eq!(args.max_iterations, Some(5));
        assert_eq!(args.output, PathBuf::from("evaluation_results.json"));

        let err = Args::try_parse_from(["evaluate", "--max-iterations", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn long_answers_are_truncated() {
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
