//! Research Agent - command-line entry point.
//!
//! Answers a single `--query`, or runs an interactive session.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use research_agent::config::parse_iteration_cap;
use research_agent::eval::format_duration;
use research_agent::{AgentConfig, ReasoningLoop};

#[derive(Parser, Debug)]
#[command(name = "research-agent", about = "Research Assistant Agent CLI")]
struct Args {
    /// Model to use (default: MODEL_NAME from the environment or gpt-4o)
    #[arg(long)]
    model: Option<String>,

    /// Print the thought/action/observation trace
    #[arg(long)]
    verbose: bool,

    /// Maximum planner iterations per question
    #[arg(long, value_parser = parse_iteration_cap)]
    max_iterations: Option<usize>,

    /// Single question to answer; starts an interactive session when omitted
    #[arg(long)]
    query: Option<String>,
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
    config.verbose |= args.verbose;

    println!(
        "Initializing Research Assistant Agent with model: {}",
        config.model_name
    );
    let mut agent = ReasoningLoop::from_config(&config)?;

    if let Some(query) = args.query {
        let start = Instant::now();
        let answer = agent.run(&query)?;
        println!("\n{} {}", "Final Answer:".green().bold(), answer);
        println!("Time taken: {}", format_duration(start.elapsed()));
        return Ok(());
    }

    println!("\nResearch Assistant Agent ready! Type 'exit' or 'quit' to end the session, 'clear' to forget the conversation.");
    println!("Ask a question to get started...\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nQuestion: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let query = line?;
        let query = query.trim();

        match query.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("Goodbye!");
                break;
            }
            "clear" => {
                agent.clear_memory();
                println!("Conversation cleared.");
                continue;
            }
            "" => continue,
            _ => {}
        }

        let start = Instant::now();
        match agent.run(query) {
            Ok(answer) => {
                println!("\n{} {}", "Final Answer:".green().bold(), answer);
                println!("Time taken: {}", format_duration(start.elapsed()));
            }
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    Ok(())
}
