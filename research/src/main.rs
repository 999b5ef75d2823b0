mod config;
mod prompt;
mod research;
mod response;

use agent::Error;
use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Command-line research assistant: answers a query with web and Wikipedia
/// context and appends the structured result to the output file.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Let the model decide which tools to call instead of running the
    /// fixed search pipeline
    #[arg(long)]
    agent: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = config::Config::from_env();

    print!("What can I help you research? ");
    let _ = std::io::stdout().flush();

    let mut query = String::new();
    if std::io::stdin().read_line(&mut query).is_err() || query.trim().is_empty() {
        eprintln!("error: expected a research query on stdin");
        std::process::exit(2);
    }
    let query = query.trim();

    let llm = agent::llm::OpenAI::new(config.model.clone());
    let orchestrator = research::Orchestrator::new(llm, config);

    let result = if args.agent {
        orchestrator.run_agent(query).await
    } else {
        orchestrator.run_direct(query).await
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        if let Error::DecodeError { raw, .. } = &err {
            eprintln!("raw model output:\n{raw}");
        }
        std::process::exit(1);
    }
}
