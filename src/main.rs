// src/main.rs

mod artifacts;
mod cli;
mod error;
#[cfg(test)]
mod fixtures;
mod history;
mod model;
mod orchestrator;
mod runner;
mod sampler;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let start_time = Instant::now();
    let result = run(&args);
    ExitCode::from(report(&result, &args, start_time.elapsed()))
}

fn run(args: &Args) -> anyhow::Result<model::RunSummary> {
    orchestrator::run(args).with_context(|| {
        format!(
            "Failed to run {} on history of {}",
            args.script.display(),
            args.repo.display()
        )
    })
}

/// Prints the outcome and picks the exit status: 0 once every sampled commit
/// was processed, whatever the script reported for it, 1 on a fatal error.
fn report(result: &anyhow::Result<model::RunSummary>, args: &Args, elapsed: Duration) -> u8 {
    match result {
        Ok(summary) => {
            println!(
                "Processed {} of {} commits in {:.2?} ({} with errors). Artefacts saved to {}.",
                summary.processed,
                summary.total_commits,
                elapsed,
                summary.failed,
                args.output.display()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
