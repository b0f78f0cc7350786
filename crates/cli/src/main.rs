//! SummaWorks CLI entry point.
//!
//! This binary is the composition root for the whole system:
//!
//! 1. **Parse configuration** — load `summaworks.toml` (defaults when
//!    absent) and take the API key from the configured environment variable.
//! 2. **Wire observability** — `tracing-subscriber` with an `EnvFilter`, so
//!    `RUST_LOG=pipeline=debug` shows the per-node traversal events emitted
//!    by every crate in the workspace.
//! 3. **Construct infrastructure** — build the [`llm::OpenAiProvider`] and
//!    inject it into [`agents::Summarizer`].
//! 4. **Process** — read the input file, run one `process` call, print the
//!    outcome (readable report by default, `--json` for the full record).

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agents::Summarizer;
use llm::OpenAiProvider;

use config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "summaworks", about = "Classify a text and produce a keypoint or synthesis summary.")]
struct Args {
    /// Path of the text file to process.
    input: PathBuf,

    /// Path of the configuration file.
    #[arg(long, default_value = "summaworks.toml")]
    config: PathBuf,

    /// Print the full outcome as JSON instead of a readable report.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = CliConfig::load(&args.config)?;

    let api_key = std::env::var(&config.api_key_env)
        .with_context(|| format!("environment variable {} is not set", config.api_key_env))?;
    let provider = match &config.base_url {
        Some(url) => OpenAiProvider::new(api_key).with_base_url(url.clone()),
        None => OpenAiProvider::new(api_key),
    };

    let summarizer = Summarizer::new(Arc::new(provider), config.llm_config())?;

    let input_text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input file {}", args.input.display()))?;

    let outcome = summarizer.process(&input_text).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome);
    }

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(outcome: &agents::Outcome) {
    println!("=== Result (run {}) ===", outcome.run_id);
    match (&outcome.data, &outcome.error) {
        (Some(data), _) => {
            if let Some(task) = data.get_str("selected_task_type") {
                println!("task: {task}");
            }
            if let Some(genre) = data.get_str("selected_genre_type") {
                println!("genre: {genre}");
            }
            match data.get_str("final_result_text") {
                // The result field holds serialized JSON; re-indent it for reading.
                Some(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                    Ok(value) => println!(
                        "{}",
                        serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_owned())
                    ),
                    Err(_) => println!("{raw}"),
                },
                None => println!("(no result text)"),
            }
        }
        (None, Some(error)) => {
            println!("Failed!");
            println!("{error}");
        }
        (None, None) => println!("(empty outcome)"),
    }
}
