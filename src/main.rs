use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use voicescreen::{Pipeline, PipelineConfig};

/// Voice-recording risk screening: analyze a clip and print the report
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the recording to analyze (WAV)
    audio: PathBuf,

    /// Path to the classifier artifact (JSON); omit for heuristic scoring
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Skip acoustic extraction and score simulated features
    #[arg(long)]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = PipelineConfig {
        model_path: args.model,
        extraction_enabled: !args.simulate,
        ..Default::default()
    };

    let pipeline = Pipeline::new(config);
    let status = pipeline.status();
    info!(
        "pipeline ready: extraction {}, model {}",
        if status.extraction_enabled { "enabled" } else { "disabled" },
        if status.model_loaded { "loaded" } else { "absent" },
    );

    let report = pipeline.analyze(&args.audio);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
