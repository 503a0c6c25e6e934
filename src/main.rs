// ==============================================================================
// main.rs - Variant Annotator Entry Point
// ==============================================================================
// Description: Annotates a variant file with gene names and writes a TSV table
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use variant_annotator::config::AnnotatorConfig;
use variant_annotator::AnnotationPipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input variant file (.vcf or .vcf.gz)
    input: PathBuf,

    /// Output annotated table (tab-delimited)
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "variant_annotator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    info!("Variant Annotator starting...");

    let config = AnnotatorConfig::from_env().context("Invalid annotator configuration")?;
    info!(
        "Sources: {} ({}/s), {} ({}/s); {} workers; errors -> {:?}",
        config.ensembl_url,
        config.ensembl_rate,
        config.ncbi_url,
        config.ncbi_rate,
        config.workers,
        config.error_log
    );

    let pipeline = AnnotationPipeline::new(&config)?.with_progress(true);

    match pipeline.run(&args.input, &args.output).await {
        Ok(summary) => {
            println!(
                "Annotated {} variants ({} with genes). Output saved to {}",
                summary.records,
                summary.annotated,
                summary.output.display()
            );
            if summary.errors_logged > 0 {
                println!(
                    "{} lookup errors logged to {}",
                    summary.errors_logged,
                    config.error_log.display()
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("Annotation failed: {:#}", e);
            Err(e)
        }
    }
}
