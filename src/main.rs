use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ocrpipe::detection::ocr::default_model_dir;
use ocrpipe::{
    ImageSource, OcrPipeline, OcrsEngine, PipelineOptions, ProcessStats, RecognitionResult,
    visualize,
};

#[derive(Parser)]
#[command(name = "ocrpipe")]
#[command(about = "Detect and recognize text in an image")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Runtime option file (`key value` per line)
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Character dictionary (one symbol per line)
    #[arg(long, value_name = "FILE")]
    dict: PathBuf,

    /// Pipeline tunables in TOML
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Directory holding the ocrs models (defaults to ~/.cache/ocrs)
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Write the image with region outlines drawn on it
    #[arg(long, value_name = "FILE")]
    annotate: Option<PathBuf>,

    /// Save rectified crops to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    image: &'a PathBuf,
    results: &'a [RecognitionResult],
    stats: &'a ProcessStats,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let model_dir = match args.model_dir {
        Some(dir) => dir,
        None => default_model_dir()?,
    };
    info!("Loading OCR models from {}", model_dir.display());
    let engine = Arc::new(OcrsEngine::from_model_dir(&model_dir)?);

    let mut pipeline = OcrPipeline::new(
        engine.clone(),
        None,
        engine,
        &args.config,
        &args.dict,
    )?;

    if let Some(path) = &args.options {
        pipeline = pipeline.with_options(PipelineOptions::from_toml_file(path)?);
    }

    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let report = pipeline.try_process(ImageSource::File(args.image_path.clone()))?;

    if let Some(path) = &args.annotate {
        if let Err(e) = visualize::annotate(&report.working_image, &report.regions, path) {
            warn!("Visualization failed: {:#}", e);
        }
    }

    if args.json {
        let output = JsonOutput {
            image: &args.image_path,
            results: &report.results,
            stats: &report.stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n=== Text Recognition Results ===");
    println!(
        "Regions detected: {}, accepted: {}",
        report.stats.detected, report.stats.accepted
    );

    if report.results.is_empty() {
        println!("No text recognized.");
    } else {
        println!("\nRecognized text:");
        for (i, result) in report.results.iter().enumerate() {
            println!("  {}. {} - confidence: {:.2}", i + 1, result.text, result.score);
        }
    }

    if args.verbose {
        println!(
            "\nTiming: detect {:.1} ms, recognize {:.1} ms, total {:.1} ms",
            report.stats.detect_ms, report.stats.recognize_ms, report.stats.total_ms
        );
    }

    Ok(())
}
