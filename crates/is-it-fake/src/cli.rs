//! Command-line front end.
//!
//! Stands in for the upload/camera widgets: image paths are "uploads", and
//! bytes piped to stdin are a "camera" capture.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use image::DynamicImage;
use is_it_fake_preprocessing::has_supported_extension;
use serde_json::{Value, json};

use crate::{
    Analysis, AnalysisRecord, ClassificationResult, Classifier, DEFAULT_GRAY_ZONE,
    DEFAULT_THRESHOLD, Deadline, ImageInput, LazyClassifier, Mode, SortKey, TriageConfig,
    analyze_batch, analyze_bytes,
    config::{validate_gray_zone, validate_threshold},
    logging::{DEFAULT_LOG_FILTER, init_tracing, init_tracing_json},
    model::{DEFAULT_INTRA_THREADS, OnnxClassifier},
    sort_records,
};

/// Filename given to images read from stdin.
pub const CAMERA_FILENAME: &str = "camera";

const PROGRESS_WIDTH: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "is-it-fake", version)]
#[command(about = "Predict whether images are REAL or AI generated (FAKE)", long_about = None)]
pub struct Cli {
    /// Images or directories to analyze (reads one image from stdin if omitted or `-`)
    #[arg(value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Input mode
    #[arg(short, long, value_enum, default_value_t = Mode::Single)]
    pub mode: Mode,

    /// Flag as AI generated if FAKE confidence >= threshold
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Manual review zone (± around threshold)
    #[arg(short, long, default_value_t = DEFAULT_GRAY_ZONE, value_parser = parse_gray_zone)]
    pub gray_zone: f64,

    /// Ordering of batch results
    #[arg(short, long, value_enum, default_value_t = SortKey::HighestFake)]
    pub sort: SortKey,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Show the raw model output in human-readable mode
    #[arg(long)]
    pub raw: bool,

    /// Directory containing model.onnx (plus optional config.json and preprocessor_config.json)
    #[arg(long, value_name = "DIR", env = "IS_IT_FAKE_MODEL_DIR", default_value = "model")]
    pub model_dir: PathBuf,

    /// ONNX Runtime intra-op threads
    #[arg(long, default_value_t = DEFAULT_INTRA_THREADS)]
    pub threads: usize,

    /// Give up on a single classification after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable verdicts
    Human,
    /// JSON object (single) or array (batch)
    Json,
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_threshold(value).map_err(|e| e.to_string())
}

fn parse_gray_zone(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_gray_zone(value).map_err(|e| e.to_string())
}

pub fn run(cli: &Cli) -> Result<()> {
    if cli.log_json {
        init_tracing_json(DEFAULT_LOG_FILTER);
    } else {
        init_tracing(DEFAULT_LOG_FILTER);
    }

    let config = TriageConfig::new(cli.threshold, cli.gray_zone)?;
    let inputs = collect_inputs(&cli.inputs)?;
    let classifier = build_classifier(cli)?;

    let mut stdout = io::stdout().lock();
    match cli.mode {
        Mode::Single => {
            let mut inputs = inputs.into_iter();
            let input = inputs.next().context("No image supplied")?;
            let ignored = inputs.len();
            if ignored > 0 {
                tracing::warn!(
                    ignored,
                    "single mode analyzes only the first image; use --mode batch"
                );
            }
            let bytes = input
                .bytes()
                .with_context(|| format!("Failed to read {}", input.filename()))?;
            let (image, analysis) = analyze_bytes(&classifier, bytes, &config)
                .with_context(|| format!("Failed to analyze {}", input.filename()))?;
            write_single(&mut stdout, cli, input.filename(), &image, &analysis)?;
        }
        Mode::Batch => {
            if cli.format == OutputFormat::Human {
                writeln!(stdout, "{} image(s) uploaded. Analyzing...", inputs.len())?;
            }
            let mut records = analyze_batch(&classifier, inputs, &config);
            sort_records(&mut records, cli.sort);
            write_batch(&mut stdout, cli, &records)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// The classifier is only loaded when the first image needs it.
fn build_classifier(cli: &Cli) -> Result<Box<dyn Classifier>> {
    let model_dir = cli.model_dir.clone();
    let threads = cli.threads;
    let lazy = LazyClassifier::new(move || OnnxClassifier::load(&model_dir, threads));

    match cli.timeout_ms {
        Some(ms) => {
            let deadline = Deadline::new(lazy, Duration::from_millis(ms))
                .context("Failed to start timeout runtime")?;
            Ok(Box::new(deadline))
        }
        None => Ok(Box::new(lazy)),
    }
}

/// Resolve CLI paths into image inputs; directories expand to supported image files.
///
/// A file that cannot be read becomes an unreadable input, reported per item
/// by the batch. Stdin and directory listing failures are fatal.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<ImageInput>> {
    if paths.is_empty() {
        return Ok(vec![read_stdin()?]);
    }

    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        if path.as_os_str() == "-" {
            inputs.push(read_stdin()?);
        } else if path.is_dir() {
            inputs.extend(image_files_in(path)?.into_iter().map(ImageInput::load));
        } else {
            inputs.push(ImageInput::load(path));
        }
    }

    if inputs.is_empty() {
        bail!("No supported images (.jpg, .jpeg, .png, .webp) found");
    }
    Ok(inputs)
}

fn read_stdin() -> Result<ImageInput> {
    ImageInput::from_reader(CAMERA_FILENAME, io::stdin().lock())
        .context("Failed to read image from stdin")
}

fn image_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
            .path();
        if path.is_file() && has_supported_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Text progress bar for a value in `[0, 1]`; out-of-range values are clamped.
#[must_use]
pub fn progress_bar(value: f64, width: usize) -> String {
    let filled = (value.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn preview(image: Option<&DynamicImage>) -> String {
    image.map_or_else(
        || "No preview".to_string(),
        |image| format!("{}x{} RGB", image.width(), image.height()),
    )
}

fn raw_json(raw: &[ClassificationResult]) -> Value {
    serde_json::to_value(raw).unwrap_or(Value::Null)
}

fn write_raw(out: &mut impl Write, raw: &[ClassificationResult]) -> Result<()> {
    writeln!(out, "Raw model output:")?;
    writeln!(out, "{}", serde_json::to_string_pretty(&raw_json(raw))?)?;
    Ok(())
}

fn write_single(
    out: &mut impl Write,
    cli: &Cli,
    filename: &str,
    image: &DynamicImage,
    analysis: &Analysis,
) -> Result<()> {
    match cli.format {
        OutputFormat::Human => {
            writeln!(out, "File: {filename}")?;
            writeln!(out, "Input image: {}", preview(Some(image)))?;
            writeln!(out, "Verdict: {}", analysis.verdict())?;
            writeln!(
                out,
                "AI generated (FAKE) confidence: {:.3}",
                analysis.fake_score()
            )?;
            writeln!(out, "{}", progress_bar(analysis.fake_score(), PROGRESS_WIDTH))?;
            writeln!(out, "REAL confidence: {:.3}", analysis.real_score())?;
            if cli.raw {
                write_raw(out, analysis.raw())?;
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "filename": filename,
                "verdict": analysis.verdict(),
                "verdict_label": analysis.verdict().to_string(),
                "fake_confidence": analysis.fake_score(),
                "real_confidence": analysis.real_score(),
                "image": { "width": image.width(), "height": image.height() },
                "raw": raw_json(analysis.raw()),
            });
            writeln!(out, "{}", serde_json::to_string(&output)?)?;
        }
    }
    Ok(())
}

fn record_json(record: &AnalysisRecord) -> Value {
    let image = record
        .image()
        .map(|image| json!({ "width": image.width(), "height": image.height() }));
    let error = record
        .error()
        .map(|err| json!({ "kind": err.kind(), "message": err.to_string() }));
    json!({
        "filename": record.filename(),
        "verdict": record.verdict(),
        "verdict_label": record.outcome().to_string(),
        "fake_confidence": record.fake_score(),
        "real_confidence": record.real_score(),
        "image": image,
        "raw": raw_json(record.raw()),
        "error": error,
    })
}

fn write_batch(out: &mut impl Write, cli: &Cli, records: &[AnalysisRecord]) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let array: Vec<Value> = records.iter().map(record_json).collect();
            writeln!(out, "{}", serde_json::to_string(&array)?)?;
        }
        OutputFormat::Human => {
            for record in records {
                writeln!(out, "{}", "-".repeat(40))?;
                writeln!(out, "File: {}", record.filename())?;
                writeln!(out, "Preview: {}", preview(record.image()))?;
                writeln!(out, "Verdict: {}", record.outcome())?;
                writeln!(
                    out,
                    "FAKE: {:.3}    |    REAL: {:.3}",
                    record.fake_score(),
                    record.real_score()
                )?;
                writeln!(out, "{}", progress_bar(record.fake_progress(), PROGRESS_WIDTH))?;
                if cli.raw {
                    write_raw(out, record.raw())?;
                }
            }
        }
    }
    Ok(())
}
