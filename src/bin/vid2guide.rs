//! CLI binary for vid2guide.
//!
//! A thin shim over the library crate that maps CLI flags to
//! [`GuideConfig`], renders progress with indicatif, and prints results.
//! This is the only place a credential is read from the environment — the
//! library itself only accepts injected keys.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vid2guide::{
    analyze, api::AnalyzeResponse, export_to_file, format_guide_markdown, generate_guide,
    ExportOptions, GuideConfig, GuidePhase, GuideProgressCallback, Snapshot, TimestampPolicy,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "vid2guide",
    version,
    about = "Turn a YouTube video into a step-by-step written guide",
    after_help = "EXAMPLES:\n    \
        vid2guide https://youtu.be/dQw4w9WgXcQ\n    \
        vid2guide https://youtu.be/dQw4w9WgXcQ --transcript-file talk.txt -o guide.md\n    \
        vid2guide https://youtu.be/dQw4w9WgXcQ --snapshot view.png --export-dir out/"
)]
struct Cli {
    /// Video URL (youtu.be/<id>, youtube.com/watch?v=<id>, or /shorts/<id>)
    url: String,

    /// Manual transcript text; bypasses all remote caption fetching
    #[arg(long, conflicts_with = "transcript_file")]
    transcript: Option<String>,

    /// Read the manual transcript from a file
    #[arg(long, value_name = "FILE")]
    transcript_file: Option<PathBuf>,

    /// Preferred caption language for the first remote attempt
    #[arg(long, default_value = "en")]
    lang: String,

    /// Model identifier sent to the endpoint
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible chat-completions endpoint URL
    #[arg(long)]
    api_url: Option<String>,

    /// API key for the model endpoint
    #[arg(long, env = "VID2GUIDE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Reject steps with negative timestamps or empty titles
    #[arg(long)]
    strict_steps: bool,

    /// Run only the analyze stage and print its JSON (no model call)
    #[arg(long)]
    analyze_only: bool,

    /// Print the full guide as JSON instead of Markdown
    #[arg(long)]
    json: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Rendered-view snapshot (PNG/JPEG) to compose into a PDF
    #[arg(long, value_name = "IMAGE")]
    snapshot: Option<PathBuf>,

    /// Directory for the exported PDF
    #[arg(long, value_name = "DIR", default_value = ".")]
    export_dir: PathBuf,

    /// Oversampling factor the snapshot was captured at
    #[arg(long, default_value_t = 2)]
    oversample: u32,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Progress rendering ───────────────────────────────────────────────────────

/// Terminal progress: one bar tracking the pipeline's phase percentage.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:36.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Generating");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl GuideProgressCallback for CliProgress {
    fn on_phase(&self, phase: GuidePhase) {
        self.bar.set_position(phase.percent() as u64);
        self.bar.set_message(phase.label().to_string());
    }

    fn on_complete(&self, step_count: usize) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", green("✓"), bold(&format!("{step_count} steps generated")));
    }

    fn on_error(&self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✗"), message);
    }
}

// ── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let manual_transcript = match (&cli.transcript, &cli.transcript_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading transcript file {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let progress = CliProgress::new();
    let mut builder = GuideConfig::builder()
        .language(cli.lang.clone())
        .progress_callback(progress.clone());
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref url) = cli.api_url {
        builder = builder.api_url(url.clone());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if cli.strict_steps {
        builder = builder.timestamp_policy(TimestampPolicy::Reject);
    }
    let config = builder.build()?;

    if cli.analyze_only {
        let analysis = analyze(&cli.url, manual_transcript.as_deref(), &config).await?;
        progress.bar.finish_and_clear();
        let body = serde_json::to_string_pretty(&AnalyzeResponse::from(&analysis))?;
        emit(&cli.output, &body)?;
        return Ok(());
    }

    let output = generate_guide(&cli.url, manual_transcript.as_deref(), &config).await?;

    let rendered = if cli.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_guide_markdown(&output.guide)
    };
    emit(&cli.output, &rendered)?;
    eprintln!(
        "{}",
        dim(&format!(
            "transcript {} chars · synthesis {} ms · total {} ms",
            output.stats.transcript_chars,
            output.stats.synthesis_duration_ms,
            output.stats.total_duration_ms
        ))
    );

    if let Some(ref snapshot_path) = cli.snapshot {
        let bytes = std::fs::read(snapshot_path)
            .with_context(|| format!("reading snapshot {}", snapshot_path.display()))?;
        let snapshot = Snapshot::from_bytes(&bytes)?;
        let options = ExportOptions {
            oversample: cli.oversample,
            ..ExportOptions::default()
        };
        let pdf_path = export_to_file(snapshot, &output.guide.title, &cli.export_dir, options).await?;
        eprintln!("{} exported {}", green("✓"), pdf_path.display());
    }

    Ok(())
}

fn emit(output: &Option<PathBuf>, body: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{body}"),
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
