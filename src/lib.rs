//! # vid2guide
//!
//! Turn a YouTube video into a structured, illustrated, step-by-step
//! written tutorial using a generative model.
//!
//! ## Why this crate?
//!
//! Video tutorials bury their information in an hour of talking. This crate
//! resolves a video reference from any of the common URL forms, acquires a
//! timestamped transcript through a tiered fallback chain, asks an LLM for
//! ordered tutorial steps under a strict JSON schema, enriches every step
//! with deterministic media links, and can export the rendered result as a
//! single-page PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL (+ optional manual transcript)
//!  │
//!  ├─ 1. Resolve     syntactic URL → 11-char video identifier
//!  ├─ 2. Metadata    oEmbed title/author/thumbnail (never fatal)
//!  ├─ 3. Transcript  manual → preferred language → provider default
//!  ├─ 4. Synthesize  schema-constrained LLM call → ordered steps
//!  ├─ 5. Enrich      thumbnail + deep-link URLs per step (pure)
//!  └─ 6. Assemble    GuideData (all-or-nothing)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vid2guide::{generate_guide, GuideConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GuideConfig::builder()
//!         .api_key(std::env::var("VID2GUIDE_API_KEY")?)
//!         .build()?;
//!     let output = generate_guide("https://youtu.be/dQw4w9WgXcQ", None, &config).await?;
//!     for step in &output.guide.steps {
//!         println!("{} ({}s)", step.title, step.timestamp_seconds);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `vid2guide` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! vid2guide = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod guide;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GuideConfig, GuideConfigBuilder, TimestampPolicy};
pub use error::GuideError;
pub use export::{
    export_document, export_document_async, export_filename, export_to_file, ExportOptions,
    ExportedDocument, Snapshot,
};
pub use generate::{analyze, generate_guide};
pub use guide::{
    GuideData, GuideOutput, GuideStats, GuideStep, StepCandidate, TranscriptLine, VideoAnalysis,
    VideoId, VideoMetadata,
};
pub use model::{GenerativeModel, HttpModel, ModelRequest};
pub use pipeline::transcript::{CaptionLine, CaptionSource, YtDlpCaptions};
pub use progress::{GuidePhase, GuideProgressCallback, NoopProgressCallback, ProgressCallback};
pub use render::format_guide_markdown;
