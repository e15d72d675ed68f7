//! Error types for the vid2guide library.
//!
//! The pipeline is all-or-nothing: every variant of [`GuideError`] is fatal
//! to the run that raised it, and no partial guide ever escapes. The single
//! deliberate exception — metadata fetching — is not represented here at all:
//! it degrades to per-field defaults inside [`crate::pipeline::metadata`] and
//! only logs a warning.
//!
//! [`GuideError::user_message`] is the one place that maps each failure kind
//! to the single human-readable message the orchestrator is allowed to
//! surface. Internal detail (raw model output, yt-dlp stderr) stays in the
//! variant fields and the logs.

use thiserror::Error;

/// All fatal errors returned by the vid2guide library.
#[derive(Debug, Error)]
pub enum GuideError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The inbound request carried no URL at all.
    #[error("URL is required")]
    MissingUrl,

    /// The URL matched none of the supported YouTube forms, or the captured
    /// token was not a valid 11-character video identifier.
    #[error("Invalid URL: '{input}' is not a recognisable YouTube video link")]
    InvalidUrl { input: String },

    // ── Transcript errors ─────────────────────────────────────────────────
    /// Every transcript strategy was exhausted without producing captions.
    #[error(
        "No transcript available for video '{id}' after {attempts} remote attempt(s).\n\
         Captions may be disabled or restricted — paste the transcript manually instead."
    )]
    TranscriptUnavailable { id: String, attempts: usize },

    /// The caption tool (yt-dlp) could not be spawned, timed out, or exited
    /// non-zero. Folded into [`GuideError::TranscriptUnavailable`] once the
    /// strategy ladder is exhausted; surfaced directly only by a
    /// [`crate::pipeline::transcript::CaptionSource`] called in isolation.
    #[error("Caption tool failed: {detail}")]
    CaptionTool { detail: String },

    // ── Synthesis errors ──────────────────────────────────────────────────
    /// The model's response text did not parse as the required steps JSON.
    /// The raw output is logged at debug level, never surfaced.
    #[error("Failed to parse AI response: {detail}")]
    SynthesisFailed { detail: String },

    /// A synthesized step violated the configured validation policy
    /// (only raised under [`crate::config::TimestampPolicy::Reject`]).
    #[error("Step {index} is invalid: {reason}")]
    InvalidStep { index: usize, reason: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// No API credential was injected into the configuration.
    #[error(
        "No API key configured.\n\
         Inject one via GuideConfig::builder().api_key(..) — the library never reads the environment."
    )]
    MissingApiKey,

    /// The generative-model endpoint was unreachable, returned a non-success
    /// status, or answered with an unexpected payload shape.
    #[error("Model request failed: {detail}")]
    ModelCall { detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Snapshot decoding or PDF composition failed.
    #[error("Export failed: {detail}")]
    ExportFailed { detail: String },

    /// Could not create or write the exported document file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuideError {
    /// The exactly-one human-readable message for this failure kind.
    ///
    /// The orchestrator reports this string (and nothing else) to the caller;
    /// diagnostic detail stays in the structured variant and the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            GuideError::MissingUrl => "URL is required",
            GuideError::InvalidUrl { .. } => "Invalid URL",
            GuideError::TranscriptUnavailable { .. } | GuideError::CaptionTool { .. } => {
                "Could not fetch a transcript for this video. \
                 Paste the transcript manually and try again."
            }
            GuideError::SynthesisFailed { .. } => "Failed to parse AI response",
            GuideError::InvalidStep { .. } => "The generated guide contained an invalid step",
            GuideError::MissingApiKey | GuideError::ModelCall { .. } => {
                "The AI service could not be reached. Try again in a moment."
            }
            GuideError::ExportFailed { .. } | GuideError::OutputWrite { .. } => {
                "Could not export the guide document"
            }
            GuideError::InvalidConfig(_) | GuideError::Internal(_) => {
                "Something went wrong. Try again."
            }
        }
    }
}
