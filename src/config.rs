//! Configuration types for guide generation.
//!
//! All pipeline behaviour is controlled through [`GuideConfig`], built via
//! its [`GuideConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: injected credential
//! The API key is a plain config field, never read from the environment at
//! call time inside the library. This makes the synthesizer trivially
//! testable with a fake credential or a stubbed [`GenerativeModel`], and
//! keeps credential sourcing (env var, keychain, secret manager) the host
//! application's concern. The CLI reads `VID2GUIDE_API_KEY` and injects it
//! here — that is the only place an environment variable is consulted.

use crate::error::GuideError;
use crate::model::GenerativeModel;
use crate::pipeline::transcript::CaptionSource;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default OpenAI-compatible endpoint (Gemini's compatibility surface).
pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default oEmbed endpoint for the metadata lookup.
pub const DEFAULT_OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Configuration for one guide-generation pipeline.
///
/// Built via [`GuideConfig::builder()`] or [`GuideConfig::default()`].
///
/// # Example
/// ```rust
/// use vid2guide::GuideConfig;
///
/// let config = GuideConfig::builder()
///     .api_key("sk-test")
///     .language("en")
///     .model("gemini-2.5-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GuideConfig {
    /// Preferred caption language requested on the first remote transcript
    /// attempt. The second attempt drops the constraint entirely. Default: "en".
    pub language: String,

    /// Model identifier sent to the chat-completions endpoint.
    pub model: String,

    /// OpenAI-compatible chat-completions endpoint URL.
    pub api_url: String,

    /// Injected API credential. Required unless a pre-built
    /// [`GenerativeModel`] is supplied via `model_override`.
    pub api_key: Option<String>,

    /// oEmbed endpoint base for the metadata lookup. Overridable so tests
    /// and proxied deployments can point it elsewhere.
    pub oembed_url: String,

    /// Sampling temperature for the synthesis completion. Default: 0.4.
    ///
    /// Guide steps need a little latitude for phrasing but must stay
    /// faithful to the transcript; values near 1.0 start inventing steps
    /// the video never shows.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 8192.
    ///
    /// A dense hour-long tutorial can produce 30+ steps of markdown prose.
    /// Setting this too low truncates the JSON mid-array, which then fails
    /// the strict parse and aborts the run.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// What to do with out-of-range timestamps or empty titles in the
    /// model's output. Default: [`TimestampPolicy::PassThrough`].
    pub timestamp_policy: TimestampPolicy,

    /// Timeout for the single oEmbed metadata request in seconds. Default: 10.
    pub metadata_timeout_secs: u64,

    /// Timeout for each remote caption fetch in seconds. Default: 60.
    pub transcript_timeout_secs: u64,

    /// Timeout for the model call in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Optional progress callback fired at each phase transition.
    pub progress_callback: Option<ProgressCallback>,

    /// Pre-built generative model. Takes precedence over
    /// `api_url`/`api_key`/`model`. Useful in tests or when the caller needs
    /// custom middleware (caching, rate limiting).
    pub model_override: Option<Arc<dyn GenerativeModel>>,

    /// Pre-built caption source. Replaces the default yt-dlp-backed source.
    pub caption_source: Option<Arc<dyn CaptionSource>>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            oembed_url: DEFAULT_OEMBED_URL.to_string(),
            temperature: 0.4,
            max_tokens: 8192,
            system_prompt: None,
            timestamp_policy: TimestampPolicy::default(),
            metadata_timeout_secs: 10,
            transcript_timeout_secs: 60,
            api_timeout_secs: 120,
            progress_callback: None,
            model_override: None,
            caption_source: None,
        }
    }
}

impl fmt::Debug for GuideConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuideConfig")
            .field("language", &self.language)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("oembed_url", &self.oembed_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timestamp_policy", &self.timestamp_policy)
            .field("metadata_timeout_secs", &self.metadata_timeout_secs)
            .field("transcript_timeout_secs", &self.transcript_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "model_override",
                &self.model_override.as_ref().map(|_| "<dyn GenerativeModel>"),
            )
            .field(
                "caption_source",
                &self.caption_source.as_ref().map(|_| "<dyn CaptionSource>"),
            )
            .finish()
    }
}

impl GuideConfig {
    /// Create a new builder for `GuideConfig`.
    pub fn builder() -> GuideConfigBuilder {
        GuideConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GuideConfig`].
#[derive(Debug)]
pub struct GuideConfigBuilder {
    config: GuideConfig,
}

impl GuideConfigBuilder {
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn oembed_url(mut self, url: impl Into<String>) -> Self {
        self.config.oembed_url = url.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.config.timestamp_policy = policy;
        self
    }

    pub fn metadata_timeout_secs(mut self, secs: u64) -> Self {
        self.config.metadata_timeout_secs = secs.max(1);
        self
    }

    pub fn transcript_timeout_secs(mut self, secs: u64) -> Self {
        self.config.transcript_timeout_secs = secs.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn model_override(mut self, model: Arc<dyn GenerativeModel>) -> Self {
        self.config.model_override = Some(model);
        self
    }

    pub fn caption_source(mut self, source: Arc<dyn CaptionSource>) -> Self {
        self.config.caption_source = Some(source);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GuideConfig, GuideError> {
        let c = &self.config;
        if c.language.trim().is_empty() {
            return Err(GuideError::InvalidConfig(
                "Preferred caption language must be non-empty".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(GuideError::InvalidConfig("Model must be non-empty".into()));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(GuideError::InvalidConfig(format!(
                "Temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Validation policy for synthesized step timestamps and titles.
///
/// The synthesizer does not hard-validate the model's timestamps or titles;
/// what to do with a negative timestamp or an empty title is a policy
/// decision the caller makes here rather than an assumption baked into the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimestampPolicy {
    /// Keep candidates untouched. Negative timestamps still floor to zero at
    /// the enrichment type boundary (`timestamp_seconds` is unsigned), but
    /// the candidate list itself is not rewritten. (default)
    #[default]
    PassThrough,
    /// Rewrite negative timestamps to zero at the candidate level.
    Clamp,
    /// Fail the run with [`crate::error::GuideError::InvalidStep`] on a
    /// negative timestamp or an empty/whitespace title.
    Reject,
}
