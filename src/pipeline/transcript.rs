//! Transcript acquisition: the tiered fallback ladder and the caption
//! source seam.
//!
//! ## The ladder
//!
//! Captions are frequently restricted by language or disabled per-video, so
//! acquisition is an explicit strategy ladder walked in order, short-
//! circuiting on the first success:
//!
//! 1. **Manual** — a non-empty caller-supplied transcript is returned
//!    verbatim, with no remote call at all. This is the user-controlled
//!    escape hatch when automatic extraction is unavailable.
//! 2. **Remote, preferred language** — one fetch asking for the configured
//!    language.
//! 3. **Remote, provider default** — one more fetch with no language
//!    constraint.
//!
//! Exhaustion fails with [`GuideError::TranscriptUnavailable`], whose
//! message tells the caller to use manual mode. The ladder is data (a
//! `Vec<TranscriptStrategy>` plus a loop), not nested handlers, so each
//! tier is testable in isolation.
//!
//! ## The caption seam
//!
//! Remote fetching goes through [`CaptionSource`], a black-box trait
//! returning ordered caption lines. The default implementation,
//! [`YtDlpCaptions`], shells out to `yt-dlp` for WebVTT subtitles —
//! scraping YouTube's caption endpoints directly is a moving target that
//! tool already tracks — and parses the VTT deterministically, keeping cue
//! start times.

use crate::error::GuideError;
use crate::guide::{TranscriptLine, VideoId};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// One caption cue as returned by a [`CaptionSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    /// Cue start offset in seconds (fractional as delivered by the source).
    pub start_seconds: f64,
    pub text: String,
}

/// A black-box caption service: identifier + optional language in, ordered
/// cues out (or an error).
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(
        &self,
        id: &VideoId,
        language: Option<&str>,
    ) -> Result<Vec<CaptionLine>, GuideError>;
}

/// One rung of the acquisition ladder.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptStrategy {
    /// Caller-supplied transcript, returned verbatim.
    Manual(String),
    /// Remote caption fetch; `None` means the provider's default language.
    Remote { language: Option<String> },
}

/// Build the ladder for one invocation. A blank manual override contributes
/// no rung — whitespace is not a transcript.
pub fn strategies(manual_override: Option<&str>, preferred_language: &str) -> Vec<TranscriptStrategy> {
    let mut plan = Vec::with_capacity(3);
    if let Some(manual) = manual_override {
        if !manual.trim().is_empty() {
            plan.push(TranscriptStrategy::Manual(manual.to_string()));
        }
    }
    plan.push(TranscriptStrategy::Remote {
        language: Some(preferred_language.to_string()),
    });
    plan.push(TranscriptStrategy::Remote { language: None });
    plan
}

/// Walk the ladder and return the annotated transcript blob.
pub async fn acquire_transcript(
    source: &dyn CaptionSource,
    id: &VideoId,
    manual_override: Option<&str>,
    preferred_language: &str,
) -> Result<String, GuideError> {
    let mut remote_attempts = 0usize;

    for strategy in strategies(manual_override, preferred_language) {
        match strategy {
            TranscriptStrategy::Manual(text) => {
                debug!(video = %id, "using manual transcript, skipping remote fetch");
                return Ok(text);
            }
            TranscriptStrategy::Remote { language } => {
                remote_attempts += 1;
                match source.fetch(id, language.as_deref()).await {
                    Ok(lines) if !lines.is_empty() => {
                        debug!(video = %id, cues = lines.len(), lang = ?language, "captions fetched");
                        return Ok(to_blob(&lines));
                    }
                    Ok(_) => {
                        warn!(video = %id, lang = ?language, "caption fetch returned no cues");
                    }
                    Err(e) => {
                        warn!(video = %id, lang = ?language, error = %e, "caption fetch failed");
                    }
                }
            }
        }
    }

    Err(GuideError::TranscriptUnavailable {
        id: id.to_string(),
        attempts: remote_attempts,
    })
}

/// Map caption cues into the newline-joined `[Ns] text` blob handed to the
/// synthesizer. Offsets are integer-truncated; cues with empty text are
/// dropped.
pub fn to_blob(lines: &[CaptionLine]) -> String {
    lines
        .iter()
        .filter(|c| !c.text.trim().is_empty())
        .map(|c| {
            TranscriptLine {
                offset_seconds: c.start_seconds.max(0.0).trunc() as u64,
                text: c.text.trim().to_string(),
            }
            .annotated()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Default source: yt-dlp ───────────────────────────────────────────────

/// Caption source backed by the `yt-dlp` executable.
///
/// Subtitles (human-authored and auto-generated) are written as WebVTT into
/// a temp directory, then parsed with [`parse_vtt`]. The subprocess is
/// bounded by a coarse timeout and killed on expiry.
pub struct YtDlpCaptions {
    timeout: Duration,
}

impl YtDlpCaptions {
    pub fn new(timeout_secs: u64) -> Self {
        YtDlpCaptions {
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl CaptionSource for YtDlpCaptions {
    async fn fetch(
        &self,
        id: &VideoId,
        language: Option<&str>,
    ) -> Result<Vec<CaptionLine>, GuideError> {
        let tmpdir = tempfile::tempdir().map_err(|e| GuideError::CaptionTool {
            detail: format!("tempdir: {e}"),
        })?;
        let out_tmpl = tmpdir.path().join("%(id)s.%(ext)s");

        let mut cmd = tokio::process::Command::new("yt-dlp");
        cmd.arg("--skip-download")
            .arg("--write-sub")
            .arg("--write-auto-sub")
            .arg("--sub-format")
            .arg("vtt")
            .arg("--no-warnings")
            .arg("-o")
            .arg(&out_tmpl);
        if let Some(lang) = language {
            cmd.arg("--sub-lang").arg(lang);
        }
        cmd.arg(id.watch_url());
        cmd.kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| GuideError::CaptionTool {
                detail: format!("yt-dlp timed out after {:?}", self.timeout),
            })?
            .map_err(|e| GuideError::CaptionTool {
                detail: format!("failed to run yt-dlp: {e}"),
            })?;

        if !output.status.success() {
            return Err(GuideError::CaptionTool {
                detail: format!(
                    "yt-dlp exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let vtt_path = first_vtt_file(tmpdir.path()).ok_or_else(|| GuideError::CaptionTool {
            detail: "no caption file produced (captions disabled?)".to_string(),
        })?;

        let vtt = tokio::fs::read_to_string(&vtt_path)
            .await
            .map_err(|e| GuideError::CaptionTool {
                detail: format!("failed to read captions: {e}"),
            })?;

        Ok(parse_vtt(&vtt))
    }
}

fn first_vtt_file(dir: &std::path::Path) -> Option<PathBuf> {
    let mut vtts: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("vtt"))
        .collect();
    vtts.sort();
    vtts.into_iter().next()
}

// ── VTT parsing ──────────────────────────────────────────────────────────

static RE_CUE_TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{2})[.,](\d{1,3})\s*-->").unwrap()
});

static RE_INLINE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Parse a WebVTT document into ordered caption cues.
///
/// Deterministic and forgiving: headers (`WEBVTT`, `NOTE`, `STYLE`,
/// `Kind:`, `Language:`) and numeric cue identifiers are skipped, inline
/// styling/karaoke tags are stripped, whitespace runs collapse, and
/// consecutive cues with identical text (an auto-caption artefact) are
/// deduplicated.
pub fn parse_vtt(vtt: &str) -> Vec<CaptionLine> {
    let mut cues: Vec<CaptionLine> = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_text = String::new();

    let flush = |start: &mut Option<f64>, text: &mut String, cues: &mut Vec<CaptionLine>| {
        if let Some(s) = start.take() {
            let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
            *text = String::new();
            if !cleaned.is_empty() {
                let duplicate = cues.last().map(|c: &CaptionLine| c.text == cleaned);
                if duplicate != Some(true) {
                    cues.push(CaptionLine {
                        start_seconds: s,
                        text: cleaned,
                    });
                }
            }
        }
    };

    for raw_line in vtt.lines() {
        let line = raw_line.trim();

        if line.is_empty() {
            flush(&mut current_start, &mut current_text, &mut cues);
            continue;
        }
        if let Some(caps) = RE_CUE_TIMING.captures(line) {
            flush(&mut current_start, &mut current_text, &mut cues);
            current_start = Some(timing_to_seconds(&caps));
            continue;
        }
        if current_start.is_none() {
            // Header region, or a cue identifier preceding a timing line.
            continue;
        }
        let stripped = RE_INLINE_TAGS.replace_all(line, "");
        current_text.push(' ');
        current_text.push_str(&stripped);
    }
    flush(&mut current_start, &mut current_text, &mut cues);

    cues
}

fn timing_to_seconds(caps: &regex::Captures<'_>) -> f64 {
    let hours: f64 = caps
        .get(1)
        .map(|m| m.as_str().parse().unwrap_or(0.0))
        .unwrap_or(0.0);
    let minutes: f64 = caps[2].parse().unwrap_or(0.0);
    let seconds: f64 = caps[3].parse().unwrap_or(0.0);
    let frac = caps
        .get(4)
        .map(|m| {
            let digits = m.as_str();
            digits.parse::<f64>().unwrap_or(0.0) / 10f64.powi(digits.len() as i32)
        })
        .unwrap_or(0.0);
    hours * 3600.0 + minutes * 60.0 + seconds + frac
}
