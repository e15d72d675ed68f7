//! Pipeline orchestration: the top-level entry points.
//!
//! ## All-or-nothing
//!
//! A run either yields a complete, fully enriched guide or no guide at all.
//! The orchestrator owns every intermediate value (identifier, metadata,
//! transcript blob, raw candidates); none of them outlive one invocation,
//! and no partial `GuideData` is ever exposed on failure. Each fatal error
//! kind surfaces exactly one human-readable message through the progress
//! callback ([`GuideError::user_message`]).
//!
//! ## Concurrency shape
//!
//! Metadata fetch and transcript acquisition both depend only on the
//! resolved identifier and share no state, so they run as the two branches
//! of a `tokio::join!`. Synthesis strictly awaits the transcript; enrichment
//! is a cheap in-order map where ordering, not parallelism, matters.

use crate::config::GuideConfig;
use crate::error::GuideError;
use crate::guide::{GuideData, GuideOutput, GuideStats, VideoAnalysis};
use crate::model;
use crate::pipeline::transcript::{CaptionSource, YtDlpCaptions};
use crate::pipeline::{enrich, metadata, resolve, synthesize, transcript};
use crate::progress::GuidePhase;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Run the analyze stage only: resolve the URL, then fetch metadata and
/// acquire a transcript concurrently.
///
/// This is the operation behind the host application's analyze endpoint —
/// everything known about the video before any model call.
pub async fn analyze(
    url: &str,
    manual_transcript: Option<&str>,
    config: &GuideConfig,
) -> Result<VideoAnalysis, GuideError> {
    match analyze_inner(url, manual_transcript, config).await {
        Ok((analysis, _)) => Ok(analysis),
        Err(e) => Err(fail(config, e)),
    }
}

/// Run the full pipeline: analyze → synthesize → enrich → assemble.
///
/// # Errors
/// Any fatal stage error aborts immediately; metadata failures never abort
/// (they degrade to defaults inside the metadata stage).
pub async fn generate_guide(
    url: &str,
    manual_transcript: Option<&str>,
    config: &GuideConfig,
) -> Result<GuideOutput, GuideError> {
    let total_start = Instant::now();
    info!(%url, "starting guide generation");

    // ── Step 1+2: Resolve, metadata ∥ transcript ─────────────────────────
    let (analysis, transcript_duration_ms) = analyze_inner(url, manual_transcript, config)
        .await
        .map_err(|e| fail(config, e))?;

    // ── Step 3: Synthesize steps ─────────────────────────────────────────
    set_phase(config, GuidePhase::Synthesizing);
    let model = model::resolve_model(config).map_err(|e| fail(config, e))?;
    let synthesis_start = Instant::now();
    let candidates = synthesize::synthesize(model.as_ref(), &analysis.transcript, config)
        .await
        .map_err(|e| fail(config, e))?;
    let synthesis_duration_ms = synthesis_start.elapsed().as_millis() as u64;
    debug!(steps = candidates.len(), "synthesis complete");

    // ── Step 4: Enrich every candidate, in order ─────────────────────────
    set_phase(config, GuidePhase::Enriching);
    let steps = candidates
        .iter()
        .map(|candidate| enrich::enrich(&analysis.video_id, candidate))
        .collect::<Vec<_>>();

    // ── Step 5: Assemble ─────────────────────────────────────────────────
    let stats = GuideStats {
        transcript_chars: analysis.transcript.len(),
        step_count: steps.len(),
        transcript_duration_ms,
        synthesis_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    let guide = GuideData {
        title: analysis.metadata.title,
        author: analysis.metadata.author,
        thumbnail_url: analysis.metadata.thumbnail_url,
        video_id: analysis.video_id,
        steps,
    };

    info!(
        steps = guide.steps.len(),
        total_ms = stats.total_duration_ms,
        "guide generation complete"
    );
    set_phase(config, GuidePhase::Ready);
    if let Some(ref cb) = config.progress_callback {
        cb.on_complete(guide.steps.len());
    }

    Ok(GuideOutput { guide, stats })
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn analyze_inner(
    url: &str,
    manual_transcript: Option<&str>,
    config: &GuideConfig,
) -> Result<(VideoAnalysis, u64), GuideError> {
    set_phase(config, GuidePhase::Resolving);
    let video_id = resolve::resolve(url)?;
    debug!(video = %video_id, "identifier resolved");

    set_phase(config, GuidePhase::FetchingTranscript);
    let captions: Arc<dyn CaptionSource> = match &config.caption_source {
        Some(source) => Arc::clone(source),
        None => Arc::new(YtDlpCaptions::new(config.transcript_timeout_secs)),
    };

    let fetch_start = Instant::now();
    let (metadata, transcript) = tokio::join!(
        metadata::fetch_metadata(&config.oembed_url, &video_id, config.metadata_timeout_secs),
        transcript::acquire_transcript(
            captions.as_ref(),
            &video_id,
            manual_transcript,
            &config.language
        ),
    );
    let transcript = transcript?;
    let transcript_duration_ms = fetch_start.elapsed().as_millis() as u64;

    Ok((
        VideoAnalysis {
            video_id,
            metadata,
            transcript,
        },
        transcript_duration_ms,
    ))
}

fn set_phase(config: &GuideConfig, phase: GuidePhase) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_phase(phase);
    }
}

/// Mark the run failed and report the single user-facing message.
fn fail(config: &GuideConfig, error: GuideError) -> GuideError {
    set_phase(config, GuidePhase::Failed);
    if let Some(ref cb) = config.progress_callback {
        cb.on_error(error.user_message());
    }
    error
}
