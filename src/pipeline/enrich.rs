//! Step enrichment: deterministic media-URL derivation.
//!
//! Pure functions of the video identifier and the step timestamp — no I/O,
//! no clock, no randomness. Whatever `imageUrl`/`videoUrl` the model put in
//! its output is discarded here and replaced with the derived values; the
//! model is not trusted to fabricate links. The thumbnail is the video's
//! high-quality default frame for every step (there is no per-timestamp
//! frame extraction), and the video URL deep-links to the step's offset.

use crate::guide::{GuideStep, StepCandidate, VideoId};

/// High-quality default thumbnail for a video.
pub fn thumbnail_url(id: &VideoId) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id)
}

/// Deep link into the video at `seconds` from the start.
pub fn deep_link(id: &VideoId, seconds: u64) -> String {
    format!("https://www.youtube.com/watch?v={}&t={}s", id, seconds)
}

/// Enrich one candidate into a full guide step.
///
/// Safe to apply independently to every candidate in any order; applying it
/// twice yields an identical result.
pub fn enrich(id: &VideoId, candidate: &StepCandidate) -> GuideStep {
    let timestamp_seconds = candidate.timestamp.max(0) as u64;
    GuideStep {
        title: candidate.title.clone(),
        description: candidate.description.clone(),
        timestamp_seconds,
        image_url: thumbnail_url(id),
        video_url: deep_link(id, timestamp_seconds),
    }
}
