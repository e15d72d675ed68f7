//! Core data model: identifiers, metadata, transcripts, steps, and the
//! assembled guide.
//!
//! Everything here is plain data. The pipeline stages in
//! [`crate::pipeline`] produce and consume these types; none of them carry
//! behaviour beyond validation and cheap derivations. All types serialise
//! with serde so a host application can ship them over its own API boundary
//! unchanged.

use crate::error::GuideError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of characters in a YouTube video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// A validated 11-character YouTube video identifier.
///
/// The token grammar is `[A-Za-z0-9_-]{11}`. Construction is the only place
/// the grammar is checked; once a `VideoId` exists it is immutable and every
/// downstream derivation (thumbnail URL, deep link, oEmbed lookup) can trust
/// it without re-validating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Validate and wrap a raw token.
    pub fn new(token: &str) -> Result<Self, GuideError> {
        let valid = token.len() == VIDEO_ID_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid {
            Ok(VideoId(token.to_string()))
        } else {
            Err(GuideError::InvalidUrl {
                input: token.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VideoId {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoId::new(s)
    }
}

/// Cosmetic video metadata with non-empty fallback defaults.
///
/// Metadata acquisition is never fatal: [`VideoMetadata::fallback`] supplies
/// every field when the oEmbed lookup fails, so the pipeline always has a
/// title, an author, and a thumbnail to put on the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    pub thumbnail_url: String,
}

impl VideoMetadata {
    pub const DEFAULT_TITLE: &'static str = "YouTube Video";
    pub const DEFAULT_AUTHOR: &'static str = "Unknown Creator";

    /// The defaults used when the embed-metadata lookup fails entirely.
    pub fn fallback(id: &VideoId) -> Self {
        VideoMetadata {
            title: Self::DEFAULT_TITLE.to_string(),
            author: Self::DEFAULT_AUTHOR.to_string(),
            thumbnail_url: crate::pipeline::enrich::thumbnail_url(id),
        }
    }
}

/// One timestamped caption line of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Offset from the start of the video, truncated to whole seconds.
    pub offset_seconds: u64,
    pub text: String,
}

impl TranscriptLine {
    /// Render the line in the annotated `[Ns] text` form handed to the model.
    pub fn annotated(&self) -> String {
        format!("[{}s] {}", self.offset_seconds, self.text)
    }
}

/// A raw step as returned by the synthesizer, before enrichment.
///
/// `timestamp` is a signed integer at the wire so the configured
/// [`crate::config::TimestampPolicy`] can observe out-of-range values
/// instead of losing them to an unsigned parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCandidate {
    pub title: String,
    pub description: String,
    pub timestamp: i64,
}

/// A fully enriched tutorial step.
///
/// `image_url` and `video_url` are derived from the video identifier and the
/// step timestamp by [`crate::pipeline::enrich`] — whatever the model put
/// there is always overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideStep {
    pub title: String,
    /// Markdown-formatted prose.
    pub description: String,
    pub timestamp_seconds: u64,
    pub image_url: String,
    pub video_url: String,
}

/// The finished guide — the sole output of the pipeline.
///
/// Created only after every upstream stage has succeeded; immutable for the
/// lifetime of one generated guide. Steps keep the synthesizer's narrative
/// order and are never re-sorted by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideData {
    pub title: String,
    pub author: String,
    pub thumbnail_url: String,
    pub video_id: VideoId,
    pub steps: Vec<GuideStep>,
}

/// Timing and size statistics for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideStats {
    /// Characters in the annotated transcript blob sent to the model.
    pub transcript_chars: usize,
    pub step_count: usize,
    pub transcript_duration_ms: u64,
    pub synthesis_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// A finished guide plus its run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideOutput {
    pub guide: GuideData,
    pub stats: GuideStats,
}

/// Product of the analyze stage: everything known about a video before
/// synthesis. This is what the inbound API boundary of the host application
/// returns (see [`crate::api::AnalyzeResponse`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub video_id: VideoId,
    pub metadata: VideoMetadata,
    /// Annotated `[Ns] text` transcript blob (or the caller's manual
    /// transcript, verbatim).
    pub transcript: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_accepts_valid_tokens() {
        assert!(VideoId::new("dQw4w9WgXcQ").is_ok());
        assert!(VideoId::new("abc-def_hij").is_ok());
    }

    #[test]
    fn video_id_rejects_wrong_length() {
        assert!(VideoId::new("short").is_err());
        assert!(VideoId::new("twelve-chars").is_err());
        assert!(VideoId::new("").is_err());
    }

    #[test]
    fn video_id_rejects_bad_characters() {
        assert!(VideoId::new("abc def hij").is_err());
        assert!(VideoId::new("abcdefghij!").is_err());
        // Multi-byte chars must not sneak past a byte-length check.
        assert!(VideoId::new("abcdefghi\u{e9}").is_err());
    }

    #[test]
    fn watch_url_round_trip() {
        let id: VideoId = "dQw4w9WgXcQ".parse().unwrap();
        assert_eq!(
            id.watch_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn annotated_line_format() {
        let line = TranscriptLine {
            offset_seconds: 42,
            text: "mix the batter".into(),
        };
        assert_eq!(line.annotated(), "[42s] mix the batter");
    }

    #[test]
    fn metadata_fallback_is_never_empty() {
        let id = VideoId::new("abcdefghijk").unwrap();
        let meta = VideoMetadata::fallback(&id);
        assert_eq!(meta.title, "YouTube Video");
        assert_eq!(meta.author, "Unknown Creator");
        assert!(meta.thumbnail_url.contains("abcdefghijk"));
    }

    #[test]
    fn guide_data_serialises_with_plain_video_id() {
        let id = VideoId::new("abcdefghijk").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abcdefghijk\"");
    }
}
