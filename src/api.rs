//! Framework-free boundary types for a host HTTP surface.
//!
//! Transport and routing are out of scope for this crate, but the shapes
//! that cross the boundary — the analyze request/response and the
//! error-to-status mapping — live here so every host (axum handler, lambda,
//! Tauri command) serialises the same contract.

use crate::error::GuideError;
use crate::guide::VideoAnalysis;
use serde::{Deserialize, Serialize};

/// Inbound request: a video URL plus the optional manual transcript.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub manual_transcript: Option<String>,
}

impl AnalyzeRequest {
    /// Request-level validation: the URL field must be present and non-blank.
    pub fn validate(&self) -> Result<(), GuideError> {
        if self.url.trim().is_empty() {
            return Err(GuideError::MissingUrl);
        }
        Ok(())
    }
}

/// Successful analyze response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    pub transcript: String,
    pub video_id: String,
}

impl From<&VideoAnalysis> for AnalyzeResponse {
    fn from(analysis: &VideoAnalysis) -> Self {
        AnalyzeResponse {
            title: analysis.metadata.title.clone(),
            author: analysis.metadata.author.clone(),
            thumbnail: analysis.metadata.thumbnail_url.clone(),
            transcript: analysis.transcript.clone(),
            video_id: analysis.video_id.to_string(),
        }
    }
}

/// Error payload: the single user-facing message, nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn from_error(error: &GuideError) -> Self {
        ErrorBody {
            error: error.user_message().to_string(),
        }
    }
}

/// Map a pipeline error to the HTTP status a host should answer with.
///
/// Missing URL is a client mistake (400); an unresolvable URL is a
/// well-formed but unprocessable request (422); exhausted transcript
/// sources and model-call failures are upstream problems (502); everything
/// else is an internal error (500).
pub fn http_status(error: &GuideError) -> u16 {
    match error {
        GuideError::MissingUrl => 400,
        GuideError::InvalidUrl { .. } => 422,
        GuideError::TranscriptUnavailable { .. }
        | GuideError::CaptionTool { .. }
        | GuideError::SynthesisFailed { .. }
        | GuideError::ModelCall { .. } => 502,
        GuideError::InvalidStep { .. }
        | GuideError::MissingApiKey
        | GuideError::ExportFailed { .. }
        | GuideError::OutputWrite { .. }
        | GuideError::InvalidConfig(_)
        | GuideError::Internal(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::{VideoId, VideoMetadata};

    #[test]
    fn blank_url_fails_validation_with_400() {
        let request: AnalyzeRequest = serde_json::from_str(r#"{"url": "  "}"#).unwrap();
        let err = request.validate().unwrap_err();
        assert!(matches!(err, GuideError::MissingUrl));
        assert_eq!(http_status(&err), 400);
    }

    #[test]
    fn missing_url_field_deserialises_to_empty() {
        let request: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn status_mapping_distinguishes_failure_classes() {
        assert_eq!(
            http_status(&GuideError::InvalidUrl {
                input: "x".into()
            }),
            422
        );
        assert_eq!(
            http_status(&GuideError::TranscriptUnavailable {
                id: "abcdefghijk".into(),
                attempts: 2
            }),
            502
        );
        assert_eq!(http_status(&GuideError::Internal("boom".into())), 500);
    }

    #[test]
    fn analyze_response_flattens_the_analysis() {
        let id = VideoId::new("abcdefghijk").unwrap();
        let analysis = VideoAnalysis {
            metadata: VideoMetadata::fallback(&id),
            video_id: id,
            transcript: "[0s] hi".into(),
        };
        let response = AnalyzeResponse::from(&analysis);
        assert_eq!(response.video_id, "abcdefghijk");
        assert_eq!(response.author, "Unknown Creator");
        assert_eq!(response.transcript, "[0s] hi");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("thumbnail").is_some());
        // Wire contract uses camelCase.
        assert_eq!(json["videoId"], "abcdefghijk");
    }

    #[test]
    fn error_body_uses_the_user_message_only() {
        let err = GuideError::SynthesisFailed {
            detail: "secret internals".into(),
        };
        let body = ErrorBody::from_error(&err);
        assert_eq!(body.error, "Failed to parse AI response");
        assert!(!body.error.contains("secret"));
    }
}
