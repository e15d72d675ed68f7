//! Guide synthesis: one schema-constrained model call and a strict parse.
//!
//! This stage is intentionally thin — prompt content lives in
//! [`crate::prompts`] and transport lives in [`crate::model`], so synthesis
//! proper is: assemble the request, make exactly one call, parse the
//! response text as the steps envelope.
//!
//! Parsing is strict: no partial recovery, no repair of malformed JSON.
//! The single concession is stripping an outer markdown fence first —
//! models occasionally disobey "do not wrap in fences", and the fence is an
//! artefact of the transport, not of the content. A response that still
//! fails to parse raises [`GuideError::SynthesisFailed`] with the raw text
//! logged at debug level for diagnosis; the user sees only the generic
//! message. Zero steps is *not* an error — an empty guide is a valid, if
//! degenerate, result.

use crate::config::{GuideConfig, TimestampPolicy};
use crate::error::GuideError;
use crate::guide::StepCandidate;
use crate::model::{GenerativeModel, ModelRequest};
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct StepsEnvelope {
    steps: Vec<StepCandidate>,
}

/// Run one synthesis call and return the parsed, policy-checked candidates.
pub async fn synthesize(
    model: &dyn GenerativeModel,
    transcript_blob: &str,
    config: &GuideConfig,
) -> Result<Vec<StepCandidate>, GuideError> {
    let request = ModelRequest {
        system_prompt: config
            .system_prompt
            .clone()
            .unwrap_or_else(|| prompts::DEFAULT_SYSTEM_PROMPT.to_string()),
        user_prompt: prompts::user_prompt(transcript_blob),
        response_schema: prompts::steps_schema(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let raw = model.generate(&request).await?;
    let candidates = parse_steps(&raw)?;
    apply_policy(candidates, config.timestamp_policy)
}

/// Parse the model's response text into step candidates.
pub fn parse_steps(raw: &str) -> Result<Vec<StepCandidate>, GuideError> {
    let cleaned = strip_outer_fence(raw);
    match serde_json::from_str::<StepsEnvelope>(cleaned.trim()) {
        Ok(envelope) => Ok(envelope.steps),
        Err(e) => {
            debug!(raw = %raw, "model output failed to parse as steps JSON");
            Err(GuideError::SynthesisFailed {
                detail: e.to_string(),
            })
        }
    }
}

/// Apply the configured validation policy to the candidate list.
pub fn apply_policy(
    candidates: Vec<StepCandidate>,
    policy: TimestampPolicy,
) -> Result<Vec<StepCandidate>, GuideError> {
    match policy {
        TimestampPolicy::PassThrough => Ok(candidates),
        TimestampPolicy::Clamp => Ok(candidates
            .into_iter()
            .map(|mut c| {
                c.timestamp = c.timestamp.max(0);
                c
            })
            .collect()),
        TimestampPolicy::Reject => {
            for (index, candidate) in candidates.iter().enumerate() {
                if candidate.timestamp < 0 {
                    return Err(GuideError::InvalidStep {
                        index,
                        reason: format!("negative timestamp {}", candidate.timestamp),
                    });
                }
                if candidate.title.trim().is_empty() {
                    return Err(GuideError::InvalidStep {
                        index,
                        reason: "empty title".to_string(),
                    });
                }
            }
            Ok(candidates)
        }
    }
}

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n(.*)\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{"steps": [
        {"title": "Intro", "description": "What the video covers.", "timestamp": 0},
        {"title": "Mix", "description": "Combine the **dry** ingredients.", "timestamp": 95}
    ]}"#;

    #[test]
    fn parses_well_formed_steps_in_order() {
        let steps = parse_steps(WELL_FORMED).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].title, "Intro");
        assert_eq!(steps[1].timestamp, 95);
    }

    #[test]
    fn strips_disobedient_fences() {
        let fenced = format!("```json\n{WELL_FORMED}\n```");
        assert_eq!(parse_steps(&fenced).unwrap().len(), 2);

        let bare_fence = format!("```\n{WELL_FORMED}\n```");
        assert_eq!(parse_steps(&bare_fence).unwrap().len(), 2);
    }

    #[test]
    fn malformed_json_is_a_synthesis_failure() {
        let err = parse_steps("I could not produce JSON, sorry!").unwrap_err();
        assert!(matches!(err, GuideError::SynthesisFailed { .. }));

        let err = parse_steps(r#"{"steps": [{"title": "x"#).unwrap_err();
        assert!(matches!(err, GuideError::SynthesisFailed { .. }));
    }

    #[test]
    fn missing_envelope_field_is_a_synthesis_failure() {
        assert!(parse_steps(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn zero_steps_is_a_valid_degenerate_result() {
        assert_eq!(parse_steps(r#"{"steps": []}"#).unwrap().len(), 0);
    }

    fn candidate(title: &str, timestamp: i64) -> StepCandidate {
        StepCandidate {
            title: title.to_string(),
            description: "desc".to_string(),
            timestamp,
        }
    }

    #[test]
    fn pass_through_keeps_candidates_untouched() {
        let steps = apply_policy(vec![candidate("", -5)], TimestampPolicy::PassThrough).unwrap();
        assert_eq!(steps[0].timestamp, -5);
        assert_eq!(steps[0].title, "");
    }

    #[test]
    fn clamp_floors_negative_timestamps() {
        let steps = apply_policy(
            vec![candidate("a", -5), candidate("b", 10)],
            TimestampPolicy::Clamp,
        )
        .unwrap();
        assert_eq!(steps[0].timestamp, 0);
        assert_eq!(steps[1].timestamp, 10);
    }

    #[test]
    fn reject_fails_on_negative_timestamp_or_empty_title() {
        let err =
            apply_policy(vec![candidate("a", -1)], TimestampPolicy::Reject).unwrap_err();
        assert!(matches!(err, GuideError::InvalidStep { index: 0, .. }));

        let err = apply_policy(
            vec![candidate("a", 0), candidate("  ", 5)],
            TimestampPolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, GuideError::InvalidStep { index: 1, .. }));

        assert!(apply_policy(vec![candidate("a", 0)], TimestampPolicy::Reject).is_ok());
    }
}
