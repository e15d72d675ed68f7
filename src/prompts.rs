//! Prompts and the enforced output schema for guide synthesis.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing how steps are asked for (tone,
//!    step granularity, timestamp rules) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts and schema directly
//!    without spinning up a real model, making prompt regressions easy to
//!    catch.
//!
//! Callers can override the system prompt via
//! [`crate::config::GuideConfig::system_prompt`]; the constants here are
//! used only when no override is provided. The schema is not overridable:
//! it is the contract that makes the model's free-form output
//! machine-parseable, and the parser in
//! [`crate::pipeline::synthesize`] depends on its exact shape.

use serde_json::{json, Value};

/// Default system prompt for turning a transcript into tutorial steps.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert technical writer. Your task is to convert a video transcript into a clear, step-by-step written tutorial.

Follow these rules precisely:

1. STEPS
   - Break the content into discrete, actionable steps in the order a reader should follow them
   - Each step gets a concise, bold-worthy title (a few words, no trailing punctuation)
   - Each step gets a description written as markdown prose: explain what to do and why, using **bold** for key terms and `code` for commands or values

2. TIMESTAMPS
   - The transcript annotates each line as [Ns] where N is the offset in seconds
   - Give every step the integer timestamp (in seconds) where that step begins in the video
   - Use only timestamps that appear in, or fall between, the transcript annotations

3. FIDELITY
   - Cover everything the video actually teaches; do not invent steps
   - Skip greetings, sponsor reads, and channel promotion

4. OUTPUT FORMAT
   - Output ONLY a JSON object of the form {"steps": [...]}
   - Do NOT wrap the JSON in markdown fences
   - Do NOT add commentary before or after the JSON"#;

/// The enforced response schema: an object with a single `steps` array whose
/// elements carry exactly the three required properties.
pub fn steps_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "steps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "timestamp": { "type": "integer" }
                    },
                    "required": ["title", "description", "timestamp"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["steps"],
        "additionalProperties": false
    })
}

/// Build the user message carrying the annotated transcript blob.
pub fn user_prompt(transcript: &str) -> String {
    format!(
        "Create a step-by-step guide from this video transcript:\n\n{}",
        transcript
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_exactly_the_three_step_fields() {
        let schema = steps_schema();
        let required = schema["properties"]["steps"]["items"]["required"]
            .as_array()
            .unwrap();
        let names: Vec<&str> = required.iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(names, vec!["title", "description", "timestamp"]);
        assert_eq!(
            schema["properties"]["steps"]["items"]["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn schema_top_level_is_a_steps_object() {
        let schema = steps_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["steps"]));
    }

    #[test]
    fn user_prompt_embeds_transcript() {
        let p = user_prompt("[0s] hello");
        assert!(p.contains("[0s] hello"));
    }
}
