//! End-to-end pipeline tests against injected fakes.
//!
//! No network: the generative model and caption source are trait fakes, and
//! the oEmbed endpoint points at a connection-refusing address so metadata
//! deterministically falls back to defaults. Live runs (real yt-dlp, real
//! model endpoint) are deliberately not exercised here.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vid2guide::{
    generate_guide, pipeline::resolve, CaptionLine, CaptionSource, GenerativeModel, GuideConfig,
    GuideError, GuidePhase, GuideProgressCallback, ModelRequest, VideoId,
};

// Connection-refused immediately; keeps the metadata stage offline.
const DEAD_OEMBED: &str = "http://127.0.0.1:9/oembed";

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Model fake returning a canned response and counting invocations.
struct CannedModel {
    response: String,
    calls: AtomicUsize,
}

impl CannedModel {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(CannedModel {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl GenerativeModel for CannedModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String, GuideError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // The enforced schema must ride along on every request.
        assert_eq!(request.response_schema["required"][0], "steps");
        Ok(self.response.clone())
    }
}

/// Caption fake that records the requested languages and succeeds only on
/// the configured call indices.
struct ScriptedCaptions {
    calls: Mutex<Vec<Option<String>>>,
    succeed_on: Vec<usize>,
}

impl ScriptedCaptions {
    fn new(succeed_on: Vec<usize>) -> Arc<Self> {
        Arc::new(ScriptedCaptions {
            calls: Mutex::new(Vec::new()),
            succeed_on,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CaptionSource for ScriptedCaptions {
    async fn fetch(
        &self,
        _id: &VideoId,
        language: Option<&str>,
    ) -> Result<Vec<CaptionLine>, GuideError> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(language.map(String::from));
        if self.succeed_on.contains(&index) {
            Ok(vec![
                CaptionLine {
                    start_seconds: 0.0,
                    text: "Intro".into(),
                },
                CaptionLine {
                    start_seconds: 30.2,
                    text: "Step one".into(),
                },
            ])
        } else {
            Err(GuideError::CaptionTool {
                detail: "captions disabled".into(),
            })
        }
    }
}

/// Progress recorder capturing phases and error messages.
#[derive(Default)]
struct Recorder {
    phases: Mutex<Vec<GuidePhase>>,
    errors: Mutex<Vec<String>>,
}

impl GuideProgressCallback for Recorder {
    fn on_phase(&self, phase: GuidePhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

const ONE_STEP: &str = r#"{"steps": [
    {"title": "Intro", "description": "What this video covers.", "timestamp": 0}
]}"#;

fn config_with(
    model: Arc<CannedModel>,
    captions: Arc<ScriptedCaptions>,
) -> vid2guide::GuideConfigBuilder {
    GuideConfig::builder()
        .model_override(model)
        .caption_source(captions)
        .oembed_url(DEAD_OEMBED)
        .metadata_timeout_secs(1)
}

// ── Resolution properties ────────────────────────────────────────────────────

#[test]
fn all_url_forms_share_one_identifier() {
    let forms = [
        "https://youtu.be/abcdefghijk",
        "https://www.youtube.com/watch?v=abcdefghijk",
        "https://www.youtube.com/shorts/abcdefghijk",
    ];
    let ids: Vec<String> = forms
        .iter()
        .map(|f| resolve::resolve(f).unwrap().to_string())
        .collect();
    assert!(ids.iter().all(|id| id == "abcdefghijk"));
}

#[test]
fn wrong_token_length_never_resolves() {
    for bad in [
        "https://youtu.be/abc",
        "https://www.youtube.com/watch?v=abcdefghijkl",
        "https://www.youtube.com/shorts/abcdefghij",
    ] {
        assert!(resolve::resolve(bad).is_err(), "{bad} should not resolve");
    }
}

// ── End-to-end scenarios ─────────────────────────────────────────────────────

#[tokio::test]
async fn manual_transcript_end_to_end() {
    let model = CannedModel::new(ONE_STEP);
    let captions = ScriptedCaptions::new(vec![]);
    let config = config_with(model.clone(), captions.clone()).build().unwrap();

    let output = generate_guide(
        "https://youtu.be/abcdefghijk",
        Some("[0s] Intro\n[30s] Step one"),
        &config,
    )
    .await
    .unwrap();

    // Manual mode: no remote caption fetch happened at all.
    assert_eq!(captions.call_count(), 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);

    let guide = &output.guide;
    assert_eq!(guide.video_id.as_str(), "abcdefghijk");
    assert_eq!(guide.steps.len(), 1);
    assert_eq!(guide.steps[0].title, "Intro");
    assert!(guide.steps[0].video_url.contains("abcdefghijk&t=0s"));
    assert!(guide.steps[0].image_url.contains("hqdefault.jpg"));
    // Metadata endpoint is unreachable: defaults apply, run still succeeds.
    assert_eq!(guide.author, "Unknown Creator");
    assert_eq!(guide.title, "YouTube Video");
}

#[tokio::test]
async fn invalid_url_fails_before_any_network_call() {
    let model = CannedModel::new(ONE_STEP);
    let captions = ScriptedCaptions::new(vec![0]);
    let config = config_with(model.clone(), captions.clone()).build().unwrap();

    let err = generate_guide("not a url", None, &config).await.unwrap_err();

    assert!(matches!(err, GuideError::InvalidUrl { .. }));
    assert_eq!(captions.call_count(), 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn language_fallback_succeeds_on_second_tier() {
    let model = CannedModel::new(ONE_STEP);
    // First call (preferred language) fails, second (default) succeeds.
    let captions = ScriptedCaptions::new(vec![1]);
    let config = config_with(model, captions.clone())
        .language("fr")
        .build()
        .unwrap();

    let output = generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap();

    assert_eq!(
        *captions.calls.lock().unwrap(),
        vec![Some("fr".to_string()), None]
    );
    assert_eq!(output.guide.steps.len(), 1);
    // The fetched cues became the annotated blob.
    assert!(output.stats.transcript_chars > 0);
}

#[tokio::test]
async fn exhausted_transcript_tiers_fail_with_manual_suggestion() {
    let model = CannedModel::new(ONE_STEP);
    let captions = ScriptedCaptions::new(vec![]);
    let config = config_with(model.clone(), captions.clone()).build().unwrap();

    let err = generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap_err();

    assert!(matches!(err, GuideError::TranscriptUnavailable { .. }));
    assert!(err.user_message().contains("manually"));
    assert_eq!(captions.call_count(), 2);
    // Synthesis never ran.
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn n_steps_round_trip_in_order() {
    let response = r#"{"steps": [
        {"title": "Third shown first", "description": "a", "timestamp": 300},
        {"title": "Then earlier", "description": "b", "timestamp": 10},
        {"title": "Finale", "description": "c", "timestamp": 200}
    ]}"#;
    let model = CannedModel::new(response);
    let captions = ScriptedCaptions::new(vec![0]);
    let config = config_with(model, captions).build().unwrap();

    let output = generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap();

    let guide = &output.guide;
    assert_eq!(guide.steps.len(), 3);
    // Narrative order is preserved — never re-sorted by timestamp.
    assert_eq!(guide.steps[0].title, "Third shown first");
    assert_eq!(guide.steps[1].title, "Then earlier");
    assert_eq!(guide.steps[2].title, "Finale");
    for step in &guide.steps {
        assert!(step
            .video_url
            .contains(&format!("&t={}s", step.timestamp_seconds)));
    }
}

#[tokio::test]
async fn malformed_model_output_yields_synthesis_error() {
    let model = CannedModel::new("Sorry, I cannot help with that.");
    let captions = ScriptedCaptions::new(vec![0]);
    let config = config_with(model, captions).build().unwrap();

    let err = generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap_err();

    assert!(matches!(err, GuideError::SynthesisFailed { .. }));
    assert_eq!(err.user_message(), "Failed to parse AI response");
}

#[tokio::test]
async fn empty_steps_is_a_valid_degenerate_guide() {
    let model = CannedModel::new(r#"{"steps": []}"#);
    let captions = ScriptedCaptions::new(vec![0]);
    let config = config_with(model, captions).build().unwrap();

    let output = generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap();
    assert!(output.guide.steps.is_empty());
}

// ── Progress observation ─────────────────────────────────────────────────────

#[tokio::test]
async fn progress_percent_is_monotone_and_ends_ready() {
    let recorder = Arc::new(Recorder::default());
    let model = CannedModel::new(ONE_STEP);
    let captions = ScriptedCaptions::new(vec![0]);
    let config = config_with(model, captions)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap();

    let phases = recorder.phases.lock().unwrap().clone();
    assert_eq!(phases.first(), Some(&GuidePhase::Resolving));
    assert_eq!(phases.last(), Some(&GuidePhase::Ready));
    let percents: Vec<u8> = phases.iter().map(|p| p.percent()).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
    assert!(recorder.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failure_reports_exactly_one_user_message() {
    let recorder = Arc::new(Recorder::default());
    let model = CannedModel::new(ONE_STEP);
    let captions = ScriptedCaptions::new(vec![]);
    let config = config_with(model, captions)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap_err();

    let phases = recorder.phases.lock().unwrap().clone();
    assert_eq!(phases.last(), Some(&GuidePhase::Failed));
    let errors = recorder.errors.lock().unwrap().clone();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("manually"));
}

// ── Export flow ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn generated_guide_title_drives_the_export_filename() {
    use image::{DynamicImage, Rgb, RgbImage};
    use vid2guide::{export_to_file, ExportOptions, Snapshot};

    let model = CannedModel::new(ONE_STEP);
    let captions = ScriptedCaptions::new(vec![0]);
    let config = config_with(model, captions).build().unwrap();

    let output = generate_guide("https://youtu.be/abcdefghijk", None, &config)
        .await
        .unwrap();

    let snapshot = Snapshot::from_image(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        16,
        24,
        Rgb([250, 250, 250]),
    )))
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = export_to_file(
        snapshot,
        &output.guide.title,
        dir.path(),
        ExportOptions::default(),
    )
    .await
    .unwrap();

    // Default metadata title "YouTube Video" sanitises to "YouTubeVideo".
    assert_eq!(path.file_name().unwrap(), "YouTubeVideo_Guide.pdf");
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}
