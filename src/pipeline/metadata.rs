//! Metadata fetching via the public oEmbed endpoint.
//!
//! ## Why this stage never fails
//!
//! Metadata is cosmetic — it decorates the guide header, nothing more. A
//! metadata outage must never block guide generation, so every failure mode
//! (transport error, non-2xx status, missing field, timeout) degrades to
//! the per-field defaults in [`VideoMetadata::fallback`] with a logged
//! warning. The contract is an infallible `VideoMetadata`, not a `Result`.

use crate::guide::{VideoId, VideoMetadata};
use crate::pipeline::enrich;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Payload shape of the oEmbed response; only the fields we use.
#[derive(Debug, Deserialize)]
struct OEmbedPayload {
    title: Option<String>,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

/// Fetch title/author/thumbnail for a video. Never fails.
///
/// `oembed_url` is the endpoint base (see
/// [`crate::config::DEFAULT_OEMBED_URL`]); the watch URL and format are
/// appended as query parameters.
pub async fn fetch_metadata(
    oembed_url: &str,
    id: &VideoId,
    timeout_secs: u64,
) -> VideoMetadata {
    match try_fetch(oembed_url, id, timeout_secs).await {
        Ok(payload) => {
            debug!(video = %id, "oEmbed metadata received");
            let fallback_thumb = enrich::thumbnail_url(id);
            VideoMetadata {
                title: non_empty(payload.title, VideoMetadata::DEFAULT_TITLE),
                author: non_empty(payload.author_name, VideoMetadata::DEFAULT_AUTHOR),
                thumbnail_url: non_empty(payload.thumbnail_url, &fallback_thumb),
            }
        }
        Err(reason) => {
            warn!(video = %id, %reason, "metadata lookup failed; using defaults");
            VideoMetadata::fallback(id)
        }
    }
}

async fn try_fetch(
    oembed_url: &str,
    id: &VideoId,
    timeout_secs: u64,
) -> Result<OEmbedPayload, String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| e.to_string())?;

    let response = client
        .get(oembed_url)
        .query(&[("url", id.watch_url().as_str()), ("format", "json")])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    response.json::<OEmbedPayload>().await.map_err(|e| e.to_string())
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::VideoId;

    #[test]
    fn non_empty_prefers_value() {
        assert_eq!(non_empty(Some("A Title".into()), "default"), "A Title");
        assert_eq!(non_empty(Some("  ".into()), "default"), "default");
        assert_eq!(non_empty(None, "default"), "default");
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_defaults() {
        let id = VideoId::new("abcdefghijk").unwrap();
        // Port 9 (discard) refuses connections immediately.
        let meta = fetch_metadata("http://127.0.0.1:9/oembed", &id, 1).await;
        assert_eq!(meta.title, VideoMetadata::DEFAULT_TITLE);
        assert_eq!(meta.author, VideoMetadata::DEFAULT_AUTHOR);
        assert!(meta.thumbnail_url.contains("abcdefghijk"));
    }
}
