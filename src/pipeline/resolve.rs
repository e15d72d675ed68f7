//! Identifier resolution: map a raw URL string to a validated [`VideoId`].
//!
//! Purely syntactic — this stage never touches the network. Three URL forms
//! are recognised through structured parsing:
//!
//! - `https://youtu.be/<id>` (short-link host, path-only identifier)
//! - `https://www.youtube.com/watch?v=<id>` (canonical host, query parameter)
//! - `https://www.youtube.com/shorts/<id>` (canonical host, shorts path)
//!
//! When the input is so malformed that URL parsing fails outright, a
//! permissive pattern match over the known markers (`v=`, `youtu.be/`,
//! `shorts/`) gets one last chance; the captured token is accepted only if
//! it is exactly 11 identifier characters. Everything else is
//! [`GuideError::InvalidUrl`].

use crate::error::GuideError;
use crate::guide::VideoId;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

static RE_MARKER_FALLBACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:v=|youtu\.be/|shorts/)([A-Za-z0-9_-]+)").unwrap());

/// Resolve a raw URL string to a video identifier.
pub fn resolve(url: &str) -> Result<VideoId, GuideError> {
    let invalid = || GuideError::InvalidUrl {
        input: url.to_string(),
    };
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(GuideError::MissingUrl);
    }

    match Url::parse(trimmed) {
        Ok(parsed) => {
            let token = structured_token(&parsed).ok_or_else(invalid)?;
            VideoId::new(&token).map_err(|_| invalid())
        }
        Err(_) => {
            // Malformed URL: permissive marker match, 11-char tokens only.
            let caps = RE_MARKER_FALLBACK.captures(trimmed).ok_or_else(invalid)?;
            VideoId::new(&caps[1]).map_err(|_| invalid())
        }
    }
}

fn is_youtube_host(host: &str) -> bool {
    let h = host.to_ascii_lowercase();
    h == "youtube.com" || h.ends_with(".youtube.com")
}

/// Extract the identifier token from a successfully parsed URL, or None if
/// no supported form matches.
fn structured_token(url: &Url) -> Option<String> {
    let host = url.host_str()?;

    // youtu.be/<id>
    if host.eq_ignore_ascii_case("youtu.be") {
        let seg = url.path_segments()?.next()?.trim();
        if !seg.is_empty() {
            return Some(seg.to_string());
        }
        return None;
    }

    if !is_youtube_host(host) {
        return None;
    }

    // youtube.com/watch?v=<id>
    if url.path() == "/watch" {
        return url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty());
    }

    // youtube.com/shorts/<id>
    let mut segs = url.path_segments()?;
    if segs.next() == Some("shorts") {
        let id = segs.next().unwrap_or("").trim();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_forms_resolve_to_the_same_id() {
        let forms = [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&list=PL123",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
        ];
        for form in forms {
            assert_eq!(
                resolve(form).unwrap().as_str(),
                "dQw4w9WgXcQ",
                "failed for {form}"
            );
        }
    }

    #[test]
    fn wrong_length_token_always_fails() {
        assert!(resolve("https://youtu.be/short").is_err());
        assert!(resolve("https://www.youtube.com/watch?v=waytoolongid").is_err());
        assert!(resolve("https://www.youtube.com/shorts/tiny").is_err());
    }

    #[test]
    fn unrelated_hosts_fail() {
        assert!(resolve("https://vimeo.com/12345678901").is_err());
        assert!(resolve("https://example.com/watch?v=dQw4w9WgXcQ").is_err());
    }

    #[test]
    fn plain_garbage_fails() {
        assert!(matches!(
            resolve("not a url"),
            Err(GuideError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn empty_input_is_missing_url() {
        assert!(matches!(resolve("   "), Err(GuideError::MissingUrl)));
    }

    #[test]
    fn fallback_matches_markers_in_unparseable_input() {
        // No scheme, so Url::parse rejects it; the marker fallback applies.
        assert_eq!(
            resolve("youtu.be/dQw4w9WgXcQ").unwrap().as_str(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            resolve("www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap().as_str(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn fallback_rejects_wrong_length_capture() {
        assert!(resolve("youtu.be/dQw4w9WgXcQtoolong").is_err());
        assert!(resolve("watch?v=short").is_err());
    }

    #[test]
    fn watch_without_v_param_fails() {
        assert!(resolve("https://www.youtube.com/watch?list=PL123").is_err());
    }
}
