use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::PlatformProfile;
use crate::detector::scan::ScanContext;
use crate::media::{OriginKind, Platform, VideoCandidate};

/// `ytInitialPlayerResponse = {...}`, `var ytInitialPlayerResponse = {...}`
/// and `window["ytInitialPlayerResponse"] = {...}`.
static PLAYER_RESPONSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"ytInitialPlayerResponse["']?\]?\s*=\s*"#).unwrap());

/// JSON pointers of the manifest URLs inside the player response.
const MANIFEST_POINTERS: &[&str] = &[
    "/streamingData/hlsManifestUrl",
    "/streamingData/dashManifestUrl",
];

pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::YouTube,
    name: "YouTube",
    default_title: "YouTube Video",
    video_selectors: &[
        "#movie_player video",
        "video.html5-main-video",
        "ytd-player video",
        "video.video-stream",
    ],
    title_selectors: &[
        "h1.ytd-watch-metadata yt-formatted-string",
        "h1.title yt-formatted-string",
        r#"meta[name="title"]"#,
        r#"meta[property="og:title"]"#,
    ],
    title_suffixes: &[" - YouTube"],
    script_markers: &["ytInitialPlayerResponse"],
    script_fields: &[],
    script_extractor: Some(extract_player_response),
};

/// Reads the HLS and DASH manifest URLs out of the embedded player response.
///
/// A missing or malformed response yields nothing.
pub fn extract_player_response(ctx: &ScanContext<'_>, script: &str) -> Vec<VideoCandidate> {
    let mut candidates = Vec::new();

    for assignment in PLAYER_RESPONSE_REGEX.find_iter(script) {
        let rest = &script[assignment.end()..];
        let response = match serde_json::Deserializer::from_str(rest)
            .into_iter::<Value>()
            .next()
        {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                debug!(error = %e, "YouTube: malformed ytInitialPlayerResponse, skipping");
                continue;
            }
            None => continue,
        };

        let title = match ctx.page_title() {
            "" => PROFILE.default_title.to_string(),
            title => title.to_string(),
        };

        for pointer in MANIFEST_POINTERS {
            let Some(raw) = response.pointer(pointer).and_then(Value::as_str) else {
                continue;
            };
            let Some(url) = ctx.resolve_url(raw) else {
                debug!(raw, "YouTube: unresolvable manifest url");
                continue;
            };
            candidates.push(
                VideoCandidate::builder(url, OriginKind::StreamingScriptScanned, Platform::YouTube)
                    .title(title.clone())
                    .build(),
            );
        }
    }

    candidates
}
