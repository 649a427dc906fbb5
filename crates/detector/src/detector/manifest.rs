//! Manifest discovery in script text and in the observed request log.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::detector::classifier::{is_streaming_url, is_valid_video_url};
use crate::detector::platforms::PlatformProfile;
use crate::detector::scan::ScanContext;
use crate::detector::title::TitleTarget;
use crate::detector::utils::capture_group_1_all;
use crate::media::{OriginKind, VideoCandidate};

/// Quoted strings carrying a manifest marker, then bare absolute manifest
/// URLs (with or without JSON-escaped slashes).
static MANIFEST_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#"(?i)["']([^"'\s<>]*(?:\.m3u8|\.mpd|/hls/|/dash/)[^"'\s<>]*)["']"#).unwrap(),
        Regex::new(
            r#"(?i)(https?:(?:\\?/){2}[^\s"'<>()]+?\.(?:m3u8|mpd)(?:[?#][^\s"'<>()]*)?)"#,
        )
        .unwrap(),
    ]
});

/// Collects script finds for one scan, dropping repeats.
struct ScriptScan<'c, 'a> {
    ctx: &'c ScanContext<'a>,
    seen: FxHashSet<String>,
    found: Vec<VideoCandidate>,
}

impl<'c, 'a> ScriptScan<'c, 'a> {
    fn new(ctx: &'c ScanContext<'a>) -> Self {
        Self {
            ctx,
            seen: FxHashSet::default(),
            found: Vec::new(),
        }
    }

    /// Runs the generic manifest battery over one script.
    fn battery(&mut self, script: &str) {
        for re in MANIFEST_PATTERNS.iter() {
            for raw in capture_group_1_all(re, script) {
                let Some(url) = self.ctx.resolve_url(raw.trim_end_matches('\\')) else {
                    trace!(raw, "unresolvable script url");
                    continue;
                };
                if !is_streaming_url(&url) || !self.seen.insert(url.clone()) {
                    continue;
                }
                let title = self.ctx.stream_title(&url);
                self.found.push(
                    VideoCandidate::builder(
                        url,
                        OriginKind::StreamingScriptScanned,
                        self.ctx.platform(),
                    )
                    .title(title)
                    .build(),
                );
            }
        }
    }

    /// Reads the profile's JSON media fields out of one marked script.
    fn fields(&mut self, profile: &PlatformProfile, script: &str) {
        let Some(re) = profile.field_regex() else {
            return;
        };
        for raw in capture_group_1_all(re, script) {
            let Some(url) = self.ctx.resolve_url(raw) else {
                continue;
            };
            let streaming = is_streaming_url(&url);
            if !(streaming || is_valid_video_url(&url)) || !self.seen.insert(url.clone()) {
                continue;
            }
            let origin = if streaming {
                OriginKind::StreamingScriptScanned
            } else {
                OriginKind::PlatformSpecific
            };
            let title = self
                .ctx
                .titles()
                .resolve_for_platform(profile, &TitleTarget::url(&url));
            self.found.push(
                VideoCandidate::builder(url, origin, profile.platform)
                    .title(title)
                    .build(),
            );
        }
    }

    fn extend(&mut self, candidates: Vec<VideoCandidate>) {
        for candidate in candidates {
            if self.seen.insert(candidate.url.clone()) {
                self.found.push(candidate);
            }
        }
    }
}

/// Generic battery over every inline script of the page.
pub fn scan_inline_scripts(ctx: &ScanContext<'_>) -> Vec<VideoCandidate> {
    let mut scan = ScriptScan::new(ctx);
    for script in ctx.doc().inline_scripts() {
        scan.battery(&script);
    }
    debug!(found = scan.found.len(), "inline script scan finished");
    scan.found
}

/// Platform extraction over the scripts carrying one of the profile's
/// player-data markers. Unmarked scripts are never examined.
pub fn scan_platform_scripts(
    ctx: &ScanContext<'_>,
    profile: &PlatformProfile,
) -> Vec<VideoCandidate> {
    if profile.script_markers.is_empty() {
        return Vec::new();
    }

    // the generic battery has already covered every script
    let run_battery = !ctx.config().scan_inline_scripts;
    let mut scan = ScriptScan::new(ctx);
    for script in ctx.doc().inline_scripts().filter(|s| profile.is_marked(s)) {
        if run_battery {
            scan.battery(&script);
        }
        scan.fields(profile, &script);
        if let Some(extract) = profile.script_extractor {
            scan.extend(extract(ctx, &script));
        }
    }
    debug!(
        platform = profile.name,
        found = scan.found.len(),
        "platform script scan finished"
    );
    scan.found
}

/// One candidate per URL the network observer recorded, in record order.
pub fn from_observed(ctx: &ScanContext<'_>, observed: &[String]) -> Vec<VideoCandidate> {
    observed
        .iter()
        .filter(|url| is_streaming_url(url))
        .map(|url| {
            VideoCandidate::builder(url.as_str(), OriginKind::StreamingDetected, ctx.platform())
                .title(ctx.stream_title(url))
                .build()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::config::DetectorConfig;
    use crate::detector::platforms;
    use crate::document::PageDocument;
    use crate::media::{Platform, VideoFormat};

    fn urls(found: &[VideoCandidate]) -> Vec<&str> {
        found.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn test_battery_finds_quoted_bare_and_escaped() {
        let html = r#"<title>Live</title><script>
            var a = "https://cdn.example.com/live/master.m3u8?token=1";
            var b = 'https://cdn.example.com/v/manifest.mpd';
            var c = {"u":"https:\/\/cdn.example.com\/x\/index.m3u8"};
            var d = "https://cdn.example.com/live/master.m3u8?token=1";
            var e = "/assets/app.js";
            load(https://bare.example.com/p/playlist.m3u8);
        </script>"#;
        let doc = PageDocument::parse("https://example.com/", html).unwrap();
        let config = DetectorConfig::default();
        let ctx = ScanContext::new(&doc, &config);
        let found = scan_inline_scripts(&ctx);

        assert_eq!(
            urls(&found),
            vec![
                "https://cdn.example.com/live/master.m3u8?token=1",
                "https://cdn.example.com/v/manifest.mpd",
                "https://cdn.example.com/x/index.m3u8",
                "https://bare.example.com/p/playlist.m3u8",
            ]
        );
        assert!(found.iter().all(|c| c.origin == OriginKind::StreamingScriptScanned));
        assert!(found.iter().all(|c| c.title == "Live"));
        assert_eq!(found[1].format, VideoFormat::Dash);
    }

    #[test]
    fn test_external_scripts_are_ignored() {
        let html = r#"<script src="https://cdn.example.com/hls/player.m3u8.js"></script>"#;
        let doc = PageDocument::parse("https://example.com/", html).unwrap();
        let config = DetectorConfig::default();
        let ctx = ScanContext::new(&doc, &config);
        assert!(scan_inline_scripts(&ctx).is_empty());
    }

    #[test]
    fn test_platform_fields_only_in_marked_scripts() {
        let html = r#"<script>var x = {"hd_src":"https:\/\/video.xx.fbcdn.net\/v\/clip.mp4?oh=1"};</script>
            <script>{"playable_url":"https:\/\/video.xx.fbcdn.net\/v\/a.mp4?oh=2"}</script>
            <script>{"unrelated":"https:\/\/video.xx.fbcdn.net\/v\/b.mp4"}</script>"#;
        let doc = PageDocument::parse("https://www.facebook.com/watch/?v=1", html).unwrap();
        let config = DetectorConfig::default();
        let ctx = ScanContext::new(&doc, &config);
        let profile = platforms::profile(Platform::Facebook).unwrap();
        let found = scan_platform_scripts(&ctx, profile);

        assert_eq!(
            urls(&found),
            vec![
                "https://video.xx.fbcdn.net/v/clip.mp4?oh=1",
                "https://video.xx.fbcdn.net/v/a.mp4?oh=2",
            ]
        );
        assert!(found.iter().all(|c| c.origin == OriginKind::PlatformSpecific));
        assert!(found.iter().all(|c| c.kind == "facebook"));
        assert!(found.iter().all(|c| c.title == "Facebook Video"));
    }

    #[test]
    fn test_marked_script_gets_battery_when_generic_scan_disabled() {
        let html = r#"<script>{"playAddr":"","cover":"https://v16.tiktokcdn.com/hls/v.m3u8"}</script>
            <script>var other = "https://cdn.example.com/hls/other.m3u8";</script>"#;
        let doc = PageDocument::parse("https://www.tiktok.com/@u/video/1", html).unwrap();
        let config = DetectorConfig {
            scan_inline_scripts: false,
            ..Default::default()
        };
        let ctx = ScanContext::new(&doc, &config);
        let profile = platforms::profile(Platform::TikTok).unwrap();
        let found = scan_platform_scripts(&ctx, profile);
        assert_eq!(urls(&found), vec!["https://v16.tiktokcdn.com/hls/v.m3u8"]);
        assert_eq!(found[0].platform, Platform::TikTok);
    }

    #[test]
    fn test_from_observed() {
        let doc = PageDocument::parse("https://example.com/", "<title>Show</title>").unwrap();
        let config = DetectorConfig::default();
        let ctx = ScanContext::new(&doc, &config);
        let observed = vec![
            "https://cdn.example.com/a/master.m3u8".to_string(),
            "https://cdn.example.com/a/b.mpd".to_string(),
        ];
        let found = from_observed(&ctx, &observed);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|c| c.kind == "streaming"));
        assert_eq!(found[0].title, "Show");
    }
}
