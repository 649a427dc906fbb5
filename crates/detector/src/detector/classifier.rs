//! Pure URL classification: streaming heuristics, video validity, format and
//! platform detection.

use std::sync::LazyLock;

use regex::RegexSet;
use url::Url;

use crate::media::{Platform, VideoFormat};

/// Path and segment patterns that mark a streaming resource.
const STREAMING_PATTERNS: &[&str] = &[
    r"(?i)/hls/",
    r"(?i)/dash/",
    r"(?i)/stream/",
    r"(?i)/manifest/",
    r"(?i)playlist\.m3u8",
    r"(?i)master\.m3u8",
    r"(?i)index\.m3u8",
    r"(?i)\.ts(?:$|[?#])",
    r"(?i)segment-\d+",
];

static STREAMING_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(STREAMING_PATTERNS).unwrap());

const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".webm", ".ogg", ".ogv", ".avi", ".mov", ".wmv", ".flv", ".mkv", ".m4v", ".3gp",
];

const VIDEO_MIME_HINTS: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-flv",
    "video/x-matroska",
    "video%2fmp4",
    "video%2fwebm",
    "mime=video",
];

/// Ordered format markers. The first matching entry decides the format.
const FORMAT_MARKERS: &[(&str, VideoFormat)] = &[
    (r"(?i)m3u8", VideoFormat::Hls),
    (r"(?i)\.mpd\b", VideoFormat::Dash),
    (r"(?i)/dash/", VideoFormat::Dash),
    (r"(?i)\.(?:mp4|m4v)\b", VideoFormat::Mp4),
    (r"(?i)\.webm\b", VideoFormat::WebM),
    (r"(?i)\.(?:ogg|ogv)\b", VideoFormat::Ogg),
    (r"(?i)\.avi\b", VideoFormat::Avi),
    (r"(?i)\.mov\b", VideoFormat::Mov),
    (r"(?i)\.wmv\b", VideoFormat::Wmv),
    (r"(?i)\.flv\b", VideoFormat::Flv),
    (r"(?i)\.mkv\b", VideoFormat::Mkv),
    (r"(?i)\.ts(?:$|[?#])", VideoFormat::Ts),
    (r"(?i)/hls/", VideoFormat::Hls),
];

static FORMAT_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(FORMAT_MARKERS.iter().map(|(re, _)| *re)).unwrap());

/// Hostname table; entries match the hostname itself or any subdomain of it.
pub const PLATFORM_HOSTS: &[(&str, Platform)] = &[
    ("tiktok.com", Platform::TikTok),
    ("facebook.com", Platform::Facebook),
    ("fb.com", Platform::Facebook),
    ("fb.watch", Platform::Facebook),
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("youtube-nocookie.com", Platform::YouTube),
    ("instagram.com", Platform::Instagram),
    ("twitter.com", Platform::Twitter),
    ("x.com", Platform::Twitter),
    ("twitch.tv", Platform::Twitch),
];

/// True when the URL looks like an HLS/DASH manifest or a stream segment.
pub fn is_streaming_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    let lower = url.to_ascii_lowercase();
    lower.contains("m3u8") || lower.contains("mpd") || STREAMING_SET.is_match(&lower)
}

/// True for fetchable http(s) URLs that point at a video container.
///
/// `blob:` and `data:` URLs are always rejected: they cannot be fetched
/// outside the page that created them.
pub fn is_valid_video_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let path = parsed.path().to_ascii_lowercase();
    if VIDEO_EXTENSIONS.iter().any(|ext| path.contains(ext)) {
        return true;
    }

    let lower = url.to_ascii_lowercase();
    VIDEO_MIME_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Format of the resource behind `url`, derived from the URL alone.
pub fn get_video_format(url: &str) -> VideoFormat {
    let trimmed = url.trim_start();
    if trimmed
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("blob:"))
    {
        return VideoFormat::Blob;
    }

    FORMAT_SET
        .matches(trimmed)
        .iter()
        .next()
        .map(|idx| FORMAT_MARKERS[idx].1)
        .unwrap_or(VideoFormat::Unknown)
}

/// Platform hosting `hostname`, or [`Platform::Generic`].
pub fn detect_platform(hostname: &str) -> Platform {
    let host = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return Platform::Generic;
    }

    PLATFORM_HOSTS
        .iter()
        .find(|(domain, _)| {
            host == *domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
        .map(|(_, platform)| *platform)
        .unwrap_or_default()
}

/// Convenience wrapper over [`detect_platform`] for a full URL.
pub fn detect_platform_from_url(url: &str) -> Platform {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(detect_platform))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.example.com/live/master.m3u8", true)]
    #[case("https://cdn.example.com/v/manifest.MPD?token=1", true)]
    #[case("https://cdn.example.com/hls/720p/", true)]
    #[case("https://cdn.example.com/dash/video", true)]
    #[case("https://cdn.example.com/stream/abc", true)]
    #[case("https://cdn.example.com/v/segment-00042", true)]
    #[case("https://cdn.example.com/v/chunk.ts?x=1", true)]
    #[case("https://cdn.example.com/v/clip.mp4", false)]
    #[case("https://cdn.example.com/assets/app.tsx", false)]
    #[case("", false)]
    #[case("not even a url", false)]
    fn test_is_streaming_url(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(is_streaming_url(url), expected, "{url}");
    }

    #[rstest]
    #[case("https://cdn.example.com/clip.mp4", true)]
    #[case("http://cdn.example.com/a/b/movie.WEBM?sig=1", true)]
    #[case("https://video.example.com/play?mime=video/mp4&id=9", true)]
    #[case("https://cdn.example.com/image.png", false)]
    #[case("ftp://cdn.example.com/clip.mp4", false)]
    #[case("blob:https://www.example.com/clip.mp4", false)]
    #[case("data:video/mp4;base64,AAAA", false)]
    #[case("/relative/clip.mp4", false)]
    fn test_is_valid_video_url(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(is_valid_video_url(url), expected, "{url}");
    }

    #[rstest]
    #[case("https://e.com/hls/master.m3u8", VideoFormat::Hls)]
    #[case("https://e.com/v/manifest.mpd", VideoFormat::Dash)]
    #[case("https://e.com/v/clip.mp4?x=1", VideoFormat::Mp4)]
    #[case("https://e.com/v/clip.webm", VideoFormat::WebM)]
    #[case("https://e.com/v/clip.ogv", VideoFormat::Ogg)]
    #[case("https://e.com/v/clip.avi", VideoFormat::Avi)]
    #[case("https://e.com/v/clip.MOV", VideoFormat::Mov)]
    #[case("https://e.com/v/clip.wmv", VideoFormat::Wmv)]
    #[case("https://e.com/v/clip.flv", VideoFormat::Flv)]
    #[case("https://e.com/v/clip.mkv", VideoFormat::Mkv)]
    #[case("https://e.com/hls/seg-1.ts", VideoFormat::Ts)]
    #[case("https://e.com/hls/live", VideoFormat::Hls)]
    #[case("blob:https://e.com/3f1c", VideoFormat::Blob)]
    #[case("https://e.com/watch?v=1", VideoFormat::Unknown)]
    #[case("https://e.com/movies/list", VideoFormat::Unknown)]
    fn test_get_video_format(#[case] url: &str, #[case] expected: VideoFormat) {
        assert_eq!(get_video_format(url), expected, "{url}");
    }

    #[rstest]
    #[case("www.tiktok.com", Platform::TikTok)]
    #[case("m.facebook.com", Platform::Facebook)]
    #[case("fb.com", Platform::Facebook)]
    #[case("fb.watch", Platform::Facebook)]
    #[case("www.youtube.com", Platform::YouTube)]
    #[case("youtu.be", Platform::YouTube)]
    #[case("WWW.INSTAGRAM.COM", Platform::Instagram)]
    #[case("x.com", Platform::Twitter)]
    #[case("mobile.twitter.com", Platform::Twitter)]
    #[case("www.twitch.tv.", Platform::Twitch)]
    #[case("box.com", Platform::Generic)]
    #[case("notyoutube.com", Platform::Generic)]
    #[case("", Platform::Generic)]
    fn test_detect_platform(#[case] host: &str, #[case] expected: Platform) {
        assert_eq!(detect_platform(host), expected, "{host}");
    }

    #[test]
    fn test_detect_platform_from_url() {
        assert_eq!(
            detect_platform_from_url("https://www.youtube.com/watch?v=abc"),
            Platform::YouTube
        );
        assert_eq!(detect_platform_from_url("garbage"), Platform::Generic);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_manifest_urls_are_streaming(
            host in "[a-z]{3,12}",
            path in "[a-z0-9/]{0,20}",
            ext in prop::sample::select(vec![".m3u8", ".mpd", ".M3U8"]),
            query in "(\\?[a-z]{1,5}=[a-z0-9]{1,5})?",
        ) {
            let url = format!("https://{host}.com/{path}video{ext}{query}");
            prop_assert!(is_streaming_url(&url));
        }

        #[test]
        fn prop_plain_urls_are_not_streaming(
            host in "[a-z]{3,12}",
            segments in prop::collection::vec("[a-z]{1,8}", 0..4),
            ext in prop::sample::select(vec![".mp4", ".webm", ".jpg", ".html", ""]),
        ) {
            let url = format!("https://{host}.com/{}/file{ext}", segments.join("/"));
            for marker in ["m3u8", "mpd", "/hls/", "/dash/", "/stream/", "/manifest/", "segment-"] {
                prop_assume!(!url.contains(marker));
            }
            prop_assert!(!is_streaming_url(&url));
        }

        #[test]
        fn prop_blob_and_data_never_valid(
            scheme in prop::sample::select(vec!["blob:", "data:", "BLOB:", "Data:"]),
            rest in "[a-z:/.]{0,30}",
            ext in prop::sample::select(vec![".mp4", ".webm", ".mkv", ""]),
        ) {
            let url = format!("{scheme}https://example.com/{rest}{ext}");
            prop_assert!(!is_valid_video_url(&url));
        }

        #[test]
        fn prop_classifiers_never_panic(input in ".{0,80}") {
            let _ = is_streaming_url(&input);
            let _ = is_valid_video_url(&input);
            let _ = get_video_format(&input);
            let _ = detect_platform(&input);
        }
    }
}
