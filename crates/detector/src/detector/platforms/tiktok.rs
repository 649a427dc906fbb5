use super::PlatformProfile;
use crate::media::Platform;

/// TikTok hydrates its player from `__UNIVERSAL_DATA_FOR_REHYDRATION__`
/// (older pages: `SIGI_STATE`); the `<video>` element usually holds a
/// `blob:` locator.
pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::TikTok,
    name: "TikTok",
    default_title: "TikTok Video",
    video_selectors: &[
        r#"[data-e2e="browse-video"] video"#,
        r#"[data-e2e="feed-video"] video"#,
        r#"div[class*="DivVideoContainer"] video"#,
        r#"div[class*="DivBasicPlayerWrapper"] video"#,
        ".tiktok-web-player video",
        "video",
    ],
    title_selectors: &[
        r#"[data-e2e="browse-video-desc"]"#,
        r#"[data-e2e="video-desc"]"#,
        r#"h1[data-e2e="video-title"]"#,
        r#"meta[property="og:title"]"#,
        r#"meta[name="description"]"#,
    ],
    title_suffixes: &[" | TikTok"],
    script_markers: &[
        "playAddr",
        "downloadAddr",
        "__UNIVERSAL_DATA_FOR_REHYDRATION__",
        "SIGI_STATE",
    ],
    script_fields: &["playAddr", "downloadAddr"],
    script_extractor: None,
};
