use super::PlatformProfile;
use crate::media::Platform;

/// Facebook embeds progressive MP4 URLs and DASH manifests in the relay
/// payloads of its inline scripts.
pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::Facebook,
    name: "Facebook",
    default_title: "Facebook Video",
    video_selectors: &[
        "div[data-video-id] video",
        r#"div[data-pagelet*="Video"] video"#,
        r#"div[data-pagelet*="Reels"] video"#,
        r#"[role="main"] video"#,
        "video",
    ],
    title_selectors: &[
        r#"meta[property="og:title"]"#,
        r#"div[data-ad-preview="message"]"#,
        r#"[data-ad-comet-preview="message"]"#,
        r#"meta[name="description"]"#,
    ],
    title_suffixes: &[" | Facebook", " - Facebook"],
    script_markers: &[
        "playable_url",
        "dash_manifest",
        "browser_native_hd_url",
        "hd_src",
        "sd_src",
    ],
    script_fields: &[
        "playable_url_quality_hd",
        "playable_url",
        "browser_native_hd_url",
        "browser_native_sd_url",
        "hd_src",
        "sd_src",
    ],
    script_extractor: None,
};
