use super::PlatformProfile;
use crate::media::Platform;

/// Twitch delivers live and VOD playback through HLS; the player element
/// itself normally carries a `blob:` locator.
pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::Twitch,
    name: "Twitch",
    default_title: "Twitch Video",
    video_selectors: &[
        r#"[data-a-target="video-player"] video"#,
        ".video-player__container video",
        ".video-player video",
        "video",
    ],
    title_selectors: &[
        r#"h2[data-a-target="stream-title"]"#,
        r#"[data-a-target="stream-title"]"#,
        r#"meta[property="og:title"]"#,
        r#"meta[name="title"]"#,
    ],
    title_suffixes: &[" - Twitch"],
    script_markers: &[],
    script_fields: &[],
    script_extractor: None,
};
