use super::PlatformProfile;
use crate::media::Platform;

pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::Instagram,
    name: "Instagram",
    default_title: "Instagram Video",
    video_selectors: &[
        "article video",
        r#"div[role="presentation"] video"#,
        "main section video",
        "video[playsinline]",
    ],
    title_selectors: &[
        r#"meta[property="og:title"]"#,
        "article h1",
        r#"meta[name="description"]"#,
    ],
    title_suffixes: &[" • Instagram", " | Instagram", " on Instagram"],
    script_markers: &[],
    script_fields: &[],
    script_extractor: None,
};
