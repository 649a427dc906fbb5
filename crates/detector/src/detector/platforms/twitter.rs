use super::PlatformProfile;
use crate::media::Platform;

pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::Twitter,
    name: "Twitter",
    default_title: "Twitter Video",
    video_selectors: &[
        r#"[data-testid="videoPlayer"] video"#,
        r#"[data-testid="videoComponent"] video"#,
        "article video",
    ],
    title_selectors: &[
        r#"article [data-testid="tweetText"]"#,
        r#"meta[property="og:title"]"#,
        r#"meta[property="og:description"]"#,
    ],
    title_suffixes: &[" / X", " / Twitter"],
    script_markers: &[],
    script_fields: &[],
    script_extractor: None,
};
