//! Static per-platform detection tables.
//!
//! Each platform module exports a [`PlatformProfile`]; the registry below is
//! the single place that maps a [`Platform`] to its profile.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use scraper::Selector;

use crate::detector::scan::ScanContext;
use crate::detector::utils::parse_selectors;
use crate::media::{Platform, VideoCandidate};

pub mod facebook;
pub mod instagram;
pub mod tiktok;
pub mod twitch;
pub mod twitter;
pub mod youtube;

/// Deep extraction over one inline script that carries the platform marker.
pub type ScriptExtractor = fn(&ScanContext<'_>, &str) -> Vec<VideoCandidate>;

/// Declarative description of how a platform exposes its videos.
pub struct PlatformProfile {
    pub platform: Platform,
    /// Display name, e.g. "TikTok".
    pub name: &'static str,
    /// Title used when nothing on the page yields one.
    pub default_title: &'static str,
    /// Player selectors, most specific container first.
    pub video_selectors: &'static [&'static str],
    /// Document-wide title selectors, probed in order.
    pub title_selectors: &'static [&'static str],
    /// Suffixes the platform appends to the document title.
    pub title_suffixes: &'static [&'static str],
    /// Substrings identifying scripts that carry player data.
    pub script_markers: &'static [&'static str],
    /// JSON string fields holding media URLs inside marked scripts.
    pub script_fields: &'static [&'static str],
    pub script_extractor: Option<ScriptExtractor>,
}

struct CompiledProfile {
    video_selectors: Vec<Selector>,
    title_selectors: Vec<Selector>,
    field_regex: Option<Regex>,
}

macro_rules! platform_registry {
    ( $( $profile:path ),+ $(,)? ) => {
        &[ $( &$profile ),+ ]
    };
}

static PLATFORMS: &[&PlatformProfile] = platform_registry![
    tiktok::PROFILE,
    facebook::PROFILE,
    youtube::PROFILE,
    instagram::PROFILE,
    twitter::PROFILE,
    twitch::PROFILE,
];

static COMPILED: LazyLock<FxHashMap<Platform, CompiledProfile>> = LazyLock::new(|| {
    PLATFORMS
        .iter()
        .map(|profile| (profile.platform, profile.compile()))
        .collect()
});

impl PlatformProfile {
    fn compile(&self) -> CompiledProfile {
        let field_regex = (!self.script_fields.is_empty()).then(|| {
            let fields = self
                .script_fields
                .iter()
                .map(|f| regex::escape(f))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r#""(?:{fields})"\s*:\s*"((?:[^"\\]|\\.)*)""#)).unwrap()
        });
        CompiledProfile {
            video_selectors: parse_selectors(self.video_selectors).unwrap(),
            title_selectors: parse_selectors(self.title_selectors).unwrap(),
            field_regex,
        }
    }

    fn compiled(&self) -> Option<&'static CompiledProfile> {
        COMPILED.get(&self.platform)
    }

    pub fn video_selectors(&self) -> &'static [Selector] {
        self.compiled()
            .map(|c| c.video_selectors.as_slice())
            .unwrap_or_default()
    }

    pub fn title_selectors(&self) -> &'static [Selector] {
        self.compiled()
            .map(|c| c.title_selectors.as_slice())
            .unwrap_or_default()
    }

    /// Matches `"field": "value"` pairs for the profile's script fields.
    pub fn field_regex(&self) -> Option<&'static Regex> {
        self.compiled().and_then(|c| c.field_regex.as_ref())
    }

    /// True when `script` carries one of the platform's player-data markers.
    pub fn is_marked(&self, script: &str) -> bool {
        self.script_markers.iter().any(|m| script.contains(m))
    }
}

/// Profile for `platform`; `None` for [`Platform::Generic`].
pub fn profile(platform: Platform) -> Option<&'static PlatformProfile> {
    PLATFORMS.iter().copied().find(|p| p.platform == platform)
}

/// All registered profiles, in registry order.
pub fn profiles() -> &'static [&'static PlatformProfile] {
    PLATFORMS
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_platform_but_generic_is_registered() {
        for platform in Platform::iter() {
            assert_eq!(profile(platform).is_some(), !platform.is_generic(), "{platform}");
        }
    }

    #[test]
    fn test_all_tables_compile() {
        for profile in profiles() {
            assert_eq!(profile.video_selectors().len(), profile.video_selectors.len());
            assert_eq!(profile.title_selectors().len(), profile.title_selectors.len());
            assert_eq!(profile.field_regex().is_some(), !profile.script_fields.is_empty());
            assert!(profile.default_title.starts_with(profile.name));
        }
    }

    #[test]
    fn test_field_regex_captures_escaped_values() {
        let profile = profile(Platform::TikTok).unwrap();
        let re = profile.field_regex().unwrap();
        let script = r#"{"playAddr":"https:\/\/v16.tiktokcdn.com\/a\"b.mp4","other":"x"}"#;
        let caps = re.captures(script).unwrap();
        assert_eq!(&caps[1], r#"https:\/\/v16.tiktokcdn.com\/a\"b.mp4"#);
    }
}
