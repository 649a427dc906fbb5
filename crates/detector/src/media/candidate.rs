use serde::{Deserialize, Serialize};

use super::{Platform, VideoFormat};
use crate::detector::classifier::get_video_format;
use crate::detector::title::sanitize_title;

/// Size reported for every candidate. No byte-length probing is performed.
pub const UNKNOWN_SIZE: &str = "Unknown";

/// The detection strategy that produced a candidate.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OriginKind {
    /// `<video src>`
    DirectElement,
    /// `<video><source src></video>`
    NestedSource,
    /// Matched by a platform selector table.
    PlatformSpecific,
    /// Recorded by the network observer.
    StreamingDetected,
    /// Found in inline script text or an embedded player JSON blob.
    StreamingScriptScanned,
    /// A `blob:` locator, not fetchable outside the page.
    Blob,
}

impl OriginKind {
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            OriginKind::StreamingDetected | OriginKind::StreamingScriptScanned
        )
    }

    /// The `type` tag carried over the message boundary.
    pub fn type_tag(&self, platform: Platform) -> String {
        match self {
            OriginKind::DirectElement => "direct".to_string(),
            OriginKind::NestedSource => "source".to_string(),
            OriginKind::PlatformSpecific => platform.as_str().to_string(),
            OriginKind::StreamingDetected => "streaming".to_string(),
            OriginKind::StreamingScriptScanned => "streaming_script".to_string(),
            OriginKind::Blob => format!("{}_blob", platform.as_str()),
        }
    }
}

/// A detected, not-yet-confirmed video resource.
///
/// Candidates are produced by exactly one detection strategy during a scan
/// and live only until the scan result is reported.
///
/// ```rust
/// use video_detector::media::{OriginKind, Platform, VideoCandidate, VideoFormat};
///
/// let candidate = VideoCandidate::builder(
///     "https://cdn.example.com/clip.mp4",
///     OriginKind::DirectElement,
///     Platform::Generic,
/// )
/// .title("My clip")
/// .build();
///
/// assert_eq!(candidate.format, VideoFormat::Mp4);
/// assert_eq!(candidate.kind, "direct");
/// assert!(candidate.downloadable);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoCandidate {
    pub url: String,
    // raw locator as written in the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub origin: OriginKind,
    pub platform: Platform,
    pub format: VideoFormat,
    pub title: String,
    pub size: String,
    pub downloadable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

impl VideoCandidate {
    pub fn builder(
        url: impl Into<String>,
        origin: OriginKind,
        platform: Platform,
    ) -> VideoCandidateBuilder {
        VideoCandidateBuilder::new(url, origin, platform)
    }

    /// Canonical deduplication key: `url` when present, else `src`.
    pub fn dedup_key(&self) -> &str {
        if !self.url.is_empty() {
            &self.url
        } else {
            self.src.as_deref().unwrap_or_default()
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.origin.is_streaming() || self.format.is_streaming()
    }

    /// Checks the candidate invariants that survive the final scan filter.
    pub fn satisfies_invariants(&self, min_url_len: usize, min_streaming_url_len: usize) -> bool {
        if self.url.is_empty() {
            return false;
        }
        let len = self.url.chars().count();
        let long_enough = if self.is_streaming() {
            len > min_streaming_url_len
        } else {
            len >= min_url_len
        };
        let explained = self.downloadable || self.reason.as_deref().is_some_and(|r| !r.is_empty());
        long_enough && explained
    }

    /// Filename the download coordinator saves this candidate under.
    pub fn suggested_filename(&self) -> String {
        let stem = sanitize_title(&self.title, 100);
        let stem = if stem.is_empty() { "video" } else { stem.as_str() };
        format!("{stem}.{}", self.format.extension())
    }
}

#[derive(Debug, Clone)]
pub struct VideoCandidateBuilder {
    url: String,
    src: Option<String>,
    origin: OriginKind,
    platform: Platform,
    title: String,
    reason: Option<String>,
    alternative: Option<String>,
}

impl VideoCandidateBuilder {
    pub fn new(url: impl Into<String>, origin: OriginKind, platform: Platform) -> Self {
        Self {
            url: url.into(),
            src: None,
            origin,
            platform,
            title: String::new(),
            reason: None,
            alternative: None,
        }
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Marks the candidate as not directly downloadable.
    pub fn not_downloadable(
        mut self,
        reason: impl Into<String>,
        alternative: impl Into<String>,
    ) -> Self {
        self.reason = Some(reason.into());
        self.alternative = Some(alternative.into());
        self
    }

    pub fn build(self) -> VideoCandidate {
        let format = get_video_format(&self.url);
        let downloadable = self.reason.is_none();
        VideoCandidate {
            kind: self.origin.type_tag(self.platform),
            format,
            url: self.url,
            src: self.src,
            origin: self.origin,
            platform: self.platform,
            title: self.title,
            size: UNKNOWN_SIZE.to_string(),
            downloadable,
            reason: self.reason,
            alternative: self.alternative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(OriginKind::Blob.type_tag(Platform::TikTok), "tiktok_blob");
        assert_eq!(
            OriginKind::PlatformSpecific.type_tag(Platform::Instagram),
            "instagram"
        );
        assert_eq!(
            OriginKind::StreamingScriptScanned.type_tag(Platform::YouTube),
            "streaming_script"
        );
    }

    #[test]
    fn test_not_downloadable_carries_reason() {
        let candidate = VideoCandidate::builder(
            "blob:https://www.tiktok.com/3f1c2a9e-5d7b",
            OriginKind::Blob,
            Platform::TikTok,
        )
        .not_downloadable("in-memory stream", "use the manifest instead")
        .build();

        assert!(!candidate.downloadable);
        assert_eq!(candidate.format, VideoFormat::Blob);
        assert!(candidate.satisfies_invariants(20, 10));
    }

    #[test]
    fn test_length_floor() {
        let short = VideoCandidate::builder("https://a.io/v.mp4", OriginKind::DirectElement, Platform::Generic)
            .build();
        assert!(!short.satisfies_invariants(20, 10));

        let streaming = VideoCandidate::builder(
            "https://a.io/x.m3u8",
            OriginKind::StreamingDetected,
            Platform::Generic,
        )
        .build();
        assert!(streaming.satisfies_invariants(20, 10));
    }

    #[test]
    fn test_dedup_key_falls_back_to_src() {
        let mut candidate = VideoCandidate::builder("", OriginKind::NestedSource, Platform::Generic)
            .src("clip.mp4")
            .build();
        assert_eq!(candidate.dedup_key(), "clip.mp4");
        candidate.url = "https://cdn.example.com/clip.mp4".to_string();
        assert_eq!(candidate.dedup_key(), "https://cdn.example.com/clip.mp4");
    }

    #[test]
    fn test_serialized_shape() {
        let candidate = VideoCandidate::builder(
            "https://cdn.example.com/clip.mp4",
            OriginKind::DirectElement,
            Platform::Generic,
        )
        .title("Clip")
        .build();
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["type"], "direct");
        assert_eq!(value["format"], "MP4");
        assert_eq!(value["size"], "Unknown");
        assert!(value.get("reason").is_none());
        assert_eq!(candidate.suggested_filename(), "Clip.mp4");
    }
}
