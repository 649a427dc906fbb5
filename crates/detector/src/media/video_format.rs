use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Container or protocol format of a detected resource.
///
/// Always derived from the resource URL, never from its content.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum VideoFormat {
    #[serde(rename = "MP4")]
    #[strum(serialize = "MP4")]
    Mp4,
    #[serde(rename = "WebM")]
    #[strum(serialize = "WebM")]
    WebM,
    #[serde(rename = "OGG")]
    #[strum(serialize = "OGG")]
    Ogg,
    #[serde(rename = "AVI")]
    #[strum(serialize = "AVI")]
    Avi,
    #[serde(rename = "MOV")]
    #[strum(serialize = "MOV")]
    Mov,
    #[serde(rename = "WMV")]
    #[strum(serialize = "WMV")]
    Wmv,
    #[serde(rename = "FLV")]
    #[strum(serialize = "FLV")]
    Flv,
    #[serde(rename = "MKV")]
    #[strum(serialize = "MKV")]
    Mkv,
    #[serde(rename = "HLS")]
    #[strum(serialize = "HLS")]
    Hls,
    #[serde(rename = "DASH")]
    #[strum(serialize = "DASH")]
    Dash,
    #[serde(rename = "TS")]
    #[strum(serialize = "TS")]
    Ts,
    #[serde(rename = "Blob")]
    #[strum(serialize = "Blob")]
    Blob,
    #[serde(rename = "Unknown")]
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl VideoFormat {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Streaming protocols describe a manifest or a segment, not a whole file.
    pub fn is_streaming(&self) -> bool {
        matches!(self, VideoFormat::Hls | VideoFormat::Dash | VideoFormat::Ts)
    }

    /// File extension used when saving a resource of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::WebM => "webm",
            VideoFormat::Ogg => "ogg",
            VideoFormat::Avi => "avi",
            VideoFormat::Mov => "mov",
            VideoFormat::Wmv => "wmv",
            VideoFormat::Flv => "flv",
            VideoFormat::Mkv => "mkv",
            VideoFormat::Hls => "m3u8",
            VideoFormat::Dash => "mpd",
            VideoFormat::Ts => "ts",
            // unknown containers are saved as mp4, the most common case
            VideoFormat::Blob | VideoFormat::Unknown => "mp4",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_as_str_matches_serde() {
        for format in [VideoFormat::Mp4, VideoFormat::WebM, VideoFormat::Hls, VideoFormat::Blob] {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{}\"", format.as_str()));
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(VideoFormat::from_str("hls").unwrap(), VideoFormat::Hls);
        assert_eq!(VideoFormat::from_str("WEBM").unwrap(), VideoFormat::WebM);
        assert!(VideoFormat::from_str("gif").is_err());
    }

    #[test]
    fn test_streaming_formats() {
        assert!(VideoFormat::Hls.is_streaming());
        assert!(VideoFormat::Ts.is_streaming());
        assert!(!VideoFormat::Mp4.is_streaming());
        assert_eq!(VideoFormat::Dash.extension(), "mpd");
    }
}
