//! Detector configuration.
//!
//! Every field has a default matching the behavior of the browser detector,
//! so an empty configuration section is valid.

use serde::{Deserialize, Serialize};

/// Tunable thresholds and switches for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum URL length for non-streaming candidates (inclusive).
    pub min_url_len: usize,
    /// Streaming candidates must be strictly longer than this.
    pub min_streaming_url_len: usize,
    /// Titles are truncated to this many characters.
    pub title_max_len: usize,
    /// How many ancestor levels the title resolver walks.
    pub title_ancestor_depth: usize,
    /// Run the generic manifest battery over every inline script.
    pub scan_inline_scripts: bool,
    /// Report `blob:` media as non-downloadable candidates.
    pub detect_blobs: bool,
    /// Additional CSS selectors harvested on every page.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_video_selectors: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_url_len: 20,
            min_streaming_url_len: 10,
            title_max_len: 100,
            title_ancestor_depth: 3,
            scan_inline_scripts: true,
            detect_blobs: true,
            extra_video_selectors: Vec::new(),
        }
    }
}
