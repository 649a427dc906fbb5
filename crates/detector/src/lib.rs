//! Detection and classification of playable video resources on web pages.
//!
//! The crate inspects an already-loaded document (see [`document::PageDocument`])
//! and the requests its page code issued (see [`detector::observer`]) and
//! produces a deduplicated list of [`media::VideoCandidate`]s.
//!
//! ```rust
//! use video_detector::detector::context::PageContext;
//! use video_detector::detector::config::DetectorConfig;
//!
//! let html = r#"<video src="https://cdn.example.com/clip.mp4"></video>"#;
//! let page = PageContext::load("https://example.com/watch", html, DetectorConfig::default())
//!     .expect("valid page url");
//! let videos = page.find_videos().into_videos();
//! assert_eq!(videos.len(), 1);
//! assert_eq!(videos[0].format.as_str(), "MP4");
//! ```

pub mod detector;
pub mod document;
pub mod media;

pub use detector::context::PageContext;
pub use detector::error::DetectorError;
pub use media::{OriginKind, Platform, VideoCandidate, VideoFormat};
