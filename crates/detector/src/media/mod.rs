pub mod candidate;
pub mod platform;
pub mod video_format;

pub use candidate::{OriginKind, UNKNOWN_SIZE, VideoCandidate, VideoCandidateBuilder};
pub use platform::Platform;
pub use video_format::VideoFormat;
