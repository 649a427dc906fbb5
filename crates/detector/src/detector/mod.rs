pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod harvester;
pub mod manifest;
pub mod messaging;
pub mod observer;
pub mod orchestrator;
pub mod platforms;
pub mod scan;
pub mod title;
pub mod utils;

pub use context::PageContext;
pub use messaging::{DetectorRequest, DetectorResponse};
pub use observer::{NetworkObserver, ObserveLayer, ObservedUrls, RequestKind, RequestObserver};
pub use orchestrator::{DetectionOrchestrator, ScanOutcome, ScanState};
