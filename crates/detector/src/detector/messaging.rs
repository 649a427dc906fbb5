//! Request/response contract between the detector and its collaborators.
//!
//! Every request receives exactly one response. Failures, including
//! malformed requests, are reported as `{"videos": [], "error": "..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::detector::context::PageContext;
use crate::detector::error::DetectorError;
use crate::detector::orchestrator::ScanOutcome;
use crate::media::VideoCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DetectorRequest {
    FindVideos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorResponse {
    pub videos: Vec<VideoCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectorResponse {
    pub fn success(videos: Vec<VideoCandidate>) -> Self {
        Self {
            videos,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            videos: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<ScanOutcome> for DetectorResponse {
    fn from(outcome: ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Succeeded(videos) => Self::success(videos),
            ScanOutcome::Failed { error } => Self::failure(error),
        }
    }
}

/// Parses a raw message into a request.
pub fn parse_request(raw: &str) -> Result<DetectorRequest, DetectorError> {
    let value: Value = serde_json::from_str(raw)?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| DetectorError::UnsupportedAction("missing action".to_string()))?;
    match action {
        "findVideos" => Ok(DetectorRequest::FindVideos),
        other => Err(DetectorError::UnsupportedAction(other.to_string())),
    }
}

impl PageContext {
    pub fn handle_message(&self, request: DetectorRequest) -> DetectorResponse {
        match request {
            DetectorRequest::FindVideos => self.find_videos().into(),
        }
    }

    /// Answers one raw JSON message with one serialized response.
    pub fn handle_raw_message(&self, raw: &str) -> String {
        let response = match parse_request(raw) {
            Ok(request) => self.handle_message(request),
            Err(e) => {
                debug!(error = %e, "rejected message");
                DetectorResponse::failure(e.to_string())
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(
                r#"{{"videos":[],"error":{}}}"#,
                Value::String(e.to_string())
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::config::DetectorConfig;
    use rstest::rstest;
    use serde_json::json;

    fn page() -> PageContext {
        PageContext::load(
            "https://example.com/",
            r#"<video src="https://cdn.example.com/clip.mp4"></video>"#,
            DetectorConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_find_videos_response_shape() {
        let raw = page().handle_raw_message(r#"{"action":"findVideos"}"#);
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("error").is_none());
        let video = &value["videos"][0];
        assert_eq!(video["url"], json!("https://cdn.example.com/clip.mp4"));
        assert_eq!(video["type"], json!("direct"));
        assert_eq!(video["format"], json!("MP4"));
        assert_eq!(video["platform"], json!("generic"));
        assert_eq!(video["size"], json!("Unknown"));
        assert_eq!(video["downloadable"], json!(true));
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"action":"deleteEverything"}"#)]
    #[case(r#"{"noAction":true}"#)]
    #[case(r#"["findVideos"]"#)]
    fn test_bad_messages_get_one_error(#[case] raw: &str) {
        let response: DetectorResponse =
            serde_json::from_str(&page().handle_raw_message(raw)).unwrap();
        assert!(response.is_error());
        assert!(response.videos.is_empty());
    }

    #[test]
    fn test_request_serialization() {
        assert_eq!(
            serde_json::to_value(DetectorRequest::FindVideos).unwrap(),
            json!({"action": "findVideos"})
        );
        assert_eq!(parse_request(r#"{"action":"findVideos","extra":1}"#).unwrap(), DetectorRequest::FindVideos);
    }
}
