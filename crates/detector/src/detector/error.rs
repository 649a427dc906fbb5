use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),
    #[error("scan aborted: {0}")]
    ScanAborted(String),
}
