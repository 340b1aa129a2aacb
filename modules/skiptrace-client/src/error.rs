use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkipTraceError>;

#[derive(Debug, Error)]
pub enum SkipTraceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SkipTraceError {
    fn from(err: reqwest::Error) -> Self {
        SkipTraceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SkipTraceError {
    fn from(err: serde_json::Error) -> Self {
        SkipTraceError::Parse(err.to_string())
    }
}
