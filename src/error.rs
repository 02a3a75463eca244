use thiserror::Error;

/// Failures of a single backend call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// The backend answered with a non-success status.
    #[error("{detail}")]
    RequestFailed { status: u16, detail: String },
    /// The call itself could not complete.
    #[error("{0}")]
    Transport(String),
    /// The backend answered, but not with the JSON we expected.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
