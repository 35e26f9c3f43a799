use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{0}'")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx reply. `message` is the `ApiError` message when the body is
    /// one, otherwise the raw body text.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}
