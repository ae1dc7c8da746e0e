use thiserror::Error;

/// Outcome classification for a single exchange with the Backend API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Server answered, but not with a 2xx.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No response was ever produced (connect refused, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built or sent at all.
    #[error("client error: {0}")]
    Client(String),

    /// 2xx response whose body was not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() {
            FetchError::Client(err.to_string())
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
