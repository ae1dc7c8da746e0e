// errors.rs
use crate::api::FetchError;
use thiserror::Error;

/// Every way a search, listing query or image lookup can end badly.
///
/// The `Display` text is exactly what the presenter shows the operator, so
/// keep it human-readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The request never reached the server.
    #[error("Network error: Unable to reach the API")]
    Network,

    /// The server answered with a non-2xx status.
    #[error("API Error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Failure while building the request, before anything was sent.
    #[error("Request error: {0}")]
    Client(String),

    /// Poll attempt budget exhausted while the job was still running.
    #[error("Scraping is taking longer than expected ({attempts} progress checks). Please try again later.")]
    Timeout { attempts: u32 },

    /// The backend reported the scrape job as failed.
    #[error("Scrape failed: {0}")]
    Job(String),

    /// A poll request itself failed.
    #[error("Error checking scrape progress: {0}")]
    ProgressCheck(String),

    /// Street view image could not be loaded.
    #[error("Failed to load street view image: {0}")]
    Resource(String),

    #[error("Unexpected response from API: {0}")]
    UnexpectedResponse(String),

    /// The search was abandoned (navigation or explicit cancel).
    #[error("Search cancelled")]
    Cancelled,

    #[error("Spreadsheet error: {0}")]
    Export(String),
}

pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    /// Cancellation is a user decision, not something to put on screen.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, SearchError::Cancelled)
    }
}

impl From<FetchError> for SearchError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Http { status, message } => SearchError::Http { status, message },
            FetchError::Network(_) => SearchError::Network,
            FetchError::Client(msg) => SearchError::Client(msg),
            FetchError::Malformed(msg) => SearchError::UnexpectedResponse(msg),
        }
    }
}
