mod backend;
mod fetch_error;
mod fetcher;
pub mod models;
mod signer;

pub use backend::{BackendApi, HttpBackend};
pub use fetch_error::FetchError;
pub use fetcher::{FetchedBytes, Fetcher};
pub use signer::{HeaderSigner, RequestSigner, Unsigned};
