//! Search & acquisition client for the property lead backend.
//!
//! Look up leads by zip code (following a backend scrape when the data is not
//! there yet), page through filtered lead lists, inspect one record with its
//! street view image, and export results to a spreadsheet.

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod images;
pub mod search;
pub mod spreadsheets;

pub use config::{ApiConfig, ClientSettings, PollerConfig};
pub use errors::{SearchError, SearchResult};
pub use search::{Presenter, SearchOrchestrator, ViewModel};

#[cfg(test)]
mod tests;
