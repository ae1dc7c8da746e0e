// src/domain/status.rs

use crate::api::models::StatusReport;

/// What the status probe tells us about a zip code before searching.
/// Re-derived on every search, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionStatus {
    /// Rows already exist server-side.
    Cached,
    /// A scrape is already running; carries its progress text, if any.
    Scraping(Option<String>),
    Absent,
}

impl AcquisitionStatus {
    /// Cached data wins over a running job: there is something to show now.
    pub fn from_report(report: &StatusReport) -> Self {
        if report.cached {
            AcquisitionStatus::Cached
        } else if report.is_scraping {
            AcquisitionStatus::Scraping(
                report
                    .scraping_progress
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            )
        } else {
            AcquisitionStatus::Absent
        }
    }
}

impl From<&StatusReport> for AcquisitionStatus {
    fn from(report: &StatusReport) -> Self {
        Self::from_report(report)
    }
}
