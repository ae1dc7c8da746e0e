use crate::domain::lead::LeadRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// GET  /api/status/{key}        -> StatusReport
// POST /api/scrape/{key}        -> {leads: [...]} | {status: "started"}
// GET  /api/progress/{key}      -> ProgressReport
// POST /api/leads               -> LeadsPage
// GET  /api/street-view/image   -> bytes (+ capture date header)

/// Answer of the status probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub is_scraping: bool,
    pub scraping_progress: Option<String>,
    pub csv_available: Option<bool>,
}

/// The two legal shapes of a scrape reply, plus everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeReply {
    /// Rows served straight from the backend's cache.
    Leads(Vec<LeadRecord>),
    /// A job was started; follow it with the progress endpoint.
    Started,
    Unrecognized(String),
}

impl ScrapeReply {
    pub fn classify(body: Value) -> Self {
        if let Some(leads) = body.get("leads") {
            return match serde_json::from_value::<Vec<LeadRecord>>(leads.clone()) {
                Ok(rows) => ScrapeReply::Leads(rows),
                Err(e) => ScrapeReply::Unrecognized(format!("leads are not records: {e}")),
            };
        }

        match body.get("status").and_then(Value::as_str) {
            Some("started") => ScrapeReply::Started,
            Some(other) => ScrapeReply::Unrecognized(format!("scrape status '{other}'")),
            None => ScrapeReply::Unrecognized(truncate(&body.to_string(), 120)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    InProgress,
    Completed,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadsPayload {
    #[serde(default)]
    pub leads: Vec<LeadRecord>,
}

/// One poll answer for a running scrape job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub status: JobState,
    #[serde(default)]
    pub message: String,
    pub result: Option<LeadsPayload>,
}

/// One page of the paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadsPage {
    #[serde(default)]
    pub leads: Vec<LeadRecord>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetViewImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// Raw `YYYY-MM` value as the backend sent it.
    pub capture_date: Option<String>,
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
