use crate::domain::LeadRecord;

/// Which screen is up. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Search form (zip mode) or filter form (listing mode).
    #[default]
    Home,
    Results,
    Details,
}

/// Which entry point produced the current rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    ZipLookup,
    Listing,
}

/// Where the acquisition state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    CheckingStatus,
    FetchingCached,
    Scraping,
    QueryingPaginated,
    Results,
    Error,
}

/// Transient state of one search session. Cleared whenever the operator goes
/// back home.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub view: ViewState,
    pub mode: Mode,
    pub phase: SearchPhase,
    pub query: String,
    pub results: Vec<LeadRecord>,
    pub total: Option<u64>,
    pub selected: Option<LeadRecord>,
    pub progress: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
    pub image_loading: bool,
    pub image_error: Option<String>,
}
