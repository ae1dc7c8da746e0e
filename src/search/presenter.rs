use crate::domain::{LeadRecord, ListingControls};
use crate::images::ImageHandle;
use crate::search::{Mode, SearchPhase, SearchState, ViewState};

/// Everything a renderer needs, as plain borrowed data.
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    pub view: ViewState,
    pub mode: Mode,
    pub phase: SearchPhase,
    pub query: &'a str,
    pub results: &'a [LeadRecord],
    pub total: Option<u64>,
    pub page: u32,
    pub page_count: Option<u64>,
    pub selected: Option<&'a LeadRecord>,
    pub image: Option<&'a ImageHandle>,
    pub image_loading: bool,
    pub image_error: Option<&'a str>,
    pub progress: Option<&'a str>,
    pub error: Option<&'a str>,
    pub loading: bool,
}

impl<'a> ViewModel<'a> {
    pub fn new(
        state: &'a SearchState,
        image: Option<&'a ImageHandle>,
        controls: &ListingControls,
    ) -> Self {
        let listing = state.mode == Mode::Listing;
        Self {
            view: state.view,
            mode: state.mode,
            phase: state.phase,
            query: &state.query,
            results: &state.results,
            total: state.total,
            page: if listing { controls.page() } else { 1 },
            page_count: state
                .total
                .filter(|_| listing)
                .map(|t| controls.page_count(t)),
            selected: state.selected.as_ref(),
            image,
            image_loading: state.image_loading,
            image_error: state.image_error.as_deref(),
            progress: state.progress.as_deref(),
            error: state.error.as_deref(),
            loading: state.loading,
        }
    }
}

/// Renders orchestrator output. Called after every state change.
pub trait Presenter {
    fn present(&mut self, view: &ViewModel<'_>);
}
