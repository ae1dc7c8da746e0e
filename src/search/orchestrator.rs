use crate::api::models::ScrapeReply;
use crate::api::BackendApi;
use crate::config::ClientSettings;
use crate::domain::{AcquisitionStatus, FieldSchema, FilterKey, LeadRecord, ListingControls, SortKey};
use crate::errors::{SearchError, SearchResult};
use crate::images::ImageManager;
use crate::search::{
    cancellable, ListingReply, ListingSequencer, ListingTicket, Mode, Presenter, ProgressPoller,
    SearchPhase, SearchState, ViewModel, ViewState,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const EMPTY_QUERY_MESSAGE: &str = "Please enter a zip code";
const DEFAULT_PROGRESS_MESSAGE: &str = "Scraping in progress...";

/// Drives one operator session: decides how to get rows for a query, follows
/// long-running scrapes, and walks the home -> results -> details screens.
///
/// Two entry points pick the acquisition mode:
/// - [`search`](Self::search) looks up a single zip/city term, probing the
///   backend cache first and following a scrape job when one is needed.
/// - [`begin_listing`](Self::begin_listing) / [`refresh_listing`](Self::refresh_listing)
///   run a filtered, sorted, paginated query. Replies are tagged so only the
///   most recently issued query may change what is shown.
///
/// Every state change is pushed to the [`Presenter`].
pub struct SearchOrchestrator<B, P> {
    api: Arc<B>,
    presenter: P,
    poller: ProgressPoller,
    schema: FieldSchema,
    images: ImageManager,
    controls: ListingControls,
    sequencer: ListingSequencer,
    state: SearchState,
    cancel: CancellationToken,
}

impl<B: BackendApi, P: Presenter> SearchOrchestrator<B, P> {
    pub fn new(api: B, presenter: P, settings: &ClientSettings) -> Self {
        Self::with_shared_api(Arc::new(api), presenter, settings)
    }

    pub fn with_shared_api(api: Arc<B>, presenter: P, settings: &ClientSettings) -> Self {
        Self {
            api,
            presenter,
            poller: ProgressPoller::new(settings.poller.clone()),
            schema: settings.schema.clone(),
            images: ImageManager::new(),
            controls: ListingControls::new(settings.page_size),
            sequencer: ListingSequencer::default(),
            state: SearchState::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Store street view images under `images` instead of the default.
    pub fn with_images(mut self, images: ImageManager) -> Self {
        self.images = images;
        self
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn images(&self) -> &ImageManager {
        &self.images
    }

    pub fn controls(&self) -> &ListingControls {
        &self.controls
    }

    /// Owned handle to the backend, for sending [`ListingTicket`]s.
    pub fn api_handle(&self) -> Arc<B> {
        Arc::clone(&self.api)
    }

    /// Token that abandons the running search when cancelled. Grab it before
    /// awaiting [`search`](Self::search); a token already cancelled when a
    /// search starts is replaced, so grab a fresh one per search.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ---------------------------------------------------------------------
    // Zip lookup mode
    // ---------------------------------------------------------------------

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.state.query = text.into();
    }

    /// Runs a zip lookup for the current query text.
    ///
    /// The backend status probe decides the path: cached rows are fetched
    /// right away, a running scrape is followed without starting another,
    /// and an unknown key starts a scrape.
    pub async fn search(&mut self) -> SearchResult<()> {
        let key = self.state.query.trim().to_string();
        if key.is_empty() {
            return self.fail(SearchError::Validation(EMPTY_QUERY_MESSAGE.into()));
        }

        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }

        self.state.mode = Mode::ZipLookup;
        self.state.loading = true;
        self.state.error = None;
        self.state.progress = None;
        self.enter(SearchPhase::CheckingStatus);

        let cancel = self.cancel.clone();
        match self.acquire(&key, &cancel).await {
            Ok(rows) => {
                info!(zip = %key, leads = rows.len(), "search finished");
                self.show_rows(rows, None);
                Ok(())
            }
            Err(SearchError::Cancelled) => {
                info!(zip = %key, "search abandoned");
                self.back_to_home();
                Err(SearchError::Cancelled)
            }
            Err(e) => self.fail(e),
        }
    }

    async fn acquire(
        &mut self,
        key: &str,
        cancel: &CancellationToken,
    ) -> SearchResult<Vec<LeadRecord>> {
        // The probe is opportunistic: if it fails we just scrape.
        let status = match cancellable(cancel, self.api.status(key)).await? {
            Ok(report) => AcquisitionStatus::from(&report),
            Err(e) => {
                warn!(zip = key, error = %e, "status probe failed, treating as absent");
                AcquisitionStatus::Absent
            }
        };
        debug!(zip = key, ?status, "status probe");

        match status {
            AcquisitionStatus::Cached => {
                self.enter(SearchPhase::FetchingCached);
                self.scrape(key, cancel).await
            }
            AcquisitionStatus::Scraping(progress) => {
                self.enter(SearchPhase::Scraping);
                let message = progress.unwrap_or_else(|| DEFAULT_PROGRESS_MESSAGE.to_string());
                self.follow_job(key, message, cancel).await
            }
            AcquisitionStatus::Absent => {
                self.enter(SearchPhase::Scraping);
                self.scrape(key, cancel).await
            }
        }
    }

    async fn scrape(
        &mut self,
        key: &str,
        cancel: &CancellationToken,
    ) -> SearchResult<Vec<LeadRecord>> {
        let reply = cancellable(cancel, self.api.scrape(key)).await??;

        match reply {
            // Also the path when the probe said "absent" but the backend had
            // the rows by the time the scrape request landed.
            ScrapeReply::Leads(rows) => Ok(rows),
            ScrapeReply::Started => {
                if self.state.phase == SearchPhase::FetchingCached {
                    warn!(zip = key, "probe said cached but backend started a job");
                }
                info!(zip = key, "🧵 scrape job started");
                self.enter(SearchPhase::Scraping);
                self.follow_job(key, format!("Scraping leads for {key}..."), cancel)
                    .await
            }
            ScrapeReply::Unrecognized(detail) => Err(SearchError::UnexpectedResponse(detail)),
        }
    }

    async fn follow_job(
        &mut self,
        key: &str,
        initial_message: String,
        cancel: &CancellationToken,
    ) -> SearchResult<Vec<LeadRecord>> {
        let state = &mut self.state;
        let presenter = &mut self.presenter;
        let images = &self.images;
        let controls = &self.controls;

        self.poller
            .run(&*self.api, key, initial_message, cancel, |job| {
                state.progress = Some(job.last_message.clone());
                presenter.present(&ViewModel::new(state, images.current(), controls));
            })
            .await
    }

    // ---------------------------------------------------------------------
    // Listing mode
    // ---------------------------------------------------------------------

    pub fn set_filter(&mut self, key: FilterKey, value: impl Into<String>) {
        self.controls.set_filter(key, value);
    }

    pub fn clear_filter(&mut self, key: FilterKey) {
        self.controls.clear_filter(key);
    }

    pub fn set_sort(&mut self, sort: Option<SortKey>) {
        self.controls.set_sort(sort);
    }

    pub fn set_sort_selector(&mut self, selector: &str) -> SearchResult<()> {
        self.controls.set_sort_selector(selector)
    }

    pub fn set_page(&mut self, page: u32) {
        self.controls.set_page(page);
    }

    /// Snapshots the current filters/sort/page into a tagged query. Issuing a
    /// new ticket makes every older one stale.
    pub fn begin_listing(&mut self) -> ListingTicket {
        let ticket = self.sequencer.issue(self.controls.request());
        debug!(seq = ticket.seq, page = self.controls.page(), "listing query issued");

        self.state.mode = Mode::Listing;
        self.state.loading = true;
        self.state.error = None;
        self.enter(SearchPhase::QueryingPaginated);
        ticket
    }

    /// Applies a listing reply if it answers the newest ticket.
    ///
    /// `Ok(false)` means the reply was stale and nothing changed.
    pub fn apply_listing(&mut self, reply: ListingReply) -> SearchResult<bool> {
        if !self.sequencer.is_current(reply.seq) {
            debug!(
                seq = reply.seq,
                latest = self.sequencer.latest(),
                "dropping stale listing reply"
            );
            return Ok(false);
        }

        match reply.outcome {
            Ok(page) => {
                debug!(seq = reply.seq, rows = page.leads.len(), total = page.total, "listing applied");
                self.show_rows(page.leads, Some(page.total));
                Ok(true)
            }
            Err(e) => self.fail(e.into()).map(|_| true),
        }
    }

    /// Issue, send and apply one listing query.
    pub async fn refresh_listing(&mut self) -> SearchResult<()> {
        let ticket = self.begin_listing();
        let reply = ticket.send(self.api_handle()).await;
        self.apply_listing(reply).map(|_| ())
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// Opens the details view for result row `index`.
    pub fn select(&mut self, index: usize) -> bool {
        if self.state.view != ViewState::Results {
            return false;
        }
        let Some(record) = self.state.results.get(index).cloned() else {
            return false;
        };

        self.images.release();
        self.state.image_error = None;
        self.state.selected = Some(record);
        self.state.view = ViewState::Details;
        self.present();
        true
    }

    /// Loads the street view image for the selected record.
    pub async fn load_street_view(&mut self) -> SearchResult<()> {
        let address = match &self.state.selected {
            Some(record) if self.state.view == ViewState::Details => {
                record.street_view_address(&self.schema)
            }
            _ => return Err(SearchError::Resource("no property selected".into())),
        };
        let Some(address) = address else {
            let err = SearchError::Resource("no address available for this property".into());
            self.state.image_error = Some(err.to_string());
            self.present();
            return Err(err);
        };

        self.state.image_loading = true;
        self.state.image_error = None;
        self.present();

        let result = self
            .images
            .acquire(&*self.api, &address)
            .await
            .map(|_| ());

        self.state.image_loading = false;
        if let Err(e) = &result {
            self.state.image_error = Some(e.to_string());
        }
        self.present();
        result
    }

    /// details -> results; frees the street view image.
    pub fn back_to_results(&mut self) {
        if self.state.view != ViewState::Details {
            return;
        }
        self.images.release();
        self.state.selected = None;
        self.state.image_loading = false;
        self.state.image_error = None;
        self.state.view = ViewState::Results;
        self.present();
    }

    /// Back to the empty home screen: cancels any job being followed, makes
    /// in-flight listing replies stale, frees the image and forgets the
    /// query, filters, rows and error.
    pub fn back_to_home(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.sequencer.invalidate();
        self.images.release();
        self.controls.reset();

        let mode = self.state.mode;
        self.state = SearchState {
            mode,
            ..SearchState::default()
        };
        self.present();
    }

    // ---------------------------------------------------------------------

    fn enter(&mut self, phase: SearchPhase) {
        self.state.phase = phase;
        self.present();
    }

    fn show_rows(&mut self, rows: Vec<LeadRecord>, total: Option<u64>) {
        // New rows always land on the results screen; no image survives that.
        if self.images.release() {
            debug!("street view image released on new results");
        }
        self.state.image_loading = false;
        self.state.image_error = None;
        self.state.total = Some(total.unwrap_or(rows.len() as u64));
        self.state.results = rows;
        self.state.selected = None;
        self.state.progress = None;
        self.state.error = None;
        self.state.loading = false;
        self.state.phase = SearchPhase::Results;
        self.state.view = ViewState::Results;
        self.present();
    }

    fn fail(&mut self, err: SearchError) -> SearchResult<()> {
        warn!(error = %err, phase = ?self.state.phase, "search failed");
        self.state.error = Some(err.to_string());
        self.state.loading = false;
        self.state.progress = None;
        self.state.phase = SearchPhase::Error;
        self.present();
        Err(err)
    }

    fn present(&mut self) {
        let view = ViewModel::new(&self.state, self.images.current(), &self.controls);
        self.presenter.present(&view);
    }
}
