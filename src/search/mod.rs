mod listing;
mod orchestrator;
mod poller;
mod presenter;
mod state;

pub use listing::{ListingReply, ListingSequencer, ListingTicket};
pub use orchestrator::SearchOrchestrator;
pub use poller::{Job, ProgressPoller};
pub use presenter::{Presenter, ViewModel};
pub use state::{Mode, SearchPhase, SearchState, ViewState};

use crate::errors::{SearchError, SearchResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Runs `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> SearchResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SearchError::Cancelled),
        out = fut => Ok(out),
    }
}
