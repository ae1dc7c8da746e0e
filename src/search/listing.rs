use crate::api::models::LeadsPage;
use crate::api::{BackendApi, FetchError};
use crate::domain::LeadsRequest;
use tracing::debug;

/// Hands out increasing sequence numbers and remembers the newest one.
///
/// A reply is only worth applying if its number is still the newest; anything
/// older was superseded while it was in flight.
#[derive(Debug, Clone, Default)]
pub struct ListingSequencer {
    latest: u64,
}

impl ListingSequencer {
    pub fn issue(&mut self, request: LeadsRequest) -> ListingTicket {
        self.latest += 1;
        ListingTicket {
            seq: self.latest,
            request,
        }
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }

    /// Makes every outstanding ticket stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

/// A listing query that has been issued but not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    pub seq: u64,
    pub request: LeadsRequest,
}

impl ListingTicket {
    /// Sends the query. Owns its backend handle, so several tickets can be in
    /// flight while the orchestrator keeps taking input.
    pub async fn send<B: BackendApi>(self, api: B) -> ListingReply {
        debug!(seq = self.seq, offset = self.request.offset, "sending listing query");
        let outcome = api.leads(&self.request).await;
        ListingReply {
            seq: self.seq,
            outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingReply {
    pub seq: u64,
    pub outcome: Result<LeadsPage, FetchError>,
}
