use crate::api::models::JobState;
use crate::api::{BackendApi, FetchError};
use crate::config::PollerConfig;
use crate::domain::LeadRecord;
use crate::errors::{SearchError, SearchResult};
use crate::search::cancellable;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A backend scrape being followed, keyed by zip code.
///
/// Lives only inside [`ProgressPoller::run`]; gone once the job finishes,
/// fails, times out or is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub key: String,
    pub attempts_made: u32,
    pub last_message: String,
    pub state: JobState,
}

impl Job {
    fn new(key: &str, initial_message: String) -> Self {
        Self {
            key: key.to_string(),
            attempts_made: 0,
            last_message: initial_message,
            state: JobState::InProgress,
        }
    }
}

/// Follows one scrape job on a fixed interval until it settles.
///
/// A poll is only scheduled after the previous one returned, so there is
/// never more than one request in flight per job.
#[derive(Debug, Clone, Default)]
pub struct ProgressPoller {
    config: PollerConfig,
}

impl ProgressPoller {
    pub fn new(config: PollerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Polls `key` until completion and returns the delivered rows.
    ///
    /// `on_progress` sees the job once up front (with `initial_message`) and
    /// again after every poll that comes back `in_progress`.
    pub async fn run<B, F>(
        &self,
        api: &B,
        key: &str,
        initial_message: String,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> SearchResult<Vec<LeadRecord>>
    where
        B: BackendApi + ?Sized,
        F: FnMut(&Job),
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut job = Job::new(key, initial_message);
        on_progress(&job);

        info!(zip = %job.key, interval = ?self.config.interval, "⏳ following scrape job");

        loop {
            cancellable(cancel, tokio::time::sleep(self.config.interval))
                .await
                .inspect_err(|_| info!(zip = %job.key, attempts = job.attempts_made, "poll cancelled"))?;

            job.attempts_made += 1;
            let polled = cancellable(cancel, api.progress(&job.key))
                .await
                .inspect_err(|_| info!(zip = %job.key, attempts = job.attempts_made, "poll cancelled"))?;

            let report = match polled {
                Ok(report) => report,
                Err(e @ FetchError::Malformed(_)) => {
                    warn!(zip = %job.key, attempt = job.attempts_made, error = %e, "unreadable progress reply");
                    return Err(SearchError::from(e));
                }
                Err(e) => {
                    warn!(zip = %job.key, attempt = job.attempts_made, error = %e, "progress check failed");
                    return Err(SearchError::ProgressCheck(e.to_string()));
                }
            };

            job.state = report.status;
            let message = report.message.trim();
            if !message.is_empty() {
                job.last_message = message.to_string();
            }

            match job.state {
                JobState::Completed => {
                    let leads = match report.result {
                        Some(payload) => payload.leads,
                        None => {
                            warn!(zip = %job.key, "job completed without a result payload");
                            Vec::new()
                        }
                    };
                    info!(zip = %job.key, attempts = job.attempts_made, leads = leads.len(), "✅ scrape complete");
                    return Ok(leads);
                }
                JobState::Error => {
                    let reason = if message.is_empty() {
                        "Unknown error".to_string()
                    } else {
                        job.last_message
                    };
                    warn!(zip = %job.key, reason = %reason, "❌ scrape job failed");
                    return Err(SearchError::Job(reason));
                }
                JobState::InProgress => {
                    debug!(zip = %job.key, attempt = job.attempts_made, message = %job.last_message, "still scraping");
                    on_progress(&job);

                    if job.attempts_made >= max_attempts {
                        warn!(zip = %job.key, attempts = job.attempts_made, "giving up on scrape job");
                        return Err(SearchError::Timeout {
                            attempts: job.attempts_made,
                        });
                    }
                }
            }
        }
    }
}
