use crate::api::models::{LeadsPage, ProgressReport, ScrapeReply, StatusReport, StreetViewImage};
use crate::api::{FetchError, Fetcher, HeaderSigner};
use crate::config::ApiConfig;
use crate::domain::query::LeadsRequest;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Response header carrying the street view capture date (`YYYY-MM`).
pub const CAPTURE_DATE_HEADER: &str = "x-capture-date";

/// The Backend API as the orchestrator sees it: one method per endpoint.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn status(&self, key: &str) -> Result<StatusReport, FetchError>;

    async fn scrape(&self, key: &str) -> Result<ScrapeReply, FetchError>;

    async fn progress(&self, key: &str) -> Result<ProgressReport, FetchError>;

    async fn leads(&self, request: &LeadsRequest) -> Result<LeadsPage, FetchError>;

    async fn street_view(&self, address: &str) -> Result<StreetViewImage, FetchError>;
}

#[async_trait]
impl<T: BackendApi + ?Sized> BackendApi for Arc<T> {
    async fn status(&self, key: &str) -> Result<StatusReport, FetchError> {
        (**self).status(key).await
    }

    async fn scrape(&self, key: &str) -> Result<ScrapeReply, FetchError> {
        (**self).scrape(key).await
    }

    async fn progress(&self, key: &str) -> Result<ProgressReport, FetchError> {
        (**self).progress(key).await
    }

    async fn leads(&self, request: &LeadsRequest) -> Result<LeadsPage, FetchError> {
        (**self).leads(request).await
    }

    async fn street_view(&self, address: &str) -> Result<StreetViewImage, FetchError> {
        (**self).street_view(address).await
    }
}

/// `BackendApi` over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    fetcher: Fetcher,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let signer = HeaderSigner::from_config(config);
        if signer.is_empty() {
            debug!(api_url = %config.api_url, "no API credentials configured, sending unsigned requests");
        }
        let signer = Arc::new(signer);
        Ok(Self {
            fetcher: Fetcher::new(&config.api_url, signer)?,
        })
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn status(&self, key: &str) -> Result<StatusReport, FetchError> {
        let url = self.fetcher.endpoint(&["api", "status", key])?;
        self.fetcher.get_json(url).await
    }

    async fn scrape(&self, key: &str) -> Result<ScrapeReply, FetchError> {
        let url = self.fetcher.endpoint(&["api", "scrape", key])?;
        let body: Value = self
            .fetcher
            .post_json(url, &serde_json::json!({}))
            .await?;
        Ok(ScrapeReply::classify(body))
    }

    async fn progress(&self, key: &str) -> Result<ProgressReport, FetchError> {
        let url = self.fetcher.endpoint(&["api", "progress", key])?;
        self.fetcher.get_json(url).await
    }

    async fn leads(&self, request: &LeadsRequest) -> Result<LeadsPage, FetchError> {
        let url = self.fetcher.endpoint(&["api", "leads"])?;
        self.fetcher.post_json(url, request).await
    }

    async fn street_view(&self, address: &str) -> Result<StreetViewImage, FetchError> {
        let mut url = self.fetcher.endpoint(&["api", "street-view", "image"])?;
        url.query_pairs_mut().append_pair("address", address);

        let fetched = self.fetcher.get_bytes(url).await?;
        let header = |name: &str| {
            fetched
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(StreetViewImage {
            content_type: header(CONTENT_TYPE.as_str()),
            capture_date: header(CAPTURE_DATE_HEADER),
            bytes: fetched.bytes,
        })
    }
}
