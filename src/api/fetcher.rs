// fetcher.rs
use crate::api::{FetchError, RequestSigner};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Body and headers of a binary response.
#[derive(Debug)]
pub struct FetchedBytes {
    pub bytes: Vec<u8>,
    pub headers: HeaderMap,
}

/// Performs exactly one request/response exchange and classifies the result.
///
/// Retries are the caller's business.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    base: Url,
    signer: Arc<dyn RequestSigner>,
}

impl Fetcher {
    pub fn new(api_url: &str, signer: Arc<dyn RequestSigner>) -> Result<Self, FetchError> {
        let base = Url::parse(api_url)
            .map_err(|e| FetchError::Client(format!("invalid API url '{api_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::Client(format!(
                "API url '{api_url}' cannot be used as a base"
            )));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base,
            signer,
        })
    }

    /// Base URL with `segments` appended, each escaped on its own.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Client("API url cannot take a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let resp = self.exchange(self.request(Method::GET, url)).await?;
        read_json(resp).await
    }

    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .exchange(self.request(Method::POST, url).json(body))
            .await?;
        read_json(resp).await
    }

    pub async fn get_bytes(&self, url: Url) -> Result<FetchedBytes, FetchError> {
        let resp = self.exchange(self.request(Method::GET, url)).await?;
        let headers = resp.headers().clone();
        let bytes = resp
            .bytes()
            .await
            .map_err(FetchError::from_reqwest)?
            .to_vec();
        Ok(FetchedBytes { bytes, headers })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.signer.sign(builder)
    }

    async fn exchange(&self, builder: RequestBuilder) -> Result<Response, FetchError> {
        // Build separately so a bad request is a client error, not a network one.
        let request = builder.build().map_err(|e| FetchError::Client(e.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();

        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        debug!(%method, %url, status = status.as_u16(), "backend exchange");

        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        Err(FetchError::Http {
            status: status.as_u16(),
            message: error_message(&text),
        })
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, FetchError> {
    let text = resp.text().await.map_err(FetchError::from_reqwest)?;
    serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Pulls `message` out of an error body, falling back to "Unknown error".
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Unknown error".to_string())
}
