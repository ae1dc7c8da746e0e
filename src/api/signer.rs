use crate::config::ApiConfig;
use reqwest::RequestBuilder;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const API_SECRET_HEADER: &str = "X-API-Secret";

/// Attaches deployment credentials to an outgoing request.
///
/// The fetcher calls this on every request and never looks at credentials
/// itself.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: RequestBuilder) -> RequestBuilder;
}

/// For deployments that need no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsigned;

impl RequestSigner for Unsigned {
    fn sign(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }
}

/// Key / secret / bearer-token headers, each only when configured.
#[derive(Debug, Clone, Default)]
pub struct HeaderSigner {
    api_key: Option<String>,
    api_secret: Option<String>,
    auth_token: Option<String>,
}

impl HeaderSigner {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.api_secret.is_none() && self.auth_token.is_none()
    }
}

impl RequestSigner for HeaderSigner {
    fn sign(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(secret) = &self.api_secret {
            request = request.header(API_SECRET_HEADER, secret);
        }
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }
}
