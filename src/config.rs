// config.rs
use crate::domain::fields::FieldSchema;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where the Backend API lives and which credentials to attach.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub auth_token: Option<String>,
}

impl ApiConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Reads `LEADS_API_URL` plus the optional credential variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_url(None)
    }

    /// Like [`from_env`](Self::from_env), but an explicit `api_url` wins over
    /// `LEADS_API_URL`.
    pub fn from_env_with_url(api_url: Option<String>) -> Result<Self, ConfigError> {
        let api_url = match api_url {
            Some(url) => url,
            None => non_empty_var("LEADS_API_URL").ok_or(ConfigError::Missing("LEADS_API_URL"))?,
        };

        Ok(Self {
            api_url,
            api_key: non_empty_var("LEADS_API_KEY"),
            api_secret: non_empty_var("LEADS_API_SECRET"),
            auth_token: non_empty_var("LEADS_AUTH_TOKEN"),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between two progress checks.
    pub interval: Duration,
    /// Hard ceiling on progress checks for one job.
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Everything a client session needs, assembled once at startup.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api: ApiConfig,
    pub poller: PollerConfig,
    /// Rows per listing page; constant for the life of a session.
    pub page_size: u32,
    pub schema: FieldSchema,
}

impl ClientSettings {
    pub fn new(api: ApiConfig) -> Self {
        Self {
            api,
            poller: PollerConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            schema: FieldSchema::display_names(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_url(None)
    }

    pub fn from_env_with_url(api_url: Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::new(ApiConfig::from_env_with_url(api_url)?);

        if let Some(raw) = non_empty_var("LEADS_PAGE_SIZE") {
            settings.page_size = parse_page_size(&raw)?;
        }

        if let Some(style) = non_empty_var("LEADS_FIELD_SCHEMA") {
            settings.schema = match style.as_str() {
                "display" => FieldSchema::display_names(),
                "snake" => FieldSchema::snake_case(),
                other => {
                    return Err(ConfigError::Invalid {
                        name: "LEADS_FIELD_SCHEMA",
                        reason: format!("expected 'display' or 'snake', got '{other}'"),
                    })
                }
            };
        }

        Ok(settings)
    }
}

pub fn parse_page_size(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::Invalid {
            name: "page size",
            reason: "must be at least 1".into(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            name: "page size",
            reason: e.to_string(),
        }),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
