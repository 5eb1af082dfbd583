use crate::opentok_api::types::OpenTokError;
use std::fmt;
use std::time::Duration;

/// Production REST endpoint
pub const DEFAULT_API_HOST: &str = "https://api.opentok.com";

/// Lifetime of the project tokens minted for each request
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Client configuration
///
/// Immutable once handed to [`OpenTokClient`](crate::OpenTokClient). Use the
/// builder methods to override defaults, or [`OpenTokConfig::from_env`] to
/// read everything from `OPENTOK_*` environment variables.
#[derive(Clone)]
pub struct OpenTokConfig {
    /// Project API key
    pub api_key: String,
    /// Project API secret, used to sign project tokens
    pub api_secret: String,
    /// Scheme and host of the REST API, e.g. `https://api.opentok.com`
    pub api_host: String,
    /// Lifetime of each project token
    pub token_ttl: Duration,
    /// Overall timeout applied by the client-built HTTP transport
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for OpenTokConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTokConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("token_ttl", &self.token_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl OpenTokConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_host: DEFAULT_API_HOST.to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            request_timeout: None,
        }
    }

    /// Set API host (builder pattern)
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// Set project token lifetime (builder pattern)
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set transport timeout (builder pattern)
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Load configuration from the environment
    ///
    /// `OPENTOK_API_KEY` and `OPENTOK_API_SECRET` are required.
    /// `OPENTOK_API_HOST`, `OPENTOK_TOKEN_TTL_SECS` and
    /// `OPENTOK_REQUEST_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self, OpenTokError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, OpenTokError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| OpenTokError::Config(format!("{} is not set", name)))
        };
        let seconds = |name: &str| -> Result<Option<Duration>, OpenTokError> {
            lookup(name)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map(Duration::from_secs)
                        .map_err(|e| OpenTokError::Config(format!("Invalid {}: {}", name, e)))
                })
                .transpose()
        };

        let mut config = Self::new(required("OPENTOK_API_KEY")?, required("OPENTOK_API_SECRET")?);

        if let Some(host) = lookup("OPENTOK_API_HOST").filter(|h| !h.is_empty()) {
            config.api_host = host;
        }
        if let Some(ttl) = seconds("OPENTOK_TOKEN_TTL_SECS")? {
            config.token_ttl = ttl;
        }
        config.request_timeout = seconds("OPENTOK_REQUEST_TIMEOUT_SECS")?;

        tracing::debug!(
            "Loaded OpenTok configuration from environment: api_key={}, api_host={}",
            config.api_key,
            config.api_host
        );

        Ok(config)
    }

    /// Check the fields the client cannot work without
    pub fn validate(&self) -> Result<(), OpenTokError> {
        if self.api_key.is_empty() {
            return Err(OpenTokError::Config("API key must not be empty".to_string()));
        }
        if self.api_secret.is_empty() {
            return Err(OpenTokError::Config(
                "API secret must not be empty".to_string(),
            ));
        }
        if self.token_ttl.is_zero() {
            return Err(OpenTokError::Config(
                "Token TTL must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
