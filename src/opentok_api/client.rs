use crate::opentok_api::config::OpenTokConfig;
use crate::opentok_api::context::CallContext;
use crate::opentok_api::jwt::{ProjectTokenSigner, TokenProvider};
use crate::opentok_api::signal::{
    decode_error_body, read_capped_body, SignalPayload, SignalTarget, MAX_ERROR_BODY_BYTES,
};
use crate::opentok_api::types::OpenTokError;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Name reported in the `User-Agent` header
pub const SDK_NAME: &str = "OpenTok-Rust-SDK";

/// Version reported in the `User-Agent` header
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the project token
pub const AUTH_HEADER: &str = "X-OPENTOK-AUTH";

const PROJECT_PATH: [&str; 2] = ["v2", "project"];

/// HTTP client for the OpenTok REST API
///
/// Holds only immutable configuration, the token source and a shared
/// `reqwest::Client`, so it is cheap to clone and safe to use from many tasks.
#[derive(Clone)]
pub struct OpenTokClient {
    config: OpenTokConfig,
    /// Parsed `api_host`
    base_url: Url,
    /// HTTP client for making requests
    client: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for OpenTokClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTokClient")
            .field("config", &self.config)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenTokClient {
    /// Create a client with its own HTTP transport
    ///
    /// # Example
    ///
    /// ```no_run
    /// use opentok_sdk::{OpenTokClient, OpenTokConfig};
    ///
    /// # fn example() -> Result<(), opentok_sdk::OpenTokError> {
    /// let config = OpenTokConfig::new("12345678", "ba7816bf8f01cfea414140de5dae2223b00361a3");
    /// let client = OpenTokClient::new(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: OpenTokConfig) -> Result<Self, OpenTokError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            OpenTokError::Config(format!("Failed to create HTTP client: {}", e))
        })?;

        Self::with_http_client(config, client)
    }

    /// Create a client that sends requests through `http_client`
    ///
    /// The caller owns the transport settings; `request_timeout` from the
    /// configuration is not applied.
    pub fn with_http_client(
        config: OpenTokConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, OpenTokError> {
        config.validate()?;
        let base_url = parse_api_host(&config.api_host)?;

        tracing::debug!(
            "Creating OpenTokClient: api_key={}, api_host={}",
            config.api_key,
            base_url
        );

        let tokens = Arc::new(ProjectTokenSigner::new(
            config.api_key.clone(),
            &config.api_secret,
            config.token_ttl,
        ));

        Ok(Self {
            config,
            base_url,
            client: http_client,
            tokens,
        })
    }

    /// Replace the default project token signer
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.tokens = provider;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    pub fn api_host(&self) -> &str {
        &self.config.api_host
    }

    pub fn config(&self) -> &OpenTokConfig {
        &self.config
    }

    /// Send a signal to every participant of an active session
    ///
    /// # Example
    ///
    /// ```no_run
    /// use opentok_sdk::{CallContext, OpenTokClient, OpenTokConfig, SignalPayload};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = OpenTokClient::new(OpenTokConfig::from_env()?)?;
    /// let payload = SignalPayload::new("chat", "hello");
    /// client
    ///     .send_to_session(&CallContext::new(), "1_MX4xMjM0NTY3OH4", &payload)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_to_session(
        &self,
        ctx: &CallContext,
        session_id: &str,
        payload: &SignalPayload,
    ) -> Result<(), OpenTokError> {
        self.send_signal(ctx, &SignalTarget::session(session_id), payload)
            .await
    }

    /// Send a signal to a single connection of an active session
    pub async fn send_to_connection(
        &self,
        ctx: &CallContext,
        session_id: &str,
        connection_id: &str,
        payload: &SignalPayload,
    ) -> Result<(), OpenTokError> {
        self.send_signal(
            ctx,
            &SignalTarget::connection(session_id, connection_id),
            payload,
        )
        .await
    }

    /// Send a signal to `target`
    ///
    /// Exactly one request is made. HTTP 204 is success; any other status
    /// yields [`OpenTokError::Signal`] or, when the first
    /// [`MAX_ERROR_BODY_BYTES`] of the body are not a JSON error object,
    /// [`OpenTokError::Decode`].
    pub async fn send_signal(
        &self,
        ctx: &CallContext,
        target: &SignalTarget,
        payload: &SignalPayload,
    ) -> Result<(), OpenTokError> {
        target.validate()?;
        ctx.check()?;

        let body = serde_json::to_vec(payload).map_err(OpenTokError::Encode)?;
        let token = self.tokens.project_token().map_err(|e| {
            tracing::error!("Failed to create project token: {}", e);
            match e {
                OpenTokError::Auth(_) => e,
                other => OpenTokError::Auth(other.to_string()),
            }
        })?;
        let url = self.signal_url(target)?;

        tracing::debug!(
            "Sending signal: url={}, type={}, data_len={}",
            url,
            payload.signal_type,
            payload.data.len()
        );

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTH_HEADER, token)
            .header(USER_AGENT, format!("{}/{}", SDK_NAME, SDK_VERSION))
            .body(body);

        ctx.run(async move {
            let response = request.send().await.map_err(|e| {
                tracing::error!("Failed to send signal request: {}", e);
                OpenTokError::from(e)
            })?;

            let status = response.status();
            tracing::debug!("Received response with status: {}", status);

            if status == StatusCode::NO_CONTENT {
                tracing::info!(
                    "Signal delivered: session_id={}, connection_id={:?}",
                    target.session_id(),
                    target.connection_id()
                );
                return Ok(());
            }

            let error_body = read_capped_body(response, MAX_ERROR_BODY_BYTES).await?;
            let err = decode_error_body(status.as_u16(), &error_body);
            tracing::error!("Signal failed: HTTP {} - {}", status.as_u16(), err);
            Err(err)
        })
        .await
    }

    /// `{api_host}/v2/project/{api_key}/session/{session_id}[/connection/{connection_id}]/signal`
    fn signal_url(&self, target: &SignalTarget) -> Result<Url, OpenTokError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                OpenTokError::Config(format!("API host cannot be a base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(PROJECT_PATH)
            .push(&self.config.api_key)
            .extend(target.path_segments());
        Ok(url)
    }
}

fn parse_api_host(api_host: &str) -> Result<Url, OpenTokError> {
    let url = Url::parse(api_host.trim_end_matches('/'))
        .map_err(|e| OpenTokError::Config(format!("Invalid API host '{}': {}", api_host, e)))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(OpenTokError::Config(format!(
            "API host must be an absolute http(s) URL: {}",
            api_host
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_host: &str) -> OpenTokClient {
        OpenTokClient::new(OpenTokConfig::new("12345678", "secret").with_api_host(api_host))
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client("https://api.opentok.com");
        assert_eq!(client.api_key(), "12345678");
        assert_eq!(client.api_host(), "https://api.opentok.com");
    }

    #[test]
    fn test_client_rejects_invalid_host() {
        let result = OpenTokClient::new(
            OpenTokConfig::new("12345678", "secret").with_api_host("not a url"),
        );
        assert!(matches!(result, Err(OpenTokError::Config(_))));

        let result = OpenTokClient::new(
            OpenTokConfig::new("12345678", "secret").with_api_host("mailto:ops@example.com"),
        );
        assert!(matches!(result, Err(OpenTokError::Config(_))));
    }

    #[test]
    fn test_client_rejects_empty_credentials() {
        let result = OpenTokClient::new(OpenTokConfig::new("", "secret"));
        assert!(matches!(result, Err(OpenTokError::Config(_))));
    }

    #[test]
    fn test_session_signal_url() {
        let client = client("https://api.opentok.com");
        let url = client.signal_url(&SignalTarget::session("sess-1")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.opentok.com/v2/project/12345678/session/sess-1/signal"
        );
    }

    #[test]
    fn test_connection_signal_url() {
        let client = client("https://api.opentok.com/");
        let url = client
            .signal_url(&SignalTarget::connection("sess-1", "conn-9"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.opentok.com/v2/project/12345678/session/sess-1/connection/conn-9/signal"
        );
    }

    #[test]
    fn test_signal_url_escapes_identifiers() {
        let client = client("https://api.opentok.com");
        let url = client
            .signal_url(&SignalTarget::session("a/b c"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.opentok.com/v2/project/12345678/session/a%2Fb%20c/signal"
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = client("https://api.opentok.com");
        assert!(!format!("{:?}", client).contains("\"secret\""));
    }

    #[test]
    fn test_user_agent() {
        assert_eq!(
            format!("{}/{}", SDK_NAME, SDK_VERSION),
            concat!("OpenTok-Rust-SDK/", env!("CARGO_PKG_VERSION"))
        );
    }
}
