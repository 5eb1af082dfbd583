//! OpenTok SDK
//!
//! A Rust client for the OpenTok session signaling API.
//!
//! This SDK provides:
//! - Signals to every participant of a session, or to a single connection
//! - Project token signing (HS256) with a pluggable token source
//! - Per-call cancellation and deadlines
//! - Typed errors for API rejections, undecodable responses and transport failures
//!
//! # Example
//!
//! ```no_run
//! use opentok_sdk::{CallContext, OpenTokClient, OpenTokConfig, OpenTokError, SignalPayload};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OpenTokConfig::new("12345678", "ba7816bf8f01cfea414140de5dae2223b00361a3");
//! let client = OpenTokClient::new(config)?;
//!
//! let ctx = CallContext::new().with_timeout(Duration::from_secs(10));
//! let payload = SignalPayload::new("chat", "hello");
//!
//! // Everyone in the session
//! client.send_to_session(&ctx, "1_MX4xMjM0NTY3OH4", &payload).await?;
//!
//! // One connection
//! match client
//!     .send_to_connection(&ctx, "1_MX4xMjM0NTY3OH4", "c4d1-2e5f", &payload)
//!     .await
//! {
//!     Ok(()) => {}
//!     Err(OpenTokError::Signal(err)) => eprintln!("rejected: {}", err.message),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod opentok_api;

// Re-export commonly used types and functions
pub use opentok_api::{
    client::{OpenTokClient, AUTH_HEADER, SDK_NAME, SDK_VERSION},
    config::{OpenTokConfig, DEFAULT_API_HOST, DEFAULT_TOKEN_TTL},
    context::CallContext,
    jwt::{decode_project_token, ProjectClaims, ProjectTokenSigner, TokenProvider},
    signal::{SignalPayload, SignalTarget, MAX_ERROR_BODY_BYTES},
    types::{OpenTokError, SignalError},
};
