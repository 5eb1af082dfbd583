/// OpenTok REST API integration module
///
/// This module provides the signaling client for the OpenTok REST API,
/// together with project token signing and per-call cancellation.
///
/// ## Signal Flow
///
/// 1. Caller picks a target: a whole session or one connection in it
/// 2. Client validates the target identifiers locally
/// 3. Client signs a short-lived project token with the API secret
/// 4. Client POSTs the payload to the session's signal endpoint
/// 5. HTTP 204 means delivered; any other status is mapped to a typed error
pub mod client;
pub mod config;
pub mod context;
pub mod jwt;
pub mod signal;
pub mod types;

pub use client::OpenTokClient;
pub use config::OpenTokConfig;
pub use context::CallContext;
pub use jwt::{decode_project_token, ProjectClaims, ProjectTokenSigner, TokenProvider};
pub use signal::{SignalPayload, SignalTarget};
pub use types::{OpenTokError, SignalError};
