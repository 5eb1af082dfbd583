use crate::opentok_api::types::{OpenTokError, SignalError};
use serde::{Deserialize, Serialize};

/// Upper bound on how much of an error response body is read
pub const MAX_ERROR_BODY_BYTES: usize = 256;

/// Type and data of a signal
///
/// Serialized verbatim as `{"type": ..., "data": ...}`. Empty strings are
/// accepted here; the API may still reject them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPayload {
    /// Clients can filter on this value when listening for signals
    #[serde(rename = "type")]
    pub signal_type: String,
    pub data: String,
}

impl SignalPayload {
    pub fn new(signal_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            signal_type: signal_type.into(),
            data: data.into(),
        }
    }
}

/// Recipients of a signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalTarget {
    /// Every participant connected to the session
    Broadcast { session_id: String },
    /// A single connection within the session
    Unicast {
        session_id: String,
        connection_id: String,
    },
}

impl SignalTarget {
    pub fn session(session_id: impl Into<String>) -> Self {
        SignalTarget::Broadcast {
            session_id: session_id.into(),
        }
    }

    pub fn connection(session_id: impl Into<String>, connection_id: impl Into<String>) -> Self {
        SignalTarget::Unicast {
            session_id: session_id.into(),
            connection_id: connection_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            SignalTarget::Broadcast { session_id } | SignalTarget::Unicast { session_id, .. } => {
                session_id
            }
        }
    }

    pub fn connection_id(&self) -> Option<&str> {
        match self {
            SignalTarget::Broadcast { .. } => None,
            SignalTarget::Unicast { connection_id, .. } => Some(connection_id),
        }
    }

    /// Reject targets with missing identifiers
    pub fn validate(&self) -> Result<(), OpenTokError> {
        if self.session_id().is_empty() {
            return Err(OpenTokError::InvalidArgument(
                "Signal cannot be sent without a session ID".to_string(),
            ));
        }
        if self.connection_id() == Some("") {
            return Err(OpenTokError::InvalidArgument(
                "Signal cannot be sent without a connection ID".to_string(),
            ));
        }
        Ok(())
    }

    /// Path segments below `/v2/project/{api_key}`
    pub(crate) fn path_segments(&self) -> Vec<&str> {
        match self {
            SignalTarget::Broadcast { session_id } => vec!["session", session_id, "signal"],
            SignalTarget::Unicast {
                session_id,
                connection_id,
            } => vec![
                "session",
                session_id,
                "connection",
                connection_id,
                "signal",
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Read at most `limit` bytes of the response body
pub(crate) async fn read_capped_body(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, OpenTokError> {
    let mut body = Vec::with_capacity(limit);
    while body.len() < limit {
        match response.chunk().await? {
            Some(chunk) => {
                let take = chunk.len().min(limit - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }
    Ok(body)
}

/// Turn a (capped) error body into the matching error
///
/// Only the first JSON value is decoded; anything after it is ignored.
pub(crate) fn decode_error_body(status: u16, body: &[u8]) -> OpenTokError {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<ErrorBody>();
    match values.next() {
        Some(Ok(parsed)) => SignalError::new(status, parsed.message).into(),
        Some(Err(source)) => OpenTokError::Decode { status, source },
        None => OpenTokError::Decode {
            status,
            source: serde_json::from_slice::<ErrorBody>(body)
                .err()
                .unwrap_or_else(|| serde::de::Error::custom("empty response body")),
        },
    }
}
