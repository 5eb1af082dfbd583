use thiserror::Error;

/// OpenTok API error type
///
/// Represents every failure a signaling call can report. Nothing is retried
/// or swallowed by the client; the first failure is returned to the caller.
#[derive(Debug, Error)]
pub enum OpenTokError {
    /// A required identifier was empty. Detected locally, no request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Creating the project token failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network or TLS failure before a complete response was obtained
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The error body of a non-204 response could not be decoded
    #[error("Error decoding response from OpenTok: statusCode: {status}; {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The API rejected the signal
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// The call context was cancelled
    #[error("Request canceled")]
    Canceled,

    /// The call context deadline (or transport timeout) elapsed
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// Client configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Payload could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl OpenTokError {
    /// HTTP status reported by the API, when a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OpenTokError::Signal(err) => Some(err.status_code),
            OpenTokError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OpenTokError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OpenTokError::DeadlineExceeded
        } else {
            OpenTokError::Transport(err)
        }
    }
}

impl From<jsonwebtoken::errors::Error> for OpenTokError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        OpenTokError::Auth(err.to_string())
    }
}

/// Error reported by the OpenTok API for a rejected signal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("OpenTok error: code: {status_code}; message: {message}")]
pub struct SignalError {
    pub status_code: u16,
    pub message: String,
}

impl SignalError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_error_display() {
        let err = SignalError::new(404, "session not found");
        assert_eq!(
            err.to_string(),
            "OpenTok error: code: 404; message: session not found"
        );
    }

    #[test]
    fn test_status_code_for_signal_and_decode() {
        let signal: OpenTokError = SignalError::new(403, "forbidden").into();
        assert_eq!(signal.status_code(), Some(403));

        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let decode = OpenTokError::Decode { status: 500, source };
        assert_eq!(decode.status_code(), Some(500));
        assert!(decode.to_string().contains("statusCode: 500"));

        assert_eq!(OpenTokError::Canceled.status_code(), None);
        assert_eq!(
            OpenTokError::InvalidArgument("x".to_string()).status_code(),
            None
        );
    }
}
