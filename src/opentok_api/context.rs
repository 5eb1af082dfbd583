use crate::opentok_api::types::OpenTokError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline scope for a single API call
///
/// Clones share the same cancellation token, so a clone handed to another
/// task can abort a call that is in flight.
///
/// # Example
///
/// ```no_run
/// use opentok_sdk::CallContext;
/// use std::time::Duration;
///
/// let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
/// let handle = ctx.clone();
/// // ... later, from anywhere:
/// handle.cancel();
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context with no deadline that is cancelled only explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire the context `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Expire the context at `deadline`, keeping an earlier deadline if one is set
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Drive cancellation from an existing token
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context is already done
    pub(crate) fn check(&self) -> Result<(), OpenTokError> {
        if self.cancel.is_cancelled() {
            return Err(OpenTokError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(OpenTokError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Run `fut` until it completes or the context is cancelled or expires
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T, OpenTokError>
    where
        F: Future<Output = Result<T, OpenTokError>>,
    {
        self.check()?;

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(OpenTokError::Canceled),
            _ = expired => Err(OpenTokError::DeadlineExceeded),
            result = fut => result,
        }
    }
}
