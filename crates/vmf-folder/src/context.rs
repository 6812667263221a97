//! Explicit call context: deadline + cancellation.
//!
//! Every remote call made by the reconciler, including waiting on a
//! long-running task, runs through [`CallContext::run`]. The driver itself
//! sets no timeout; whatever the caller put here is honoured and surfaced as
//! [`InventoryError::Cancelled`] or [`InventoryError::DeadlineExceeded`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use vmf_inventory::InventoryError;

#[derive(Clone, Debug, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// No deadline, never cancelled unless the token is cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a caller-owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Drive `call` to completion unless the context is cancelled or its
    /// deadline passes first.
    pub async fn run<T, F>(&self, call: F) -> Result<T, InventoryError>
    where
        F: Future<Output = Result<T, InventoryError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(InventoryError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(InventoryError::DeadlineExceeded);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, call)
                    .await
                    .unwrap_or(Err(InventoryError::DeadlineExceeded)),
                None => call.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(InventoryError::Cancelled),
            res = bounded => res,
        }
    }
}
