//! Cancellable request scopes
//!
//! A view owns a [`RequestScope`] for as long as it is mounted. Requests run
//! through [`RequestScope::run`]; when the scope is cancelled or dropped,
//! in-flight requests resolve to [`ClientError::Cancelled`] instead of
//! delivering a response to a view that is gone.

use crate::error::ClientError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Cancellation boundary for a group of requests
///
/// # Example
/// ```
/// use offer_billing_client::{ClientError, RequestScope};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let scope = RequestScope::new();
/// scope.cancel();
///
/// let result = scope.run(async { Ok::<_, ClientError>(42) }).await;
/// assert!(matches!(result, Err(ClientError::Cancelled)));
/// # });
/// ```
#[derive(Debug)]
pub struct RequestScope {
    token: CancellationToken,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Scope cancelled together with this one, but cancellable on its own
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Handle for cancelling from elsewhere (e.g. an unmount callback)
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run a request unless the scope is cancelled first
    ///
    /// A result that arrives after cancellation is discarded.
    pub async fn run<F, T>(&self, request: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(ClientError::Cancelled),
            result = request => result,
        };

        if self.token.is_cancelled() {
            tracing::debug!("discarding response for cancelled scope");
            return Err(ClientError::Cancelled);
        }
        result
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_cancels_token() {
        let scope = RequestScope::new();
        let token = scope.token();
        assert!(!token.is_cancelled());
        drop(scope);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let parent = RequestScope::new();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
