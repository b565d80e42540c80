//! Future handle for one in-flight operation.
//!
//! A [`ResultFuture`] wraps exactly one spawned submission. It supports an
//! unbounded wait, a bounded wait, direct `.await`, and callback registration.
//! Abandoning the wait (dropping the future or timing out in
//! [`ResultFuture::wait_for`]) does NOT cancel the submission: the spawned
//! task runs to completion in the background and the remote operation may
//! still take effect.

use crate::error::{ExecutionError, OperationError, OperationTimeout};
use crate::operation::context::{ExecutionContext, OperationCallback};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

/// Handle to one in-flight operation.
pub struct ResultFuture<T> {
    receiver: oneshot::Receiver<Result<T, OperationError>>,
    settled: Arc<AtomicBool>,
}

impl<T: Send + 'static> ResultFuture<T> {
    pub(crate) fn new(
        receiver: oneshot::Receiver<Result<T, OperationError>>,
        settled: Arc<AtomicBool>,
    ) -> Self {
        Self { receiver, settled }
    }

    /// Whether the underlying submission has settled.
    ///
    /// Settling covers success, submission failure and post-processing
    /// failure alike; it says nothing about whether anyone has observed the
    /// outcome.
    pub fn is_done(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    /// Wait without bound for the outcome.
    pub async fn wait(self) -> Result<T, OperationError> {
        self.receiver
            .await
            .unwrap_or_else(|_| Err(ExecutionError::Lost.into()))
    }

    /// Wait up to `limit` for the outcome.
    ///
    /// On expiry returns [`OperationTimeout`] and abandons the wait. The
    /// submission is NOT cancelled; it keeps running and may still complete
    /// or mutate state on the server. Callers issuing writes must treat a
    /// timeout as at-least-once-attempted-but-unconfirmed.
    pub async fn wait_for(self, limit: Duration) -> Result<T, OperationError> {
        match tokio::time::timeout(limit, self.wait()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(OperationTimeout { waited: limit }.into()),
        }
    }

    /// Register a completion callback instead of awaiting.
    ///
    /// The callback is dispatched through `context` once the submission
    /// settles. Must be called from within a tokio runtime.
    pub fn on_ready(self, context: ExecutionContext, callback: impl OperationCallback<T>) {
        tokio::spawn(async move {
            match self.wait().await {
                Ok(value) => context.dispatch(Box::new(move || callback.on_complete(value))),
                Err(error) => context.dispatch(Box::new(move || callback.on_failure(error))),
            }
        });
    }
}

impl<T> Future for ResultFuture<T> {
    type Output = Result<T, OperationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ExecutionError::Lost.into())),
            Poll::Pending => Poll::Pending,
        }
    }
}
