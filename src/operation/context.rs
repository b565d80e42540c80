//! Callback scheduling and the out-of-band failure channel.
//!
//! Completion callbacks run on an explicit [`ExecutionContext`] so the choice
//! of thread is visible at the call site rather than implicit. The default,
//! [`ExecutionContext::Inline`], runs the callback on the completion task
//! itself; a slow callback there stalls further completions on that task, so
//! long-running callbacks must supply a runtime context instead.

use crate::error::OperationError;
use tokio::runtime::Handle;

/// Receives the outcome of a callback-style execution.
///
/// Exactly one of the two methods is invoked per operation. `on_complete` is
/// never invoked with a half-failed result: if post-processing fails, only the
/// failure channel fires.
pub trait OperationCallback<T>: Send + Sync + 'static {
    /// The operation completed and post-processing succeeded.
    fn on_complete(&self, value: T);

    /// The operation failed, either at submission or in post-processing.
    fn on_failure(&self, error: OperationError);
}

/// Secondary failure channel for post-processing errors on async paths.
///
/// Without a fallback handler, a mapping bug in a processor running on a
/// background task is only observable if the caller consumes the future. The
/// handler is notified exactly once per failed post-processing; the future or
/// callback still carries the failure regardless.
pub trait FallbackHandler: Send + Sync {
    /// A processor failed while transforming an otherwise-successful result.
    fn on_failure(&self, error: &OperationError);
}

/// Where completion callbacks run.
#[derive(Debug, Clone, Default)]
pub enum ExecutionContext {
    /// Run on the completion task itself.
    ///
    /// This shares the completion path: a slow callback delays every
    /// completion queued behind it.
    #[default]
    Inline,

    /// Spawn each callback onto a tokio runtime.
    Runtime(Handle),
}

impl ExecutionContext {
    /// The inline context.
    pub fn inline() -> Self {
        ExecutionContext::Inline
    }

    /// A context spawning onto the given runtime handle.
    pub fn runtime(handle: Handle) -> Self {
        ExecutionContext::Runtime(handle)
    }

    /// A context spawning onto the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        ExecutionContext::Runtime(Handle::current())
    }

    /// Dispatch a completion job according to the context.
    pub(crate) fn dispatch(&self, job: Box<dyn FnOnce() + Send + 'static>) {
        match self {
            ExecutionContext::Inline => job(),
            ExecutionContext::Runtime(handle) => {
                handle.spawn(async move { job() });
            }
        }
    }
}
