//! The operation execution framework.
//!
//! An [`Operation`] pairs a statement plan with a result processor and the
//! execution policy to apply, then executes under one of four contracts:
//!
//! 1. [`Operation::execute`]: submit and suspend until completion.
//! 2. [`Operation::execute_async`]: submit in the background, return a
//!    [`ResultFuture`] immediately.
//! 3. [`Operation::execute_with_callback`]: submit in the background,
//!    deliver the outcome to a callback on the configured
//!    [`ExecutionContext`].
//! 4. [`Operation::execute_nonstop`]: submit in the background and wait up
//!    to a bound; on expiry the caller gets [`OperationTimeout`] and the
//!    submission keeps running uncancelled.
//!
//! All four apply the same [`StatementOptions`] and route through the same
//! [`ResultProcessor`]; they differ only in suspension behavior and failure
//! delivery. Every contract consumes the operation, so a configured operation
//! is submitted at most once; resubmission requires building a new operation
//! from the same statement.

pub mod batch;
pub mod context;
pub mod future;
pub mod ingest;

pub use batch::BatchOperation;
pub use context::{ExecutionContext, FallbackHandler, OperationCallback};
pub use future::ResultFuture;
pub use ingest::{IngestMode, IngestOperation, IngestReport};

use crate::driver::translate::{translate_failure, ErrorTranslator};
use crate::driver::{BatchKind, CqlDriver};
use crate::error::{ConfigurationError, OperationError};
use crate::result::processor::ResultProcessor;
use crate::result::ResultFrame;
use crate::statement::{Consistency, RetryPolicy, Statement, StatementOptions, StatementSource};
use futures::future::try_join_all;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What an operation submits when executed.
pub(crate) enum Plan {
    /// One statement, built at submission time
    Statement(Box<dyn StatementSource>),
    /// One atomic server-side batch
    Batch(BatchKind, Vec<Statement>),
    /// Independent statements fanned out concurrently, results concatenated
    Fanout(Vec<Statement>),
}

/// A configured, not-yet-submitted operation producing a `T`.
///
/// Fluent `with_*` calls accumulate policy during the configuration phase;
/// invoking any `execute*` method consumes the operation and freezes its
/// configuration.
pub struct Operation<T> {
    driver: Arc<dyn CqlDriver>,
    translator: Arc<dyn ErrorTranslator>,
    plan: Plan,
    processor: Arc<dyn ResultProcessor<T>>,
    options: StatementOptions,
    fallback: Option<Arc<dyn FallbackHandler>>,
    context: ExecutionContext,
}

impl<T: Send + 'static> Operation<T> {
    pub(crate) fn new(
        driver: Arc<dyn CqlDriver>,
        translator: Arc<dyn ErrorTranslator>,
        plan: Plan,
        processor: Arc<dyn ResultProcessor<T>>,
        options: StatementOptions,
    ) -> Self {
        Self {
            driver,
            translator,
            plan,
            processor,
            options,
            fallback: None,
            context: ExecutionContext::default(),
        }
    }

    /// Set the consistency level for this operation.
    pub fn with_consistency_level(mut self, consistency: Consistency) -> Self {
        self.options.consistency = Some(consistency);
        self
    }

    /// Attach a retry policy for this operation.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.options.retry_policy = Some(policy);
        self
    }

    /// Enable or disable query tracing for this operation.
    pub fn with_query_tracing(mut self, tracing: bool) -> Self {
        self.options.tracing = Some(tracing);
        self
    }

    /// Install a fallback handler for post-processing failures on async paths.
    pub fn with_fallback_handler(mut self, handler: impl FallbackHandler + 'static) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Install an already-shared fallback handler.
    pub(crate) fn with_shared_fallback(mut self, handler: Arc<dyn FallbackHandler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    /// Set where completion callbacks run.
    ///
    /// Without this, callbacks run inline on the completion task.
    pub fn with_executor(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Submit and suspend until the driver signals completion.
    ///
    /// Post-processing failures propagate directly; the fallback handler is
    /// not consulted on this path.
    pub async fn execute(self) -> Result<T, OperationError> {
        self.run().await
    }

    /// Submit in the background and return a handle immediately.
    ///
    /// The processor runs in the completion task; its failure is carried
    /// inside the returned future and additionally delivered to the fallback
    /// handler, if one is installed. Must be called within a tokio runtime.
    pub fn execute_async(self) -> ResultFuture<T> {
        let fallback = self.fallback.clone();
        spawn_outcome(self.run(), fallback)
    }

    /// Submit in the background and deliver the outcome to `callback`.
    ///
    /// The callback is dispatched through the context configured via
    /// [`Operation::with_executor`]. `on_complete` is never invoked when
    /// post-processing failed; the fallback handler (if installed)
    /// additionally receives post-processing failures exactly once.
    pub fn execute_with_callback(self, callback: impl OperationCallback<T>) {
        let context = self.context.clone();
        self.execute_async().on_ready(context, callback);
    }

    /// Submit in the background, then wait up to `limit` for the outcome.
    ///
    /// On expiry returns [`crate::error::OperationTimeout`] WITHOUT
    /// cancelling the submission: the statement may still execute and mutate
    /// state on the server after the caller has given up. For writes this
    /// means at-least-once-attempted-but-unconfirmed.
    pub async fn execute_nonstop(self, limit: Duration) -> Result<T, OperationError> {
        self.execute_async().wait_for(limit).await
    }

    /// Apply options, submit, translate failures, post-process.
    async fn run(self) -> Result<T, OperationError> {
        let Operation {
            driver,
            translator,
            plan,
            processor,
            options,
            ..
        } = self;

        let frame = match plan {
            Plan::Statement(source) => {
                let mut statement = source.create_statement()?;
                options.apply(&mut statement);
                debug!(cql = statement.cql(), consistency = ?statement.consistency(), "submitting statement");
                driver
                    .execute(statement)
                    .await
                    .map_err(|raw| translate_failure(translator.as_ref(), raw))?
            }
            Plan::Batch(kind, mut statements) => {
                if statements.is_empty() {
                    return Err(ConfigurationError::EmptyBatch.into());
                }
                for statement in &mut statements {
                    options.apply(statement);
                }
                debug!(%kind, statements = statements.len(), "submitting batch");
                driver
                    .execute_batch(kind, statements)
                    .await
                    .map_err(|raw| translate_failure(translator.as_ref(), raw))?
            }
            Plan::Fanout(mut statements) => {
                for statement in &mut statements {
                    options.apply(statement);
                }
                debug!(statements = statements.len(), "fanning out point reads");
                let submissions = statements.into_iter().map(|statement| {
                    let driver = Arc::clone(&driver);
                    let translator = Arc::clone(&translator);
                    async move {
                        driver
                            .execute(statement)
                            .await
                            .map_err(|raw| translate_failure(translator.as_ref(), raw))
                    }
                });
                let frames = try_join_all(submissions).await?;
                ResultFrame::concat(frames)
            }
        };

        processor.process(frame).map_err(Into::into)
    }
}

/// Spawn an outcome-producing future and wrap it in a [`ResultFuture`].
///
/// Shared by every async execution path. If the outcome is a post-processing
/// failure and a fallback handler is installed, the handler is notified here,
/// once, before the outcome is made observable.
pub(crate) fn spawn_outcome<T: Send + 'static>(
    work: impl Future<Output = Result<T, OperationError>> + Send + 'static,
    fallback: Option<Arc<dyn FallbackHandler>>,
) -> ResultFuture<T> {
    let (tx, rx) = oneshot::channel();
    let settled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&settled);

    tokio::spawn(async move {
        let outcome = work.await;
        if let Err(error) = &outcome {
            if error.is_post_processing() {
                if let Some(handler) = &fallback {
                    warn!(%error, "post-processing failed; notifying fallback handler");
                    handler.on_failure(error);
                }
            }
        }
        flag.store(true, Ordering::Release);
        // The receiver may have been dropped by an abandoned wait; the
        // submission above has already run to completion either way.
        let _ = tx.send(outcome);
    });

    ResultFuture::new(rx, settled)
}
