//! Atomic multi-statement batches.
//!
//! A [`BatchOperation`] collects independent statements and submits them as
//! one server-side unit. A `Logged` batch (the default) is applied atomically
//! by the coordinator and is the only construct in this crate offering
//! atomicity across multiple mutations. Submitting an empty batch is a
//! configuration error raised before any network call.

use crate::driver::translate::ErrorTranslator;
use crate::driver::{BatchKind, CqlDriver};
use crate::error::OperationError;
use crate::operation::context::{ExecutionContext, FallbackHandler, OperationCallback};
use crate::operation::future::ResultFuture;
use crate::operation::{Operation, Plan};
use crate::result::processor::AckProcessor;
use crate::statement::{Consistency, RetryPolicy, Statement, StatementOptions};
use std::sync::Arc;
use std::time::Duration;

/// Builder and executor for one atomic server-side batch.
///
/// Statements are appended during the building phase; any `execute*` call
/// consumes the batch and submits it. The same four execution contracts as
/// [`Operation`] apply.
pub struct BatchOperation {
    driver: Arc<dyn CqlDriver>,
    translator: Arc<dyn ErrorTranslator>,
    kind: BatchKind,
    statements: Vec<Statement>,
    options: StatementOptions,
    fallback: Option<Arc<dyn FallbackHandler>>,
    context: ExecutionContext,
}

impl BatchOperation {
    pub(crate) fn new(
        driver: Arc<dyn CqlDriver>,
        translator: Arc<dyn ErrorTranslator>,
        options: StatementOptions,
    ) -> Self {
        Self {
            driver,
            translator,
            kind: BatchKind::Logged,
            statements: Vec::new(),
            options,
            fallback: None,
            context: ExecutionContext::default(),
        }
    }

    /// Choose the server-side batch semantics.
    pub fn with_kind(mut self, kind: BatchKind) -> Self {
        self.kind = kind;
        self
    }

    /// Append one statement.
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Append several statements in order.
    pub fn with_statements(mut self, statements: impl IntoIterator<Item = Statement>) -> Self {
        self.statements.extend(statements);
        self
    }

    /// Set the consistency level for the whole batch.
    pub fn with_consistency_level(mut self, consistency: Consistency) -> Self {
        self.options.consistency = Some(consistency);
        self
    }

    /// Attach a retry policy to every statement in the batch.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.options.retry_policy = Some(policy);
        self
    }

    /// Enable or disable query tracing for the batch.
    pub fn with_query_tracing(mut self, tracing: bool) -> Self {
        self.options.tracing = Some(tracing);
        self
    }

    /// Install a fallback handler for post-processing failures on async paths.
    pub fn with_fallback_handler(mut self, handler: impl FallbackHandler + 'static) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Set where completion callbacks run.
    pub fn with_executor(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Number of statements collected so far.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether no statements have been collected.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Submit the batch and suspend until it is acknowledged.
    ///
    /// # Errors
    ///
    /// [`crate::error::ConfigurationError::EmptyBatch`] when no statements
    /// were collected; the batch never reaches the network in that case.
    pub async fn execute(self) -> Result<(), OperationError> {
        self.into_operation().execute().await
    }

    /// Submit the batch in the background and return a handle immediately.
    pub fn execute_async(self) -> ResultFuture<()> {
        self.into_operation().execute_async()
    }

    /// Submit the batch in the background and deliver the outcome to
    /// `callback`.
    pub fn execute_with_callback(self, callback: impl OperationCallback<()>) {
        self.into_operation().execute_with_callback(callback)
    }

    /// Submit the batch, then wait up to `limit` for acknowledgement.
    ///
    /// On expiry the caller gets [`crate::error::OperationTimeout`] and the
    /// batch is NOT cancelled; the mutations may still be applied atomically
    /// on the server afterwards.
    pub async fn execute_nonstop(self, limit: Duration) -> Result<(), OperationError> {
        self.into_operation().execute_nonstop(limit).await
    }

    fn into_operation(self) -> Operation<()> {
        let mut op = Operation::new(
            self.driver,
            self.translator,
            Plan::Batch(self.kind, self.statements),
            Arc::new(AckProcessor),
            self.options,
        );
        if let Some(handler) = self.fallback {
            op = op.with_shared_fallback(handler);
        }
        op.with_executor(self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::translate::DefaultTranslator;
    use crate::error::{ConfigurationError, DriverFailure};
    use crate::result::ResultFrame;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Driver {}

        #[async_trait]
        impl CqlDriver for Driver {
            async fn execute(&self, statement: Statement) -> Result<ResultFrame, DriverFailure>;
            async fn execute_batch(
                &self,
                kind: BatchKind,
                statements: Vec<Statement>,
            ) -> Result<ResultFrame, DriverFailure>;
        }
    }

    fn batch(driver: MockDriver) -> BatchOperation {
        BatchOperation::new(
            Arc::new(driver),
            Arc::new(DefaultTranslator),
            StatementOptions::new(),
        )
    }

    #[tokio::test]
    async fn test_empty_batch_is_configuration_error() {
        let mut driver = MockDriver::new();
        driver.expect_execute_batch().times(0);

        let err = batch(driver).execute().await.unwrap_err();
        assert!(matches!(
            err,
            OperationError::Configuration(ConfigurationError::EmptyBatch)
        ));
    }

    #[tokio::test]
    async fn test_batch_submits_all_statements_once() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute_batch()
            .times(1)
            .withf(|kind, statements| *kind == BatchKind::Logged && statements.len() == 2)
            .returning(|_, _| Ok(ResultFrame::empty()));

        batch(driver)
            .with_statements(vec![
                Statement::new("INSERT INTO t (a) VALUES (1)"),
                Statement::new("INSERT INTO t (a) VALUES (2)"),
            ])
            .execute()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_batch_options_applied_to_every_statement() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute_batch()
            .times(1)
            .withf(|_, statements| {
                statements
                    .iter()
                    .all(|s| s.consistency() == Some(Consistency::Quorum))
            })
            .returning(|_, _| Ok(ResultFrame::empty()));

        batch(driver)
            .with_statement(Statement::new("UPDATE t SET a = 1"))
            .with_statement(Statement::new("UPDATE t SET b = 2"))
            .with_consistency_level(Consistency::Quorum)
            .execute()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unlogged_kind_reaches_driver() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute_batch()
            .times(1)
            .withf(|kind, _| *kind == BatchKind::Unlogged)
            .returning(|_, _| Ok(ResultFrame::empty()));

        batch(driver)
            .with_kind(BatchKind::Unlogged)
            .with_statement(Statement::new("INSERT INTO t (a) VALUES (1)"))
            .execute()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_batch_len_tracking() {
        let driver = MockDriver::new();
        let b = batch(driver);
        assert!(b.is_empty());
        let b = b.with_statement(Statement::new("INSERT INTO t (a) VALUES (1)"));
        assert_eq!(b.len(), 1);
    }
}
