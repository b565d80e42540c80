//! Bulk, non-atomic row ingestion.
//!
//! An [`IngestOperation`] binds one statement template to many parameter
//! tuples and submits the bound statements as a stream, one submission per
//! row. Unlike a batch this is NOT atomic: partial completion is an accepted
//! failure mode. Rows already submitted are unaffected by a later row's
//! failure.
//!
//! Two observation styles exist: the default per-row report collects every
//! row's outcome into an [`IngestReport`]; fail-fast mode stops at the first
//! failed row and surfaces it as a single aggregated error.

use crate::driver::translate::{translate_failure, ErrorTranslator};
use crate::driver::CqlDriver;
use crate::error::{ConfigurationError, ExecutionError, OperationError};
use crate::operation::context::{ExecutionContext, FallbackHandler, OperationCallback};
use crate::operation::future::ResultFuture;
use crate::operation::spawn_outcome;
use crate::statement::{Consistency, RetryPolicy, Statement, StatementOptions, Value};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How bound rows are pushed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// One round-trip per row, in row order.
    Sequential,
    /// Up to `concurrency` rows in flight at once. Completion order is not
    /// row order; the report is re-ordered by row index.
    Pipelined { concurrency: usize },
}

impl Default for IngestMode {
    fn default() -> Self {
        IngestMode::Sequential
    }
}

/// Per-row outcome collection of one ingest run.
#[derive(Debug)]
pub struct IngestReport {
    outcomes: Vec<Result<(), ExecutionError>>,
}

impl IngestReport {
    /// Number of rows submitted.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of rows the cluster acknowledged.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Number of rows that failed.
    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// Whether every row was acknowledged.
    pub fn is_fully_applied(&self) -> bool {
        self.failed() == 0
    }

    /// Per-row outcomes in row order.
    pub fn outcomes(&self) -> &[Result<(), ExecutionError>] {
        &self.outcomes
    }

    /// Iterate over failed rows as `(row_index, error)`.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ExecutionError)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| outcome.as_ref().err().map(|e| (index, e)))
    }
}

/// Builder and executor for one bulk ingest run.
///
/// The same four execution contracts as [`Operation`](crate::operation::Operation)
/// apply, producing an [`IngestReport`].
pub struct IngestOperation {
    driver: Arc<dyn CqlDriver>,
    translator: Arc<dyn ErrorTranslator>,
    template: Statement,
    rows: Vec<Vec<Value>>,
    mode: IngestMode,
    fail_fast: bool,
    options: StatementOptions,
    fallback: Option<Arc<dyn FallbackHandler>>,
    context: ExecutionContext,
}

impl IngestOperation {
    pub(crate) fn new(
        driver: Arc<dyn CqlDriver>,
        translator: Arc<dyn ErrorTranslator>,
        template: Statement,
        options: StatementOptions,
    ) -> Self {
        Self {
            driver,
            translator,
            template,
            rows: Vec::new(),
            mode: IngestMode::default(),
            fail_fast: false,
            options,
            fallback: None,
            context: ExecutionContext::default(),
        }
    }

    /// Append one parameter tuple.
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }

    /// Append several parameter tuples in order.
    pub fn with_bound_rows(mut self, rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Choose sequential or pipelined submission.
    pub fn with_mode(mut self, mode: IngestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Stop at the first failed row and surface it as a single error.
    ///
    /// In pipelined mode rows already in flight still complete; fail-fast
    /// only stops further submissions and picks the lowest failed row index
    /// as the aggregated error.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the consistency level for every row submission.
    pub fn with_consistency_level(mut self, consistency: Consistency) -> Self {
        self.options.consistency = Some(consistency);
        self
    }

    /// Attach a retry policy to every row submission.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.options.retry_policy = Some(policy);
        self
    }

    /// Enable or disable query tracing for every row submission.
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

    /// Number of rows collected so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows have been collected.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Submit every row and suspend until the stream drains.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::EmptyIngest`] when no rows were bound. In
    /// fail-fast mode the first failed row surfaces as an
    /// [`ExecutionError`]; otherwise row failures are carried in the report.
    pub async fn execute(self) -> Result<IngestReport, OperationError> {
        self.run().await
    }

    /// Submit the stream in the background and return a handle immediately.
    pub fn execute_async(self) -> ResultFuture<IngestReport> {
        let fallback = self.fallback.clone();
        spawn_outcome(self.run(), fallback)
    }

    /// Submit the stream in the background and deliver the report to
    /// `callback`.
    pub fn execute_with_callback(self, callback: impl OperationCallback<IngestReport>) {
        let context = self.context.clone();
        self.execute_async().on_ready(context, callback);
    }

    /// Submit the stream, then wait up to `limit` for it to drain.
    ///
    /// On expiry the caller gets [`crate::error::OperationTimeout`] and the
    /// stream is NOT cancelled: remaining rows keep being submitted in the
    /// background. Rows are at-least-once-attempted-but-unconfirmed.
    pub async fn execute_nonstop(self, limit: Duration) -> Result<IngestReport, OperationError> {
        self.execute_async().wait_for(limit).await
    }

    /// Bind every tuple, then push the bound statements per the mode.
    async fn run(self) -> Result<IngestReport, OperationError> {
        let IngestOperation {
            driver,
            translator,
            template,
            rows,
            mode,
            fail_fast,
            options,
            ..
        } = self;

        if rows.is_empty() {
            return Err(ConfigurationError::EmptyIngest.into());
        }

        let expected = template.cql().matches('?').count();
        let mut bound = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            if expected > 0 && row.len() != expected {
                return Err(ConfigurationError::RowShapeMismatch {
                    row: index,
                    expected,
                    found: row.len(),
                }
                .into());
            }
            let mut statement = template.clone();
            statement.rebind(row);
            options.apply(&mut statement);
            bound.push(statement);
        }

        debug!(rows = bound.len(), ?mode, "starting ingest");

        let outcomes = match mode {
            IngestMode::Sequential => {
                let mut outcomes = Vec::with_capacity(bound.len());
                for statement in bound {
                    let outcome = driver
                        .execute(statement)
                        .await
                        .map(|_| ())
                        .map_err(|raw| translate_failure(translator.as_ref(), raw));
                    match outcome {
                        Err(error) if fail_fast => return Err(error.into()),
                        outcome => outcomes.push(outcome),
                    }
                }
                outcomes
            }
            IngestMode::Pipelined { concurrency } => {
                let submissions = bound.into_iter().enumerate().map(|(index, statement)| {
                    let driver = Arc::clone(&driver);
                    let translator = Arc::clone(&translator);
                    async move {
                        let outcome = driver
                            .execute(statement)
                            .await
                            .map(|_| ())
                            .map_err(|raw| translate_failure(translator.as_ref(), raw));
                        (index, outcome)
                    }
                });
                let mut indexed: Vec<(usize, Result<(), ExecutionError>)> =
                    stream::iter(submissions)
                        .buffer_unordered(concurrency.max(1))
                        .collect()
                        .await;
                indexed.sort_by_key(|(index, _)| *index);
                let mut outcomes: Vec<Result<(), ExecutionError>> =
                    indexed.into_iter().map(|(_, outcome)| outcome).collect();
                if fail_fast {
                    if let Some(position) = outcomes.iter().position(|o| o.is_err()) {
                        let error = outcomes
                            .swap_remove(position)
                            .expect_err("position points at an error");
                        return Err(error.into());
                    }
                }
                outcomes
            }
        };

        let report = IngestReport { outcomes };
        debug!(
            attempted = report.attempted(),
            failed = report.failed(),
            "ingest finished"
        );
        Ok(report)
    }
}
