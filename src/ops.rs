//! Entry point for constructing operations.
//!
//! [`CqlOperations`] owns the driver handle, the error translator and a
//! default execution profile, and hands out configured operations for each
//! kind of database work: point and range reads, writes, atomic batches and
//! bulk ingest.

use crate::driver::translate::{DefaultTranslator, ErrorTranslator};
use crate::driver::CqlDriver;
use crate::operation::{BatchOperation, IngestOperation, Operation, Plan};
use crate::result::processor::{
    AckProcessor, FirstColumnProcessor, MapProcessor, OneRowProcessor, ResultProcessor, RowMapper,
    RowsProcessor,
};
use crate::statement::{Statement, StatementOptions, StatementSource, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Factory for operations against one logical cluster connection.
///
/// Statements come from the surrounding statement-builder layer; row mappers
/// come from the surrounding entity-mapping layer. This type only wires them
/// to the execution framework.
///
/// # Example
///
/// ```no_run
/// # use cqlops_rs::ops::CqlOperations;
/// # use cqlops_rs::statement::{Consistency, Statement};
/// # use cqlops_rs::result::Row;
/// # async fn example(operations: CqlOperations) -> Result<(), Box<dyn std::error::Error>> {
/// let statement = Statement::with_values(
///     "SELECT id, name FROM users WHERE id = ?",
///     vec![42i64.into()],
/// );
///
/// let user = operations
///     .select_one(statement, |row: &Row<'_>| row.str("name").map(str::to_string))
///     .with_consistency_level(Consistency::LocalQuorum)
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct CqlOperations {
    driver: Arc<dyn CqlDriver>,
    translator: Arc<dyn ErrorTranslator>,
    defaults: StatementOptions,
}

impl CqlOperations {
    /// Create a factory over a driver with the default translator and an
    /// empty default profile.
    pub fn new(driver: Arc<dyn CqlDriver>) -> Self {
        Self {
            driver,
            translator: Arc::new(DefaultTranslator),
            defaults: StatementOptions::new(),
        }
    }

    /// Replace the error translator.
    pub fn with_translator(mut self, translator: Arc<dyn ErrorTranslator>) -> Self {
        self.translator = translator;
        self
    }

    /// Set the execution profile every operation starts from.
    ///
    /// Per-operation `with_*` calls override individual fields.
    pub fn with_default_options(mut self, defaults: StatementOptions) -> Self {
        self.defaults = defaults;
        self
    }

    fn operation<T: Send + 'static>(
        &self,
        plan: Plan,
        processor: Arc<dyn ResultProcessor<T>>,
    ) -> Operation<T> {
        Operation::new(
            Arc::clone(&self.driver),
            Arc::clone(&self.translator),
            plan,
            processor,
            self.defaults.clone(),
        )
    }

    /// A select returning every row mapped through `mapper`.
    pub fn select<T, M>(
        &self,
        source: impl StatementSource + 'static,
        mapper: M,
    ) -> Operation<Vec<T>>
    where
        T: Send + 'static,
        M: RowMapper<T> + 'static,
    {
        self.operation(
            Plan::Statement(Box::new(source)),
            Arc::new(RowsProcessor::new(mapper)),
        )
    }

    /// A select expected to match at most one row.
    ///
    /// Zero rows yield `None`; two or more rows fail with a multiplicity
    /// error.
    pub fn select_one<T, M>(
        &self,
        source: impl StatementSource + 'static,
        mapper: M,
    ) -> Operation<Option<T>>
    where
        T: Send + 'static,
        M: RowMapper<T> + 'static,
    {
        self.operation(
            Plan::Statement(Box::new(source)),
            Arc::new(OneRowProcessor::new(mapper)),
        )
    }

    /// A point read by primary key.
    ///
    /// The statement must already carry the key binding; semantically this is
    /// [`CqlOperations::select_one`] for a key-bound statement.
    pub fn get<T, M>(&self, statement: Statement, mapper: M) -> Operation<Option<T>>
    where
        T: Send + 'static,
        M: RowMapper<T> + 'static,
    {
        self.select_one(statement, mapper)
    }

    /// Concurrent point reads for several key-bound statements.
    ///
    /// Results are concatenated in statement order. An empty statement list
    /// yields an empty result without touching the network.
    pub fn multi_get<T, M>(&self, statements: Vec<Statement>, mapper: M) -> Operation<Vec<T>>
    where
        T: Send + 'static,
        M: RowMapper<T> + 'static,
    {
        self.operation(
            Plan::Fanout(statements),
            Arc::new(RowsProcessor::new(mapper)),
        )
    }

    /// A write (insert, update or delete) acknowledged with `()`.
    pub fn write(&self, source: impl StatementSource + 'static) -> Operation<()> {
        self.operation(Plan::Statement(Box::new(source)), Arc::new(AckProcessor))
    }

    /// A select returning the first column of every row as raw values.
    pub fn first_column(&self, source: impl StatementSource + 'static) -> Operation<Vec<Value>> {
        self.operation(
            Plan::Statement(Box::new(source)),
            Arc::new(FirstColumnProcessor),
        )
    }

    /// A select returning every row as a name-to-value map.
    pub fn rows_as_maps(
        &self,
        source: impl StatementSource + 'static,
    ) -> Operation<Vec<HashMap<String, Value>>> {
        self.operation(Plan::Statement(Box::new(source)), Arc::new(MapProcessor))
    }

    /// An empty atomic batch to fill via
    /// [`with_statements`](BatchOperation::with_statements).
    pub fn batch(&self) -> BatchOperation {
        BatchOperation::new(
            Arc::clone(&self.driver),
            Arc::clone(&self.translator),
            self.defaults.clone(),
        )
    }

    /// A bulk ingest over `template`, to fill via
    /// [`with_bound_rows`](IngestOperation::with_bound_rows).
    pub fn ingest(&self, template: Statement) -> IngestOperation {
        IngestOperation::new(
            Arc::clone(&self.driver),
            Arc::clone(&self.translator),
            template,
            self.defaults.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BatchKind;
    use crate::error::{DriverFailure, OperationError, PostProcessingError};
    use crate::result::{ColumnSpec, CqlType, ResultFrame, Row};
    use crate::statement::Consistency;
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

    fn users_frame(rows: &[(i64, &str)]) -> ResultFrame {
        ResultFrame::new(
            vec![
                ColumnSpec::new("id", CqlType::BigInt),
                ColumnSpec::new("name", CqlType::Text),
            ],
            rows.iter()
                .map(|(id, name)| vec![Value::BigInt(*id), Value::Text((*name).to_string())])
                .collect(),
        )
    }

    fn name_mapper() -> impl RowMapper<String> {
        |row: &Row<'_>| row.str("name").map(str::to_string)
    }

    #[tokio::test]
    async fn test_select_maps_rows() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute()
            .times(1)
            .returning(|_| Ok(users_frame(&[(1, "Alice"), (2, "Bob")])));

        let ops = CqlOperations::new(Arc::new(driver));
        let names = ops
            .select(Statement::new("SELECT id, name FROM users"), name_mapper())
            .execute()
            .await
            .unwrap();
        assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string()]);
    }

    #[tokio::test]
    async fn test_select_one_multiplicity() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute()
            .times(1)
            .returning(|_| Ok(users_frame(&[(1, "Alice"), (2, "Bob")])));

        let ops = CqlOperations::new(Arc::new(driver));
        let err = ops
            .select_one(Statement::new("SELECT id, name FROM users"), name_mapper())
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OperationError::PostProcessing(PostProcessingError::Multiplicity { found: 2 })
        ));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute()
            .times(1)
            .returning(|_| Ok(users_frame(&[])));

        let ops = CqlOperations::new(Arc::new(driver));
        let user = ops
            .get(
                Statement::with_values("SELECT id, name FROM users WHERE id = ?", vec![9i64.into()]),
                name_mapper(),
            )
            .execute()
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_multi_get_empty_keys_is_empty() {
        let driver = MockDriver::new();
        let ops = CqlOperations::new(Arc::new(driver));
        let users = ops
            .multi_get(Vec::new(), name_mapper())
            .execute()
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_default_options_flow_into_operations() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute()
            .times(1)
            .withf(|statement| statement.consistency() == Some(Consistency::LocalQuorum))
            .returning(|_| Ok(ResultFrame::empty()));

        let ops = CqlOperations::new(Arc::new(driver)).with_default_options(
            StatementOptions::new().with_consistency(Consistency::LocalQuorum),
        );
        ops.write(Statement::new("DELETE FROM users WHERE id = 1"))
            .execute()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_per_operation_override_beats_default() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute()
            .times(1)
            .withf(|statement| statement.consistency() == Some(Consistency::All))
            .returning(|_| Ok(ResultFrame::empty()));

        let ops = CqlOperations::new(Arc::new(driver)).with_default_options(
            StatementOptions::new().with_consistency(Consistency::One),
        );
        ops.write(Statement::new("DELETE FROM users WHERE id = 1"))
            .with_consistency_level(Consistency::All)
            .execute()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_first_column() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute()
            .times(1)
            .returning(|_| Ok(users_frame(&[(7, "x")])));

        let ops = CqlOperations::new(Arc::new(driver));
        let ids = ops
            .first_column(Statement::new("SELECT id FROM users"))
            .execute()
            .await
            .unwrap();
        assert_eq!(ids, vec![Value::BigInt(7)]);
    }

    #[tokio::test]
    async fn test_rows_as_maps() {
        let mut driver = MockDriver::new();
        driver
            .expect_execute()
            .times(1)
            .returning(|_| Ok(users_frame(&[(7, "x")])));

        let ops = CqlOperations::new(Arc::new(driver));
        let maps = ops
            .rows_as_maps(Statement::new("SELECT id, name FROM users"))
            .execute()
            .await
            .unwrap();
        assert_eq!(maps[0].get("name"), Some(&Value::Text("x".to_string())));
    }
}
