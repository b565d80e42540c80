//! # cqlops-rs
//!
//! Operation execution framework for CQL column stores.
//!
//! This library sits between a statement-building layer (an ORM, a repository
//! layer, a CLI) and a native CQL driver. It decorates pre-built statements
//! with execution policy (consistency level, retry policy, query tracing)
//! and executes them under one of four contracts: blocking, future-based
//! async, callback-based async, and bounded-wait ("nonstop"). Result
//! post-processing and a two-channel failure model apply uniformly across all
//! four.
//!
//! The nonstop contract deserves a warning up front: its timeout abandons the
//! wait but does NOT cancel the submission. A timed-out write may still be
//! applied by the cluster afterwards.
//!
//! ## Example
//!
//! ```no_run
//! # use cqlops_rs::*;
//! # use std::sync::Arc;
//! # async fn example(driver: Arc<dyn driver::CqlDriver>) -> Result<(), Box<dyn std::error::Error>> {
//! let operations = CqlOperations::new(driver);
//!
//! // Execute a select, mapping each row through a closure
//! let names: Vec<String> = operations
//!     .select(
//!         Statement::new("SELECT id, name FROM users"),
//!         |row: &result::Row<'_>| row.str("name").map(str::to_string),
//!     )
//!     .with_consistency_level(Consistency::LocalQuorum)
//!     .execute()
//!     .await?;
//!
//! // Fire-and-observe a write with a bounded wait
//! let _outcome = operations
//!     .write(Statement::new("UPDATE users SET name = 'Ada' WHERE id = 1"))
//!     .execute_nonstop(std::time::Duration::from_millis(200))
//!     .await;
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod driver;
pub mod error;
pub mod operation;
pub mod ops;
pub mod result;
pub mod statement;

// Re-export public API
pub use error::{
    ConfigurationError, DriverFailure, ExecutionError, OperationError, OperationTimeout,
    PostProcessingError,
};
pub use operation::{
    BatchOperation, ExecutionContext, FallbackHandler, IngestMode, IngestOperation, IngestReport,
    Operation, OperationCallback, ResultFuture,
};
pub use ops::CqlOperations;
pub use result::{ColumnSpec, CqlType, ResultFrame, Row};
pub use statement::{Consistency, RetryPolicy, Statement, StatementOptions, StatementSource, Value};
