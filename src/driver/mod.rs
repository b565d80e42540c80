//! Driver collaborator abstraction.
//!
//! This module defines the [`CqlDriver`] trait that abstracts the underlying
//! native driver (connection pooling, load balancing, the wire protocol and
//! the retry machinery all live behind it). This crate only submits statements
//! through it and observes completion.

pub mod translate;

use crate::error::DriverFailure;
use crate::result::ResultFrame;
use crate::statement::Statement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side grouping semantics for a multi-statement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    /// Atomic batch with a batchlog write-ahead entry
    Logged,
    /// Non-atomic batch without the batchlog round-trip
    Unlogged,
    /// Batch of counter mutations
    Counter,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchKind::Logged => "LOGGED",
            BatchKind::Unlogged => "UNLOGGED",
            BatchKind::Counter => "COUNTER",
        };
        write!(f, "{}", name)
    }
}

/// Native async driver the operation layer submits through.
///
/// Completion of the returned future is the driver's completion signal; the
/// operation layer never observes the wire protocol directly. Implementations
/// complete operations on their own task pool, so a returned future may
/// resolve on any thread.
#[async_trait]
pub trait CqlDriver: Send + Sync {
    /// Submit a single statement and wait for the coordinator's response.
    ///
    /// # Errors
    ///
    /// Returns the raw [`DriverFailure`] the native layer reported. Callers
    /// are expected to pass it through an
    /// [`ErrorTranslator`](translate::ErrorTranslator) before surfacing it.
    async fn execute(&self, statement: Statement) -> Result<ResultFrame, DriverFailure>;

    /// Submit several statements as one server-side batch.
    ///
    /// A `Logged` batch is applied atomically by the coordinator. The
    /// statement list is never empty; the operation layer rejects empty
    /// batches before calling this.
    ///
    /// # Errors
    ///
    /// Returns the raw [`DriverFailure`] the native layer reported.
    async fn execute_batch(
        &self,
        kind: BatchKind,
        statements: Vec<Statement>,
    ) -> Result<ResultFrame, DriverFailure>;
}
