//! Error types for cqlops-rs.
//!
//! This module defines domain-specific error types organized by functional area.
//! Two failure notions are kept strictly apart: an [`ExecutionError`] means the
//! statement could not be executed by the cluster, while an [`OperationTimeout`]
//! means the caller stopped waiting. A timed-out operation may still complete
//! on the server side.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type encompassing all possible operation failures.
#[derive(Error, Debug)]
pub enum OperationError {
    /// The operation was misconfigured and never reached the network
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The underlying submission failed
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A bounded wait expired on the caller side
    #[error(transparent)]
    Timeout(#[from] OperationTimeout),

    /// Result post-processing failed after a successful submission
    #[error(transparent)]
    PostProcessing(#[from] PostProcessingError),
}

impl OperationError {
    /// Whether this error originated in result post-processing rather than
    /// in the submission itself.
    pub fn is_post_processing(&self) -> bool {
        matches!(self, OperationError::PostProcessing(_))
    }

    /// Whether this error is a client-side wait abandonment.
    pub fn is_timeout(&self) -> bool {
        matches!(self, OperationError::Timeout(_))
    }
}

/// Errors raised before any network call is made.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A batch was submitted with no statements
    #[error("Batch contains no statements")]
    EmptyBatch,

    /// An ingest was submitted with no bound rows
    #[error("Ingest contains no bound rows")]
    EmptyIngest,

    /// The external statement builder failed to produce a statement
    #[error("Failed to build statement: {0}")]
    StatementBuild(String),

    /// A bound row does not match the template's parameter shape
    #[error("Bound row {row} has {found} values, template expects {expected}")]
    RowShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors surfaced by the cluster or the driver while executing a submission.
///
/// Raw driver failures are passed through the configured
/// [`ErrorTranslator`](crate::driver::translate::ErrorTranslator) before being
/// surfaced; failures the translator declines to map are carried as-is in the
/// [`ExecutionError::Driver`] variant.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Not enough replicas were alive to satisfy the consistency level
    #[error("Consistency not achievable: {alive} of {required} required replicas alive")]
    Unavailable { required: u32, alive: u32 },

    /// The coordinator timed out waiting for read responses
    #[error("Server-side read timed out: {received} of {required} responses received")]
    ReadTimedOut { required: u32, received: u32 },

    /// The coordinator timed out waiting for write acknowledgements
    #[error("Server-side write timed out: {received} of {required} acknowledgements received")]
    WriteTimedOut { required: u32, received: u32 },

    /// The coordinator rejected the request due to load
    #[error("Coordinator overloaded: {0}")]
    Overloaded(String),

    /// The connection to the coordinator was lost mid-operation
    #[error("Connection to coordinator lost")]
    Disconnected,

    /// The server reported an error for the statement itself
    #[error("Server error {code}: {message}")]
    Server { code: i32, message: String },

    /// The submission task terminated without producing a result
    #[error("Submission task dropped its result channel")]
    Lost,

    /// A raw driver failure the translator left as-is
    #[error(transparent)]
    Driver(#[from] DriverFailure),
}

/// A client-side bounded wait expired.
///
/// This is explicitly NOT an [`ExecutionError`]: the submission was not
/// cancelled and carries no guarantee about the remote outcome. For write
/// statements this means at-least-once-attempted-but-unconfirmed.
#[derive(Error, Debug)]
#[error("Gave up waiting after {}ms; the submission was not cancelled and may still complete", waited.as_millis())]
pub struct OperationTimeout {
    /// How long the caller waited before abandoning the operation
    pub waited: Duration,
}

/// Errors raised by a result processor while transforming a successful result.
#[derive(Error, Debug)]
pub enum PostProcessingError {
    /// A single-row processor observed more than one row
    #[error("Expected at most one row, found {found}")]
    Multiplicity { found: usize },

    /// A row could not be mapped to the target type
    #[error("Failed to map row {row}: {message}")]
    Mapping { row: usize, message: String },

    /// A column held a value of an unexpected type
    #[error("Type mismatch in column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A named column is not present in the result
    #[error("Column '{0}' not present in result")]
    MissingColumn(String),

    /// The result carries no columns at all
    #[error("Result has no columns")]
    NoColumns,
}

/// Raw failure surface of the underlying driver collaborator.
///
/// These are the errors the native async layer reports before translation.
#[derive(Error, Debug)]
pub enum DriverFailure {
    /// Replicas required by the consistency level are not alive
    #[error("Unavailable: {alive}/{required} replicas alive")]
    Unavailable { required: u32, alive: u32 },

    /// Coordinator-side read timeout
    #[error("Read timeout: {received}/{required} responses")]
    ReadTimeout { required: u32, received: u32 },

    /// Coordinator-side write timeout
    #[error("Write timeout: {received}/{required} acknowledgements")]
    WriteTimeout { required: u32, received: u32 },

    /// Coordinator shed the request
    #[error("Overloaded: {0}")]
    Overloaded(String),

    /// Transport-level connection loss
    #[error("Connection closed")]
    ConnectionClosed,

    /// Server-reported error with a protocol error code
    #[error("Server error {code}: {message}")]
    Server { code: i32, message: String },

    /// Any other I/O-level failure
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_timeout_display() {
        let err = OperationTimeout {
            waited: Duration::from_millis(250),
        };
        assert!(err.to_string().contains("250ms"));
        assert!(err.to_string().contains("not cancelled"));
    }

    #[test]
    fn test_timeout_is_not_execution_error() {
        let err: OperationError = OperationTimeout {
            waited: Duration::from_millis(10),
        }
        .into();
        assert!(err.is_timeout());
        assert!(!matches!(err, OperationError::Execution(_)));
    }

    #[test]
    fn test_multiplicity_display() {
        let err = PostProcessingError::Multiplicity { found: 3 };
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_post_processing_classification() {
        let err: OperationError = PostProcessingError::Multiplicity { found: 2 }.into();
        assert!(err.is_post_processing());

        let err: OperationError = ExecutionError::Disconnected.into();
        assert!(!err.is_post_processing());
    }

    #[test]
    fn test_driver_failure_passthrough() {
        let err: ExecutionError = DriverFailure::Io("broken pipe".to_string()).into();
        assert!(err.to_string().contains("broken pipe"));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::RowShapeMismatch {
            row: 4,
            expected: 3,
            found: 2,
        };
        assert!(err.to_string().contains("row 4"));
        assert!(err.to_string().contains("expects 3"));
    }
}
