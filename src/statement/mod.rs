//! Statements and the execution policy attached to them.
//!
//! A [`Statement`] is one unit of database work: CQL text, bound values, and
//! the policy fields (consistency level, retry policy, tracing) that
//! [`StatementOptions`] copies on immediately before submission.
//!
//! A statement is owned by the thread that configures it until submission;
//! it is never shared across threads before being handed to the driver.

pub mod options;
pub mod source;
pub mod value;

pub use options::{Consistency, RetryPolicy, StatementOptions};
pub use source::StatementSource;
pub use value::Value;

/// One unit of database work with attached execution policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// CQL text, possibly with `?` placeholders
    cql: String,
    /// Values bound to the placeholders, in order
    values: Vec<Value>,
    /// Requested consistency level
    consistency: Option<Consistency>,
    /// Attached retry policy
    retry_policy: Option<RetryPolicy>,
    /// Whether query tracing is enabled
    tracing: bool,
}

impl Statement {
    /// Create a statement with no bound values.
    pub fn new(cql: impl Into<String>) -> Self {
        Self {
            cql: cql.into(),
            values: Vec::new(),
            consistency: None,
            retry_policy: None,
            tracing: false,
        }
    }

    /// Create a statement with bound values.
    pub fn with_values(cql: impl Into<String>, values: Vec<Value>) -> Self {
        let mut stmt = Self::new(cql);
        stmt.values = values;
        stmt
    }

    /// Get the CQL text.
    pub fn cql(&self) -> &str {
        &self.cql
    }

    /// Get the bound values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Append one bound value.
    pub fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    /// Replace all bound values.
    pub fn rebind(&mut self, values: Vec<Value>) {
        self.values = values;
    }

    /// Get the requested consistency level, if any.
    pub fn consistency(&self) -> Option<Consistency> {
        self.consistency
    }

    /// Set the consistency level.
    pub fn set_consistency(&mut self, consistency: Consistency) {
        self.consistency = Some(consistency);
    }

    /// Get the attached retry policy, if any.
    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry_policy
    }

    /// Set the retry policy.
    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry_policy = Some(policy);
    }

    /// Whether query tracing is enabled.
    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// Enable or disable query tracing.
    pub fn set_tracing(&mut self, tracing: bool) {
        self.tracing = tracing;
    }
}
