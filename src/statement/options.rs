//! Execution policy attached to statements before submission.
//!
//! [`StatementOptions`] is the holder for consistency level, retry policy and
//! query tracing. Applying options onto a statement copies every present field
//! and leaves absent fields untouched; application is total and idempotent.

use crate::statement::Statement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// CQL consistency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consistency {
    /// A write is accepted by any node, including hinted handoff
    Any,
    /// One replica
    One,
    /// Two replicas
    Two,
    /// Three replicas
    Three,
    /// Majority of replicas across the cluster
    Quorum,
    /// All replicas
    All,
    /// Majority of replicas in the local datacenter
    LocalQuorum,
    /// Majority of replicas in every datacenter
    EachQuorum,
    /// One replica in the local datacenter
    LocalOne,
    /// Linearizable read of conditional updates
    Serial,
    /// Linearizable read within the local datacenter
    LocalSerial,
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Consistency::Any => "ANY",
            Consistency::One => "ONE",
            Consistency::Two => "TWO",
            Consistency::Three => "THREE",
            Consistency::Quorum => "QUORUM",
            Consistency::All => "ALL",
            Consistency::LocalQuorum => "LOCAL_QUORUM",
            Consistency::EachQuorum => "EACH_QUORUM",
            Consistency::LocalOne => "LOCAL_ONE",
            Consistency::Serial => "SERIAL",
            Consistency::LocalSerial => "LOCAL_SERIAL",
        };
        write!(f, "{}", name)
    }
}

/// Named retry policy attached to a statement.
///
/// Policies are opaque to this layer: the driver interprets them, this crate
/// only carries the selection onto the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Driver default retry behavior
    Default,
    /// Never retry, rethrow the first failure
    Fallthrough,
    /// Retry at progressively weaker consistency levels
    DowngradingConsistency,
}

/// Consistency level, retry policy and tracing flag for one submission.
///
/// Options are copied onto a [`Statement`] immediately before submission via
/// [`StatementOptions::apply`]. Fields left unset keep the statement's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementOptions {
    /// Consistency level to request, if any
    pub consistency: Option<Consistency>,
    /// Retry policy to attach, if any
    pub retry_policy: Option<RetryPolicy>,
    /// Whether to enable query tracing, if set
    pub tracing: Option<bool>,
}

impl StatementOptions {
    /// Create empty options that leave every statement field untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the consistency level.
    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Set the tracing flag.
    pub fn with_tracing(mut self, tracing: bool) -> Self {
        self.tracing = Some(tracing);
        self
    }

    /// Copy every present field onto `statement`.
    ///
    /// Total and side-effecting with no failure mode; applying twice yields
    /// the same statement state as applying once. Field order is irrelevant
    /// since the fields are independent.
    pub fn apply(&self, statement: &mut Statement) {
        if let Some(consistency) = self.consistency {
            statement.set_consistency(consistency);
        }
        if let Some(policy) = self.retry_policy {
            statement.set_retry_policy(policy);
        }
        if let Some(tracing) = self.tracing {
            statement.set_tracing(tracing);
        }
    }
}
