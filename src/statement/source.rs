//! Statement-producing collaborator interface.
//!
//! The surrounding ORM or repository layer supplies pre-built statements; this
//! crate only consumes them. A source is invoked exactly once, at submission
//! time, on the thread that owns the operation.

use crate::error::ConfigurationError;
use crate::statement::Statement;

/// Produces the statement an operation will submit.
///
/// Building may fail (for example when the external statement generator cannot
/// render the query); such failures surface as
/// [`ConfigurationError::StatementBuild`] before any network call.
pub trait StatementSource: Send {
    /// Build the statement to submit.
    fn create_statement(&self) -> Result<Statement, ConfigurationError>;
}

/// A ready statement is its own source.
impl StatementSource for Statement {
    fn create_statement(&self) -> Result<Statement, ConfigurationError> {
        Ok(self.clone())
    }
}

/// Closures compose as deferred statement sources.
impl<F> StatementSource for F
where
    F: Fn() -> Result<Statement, ConfigurationError> + Send,
{
    fn create_statement(&self) -> Result<Statement, ConfigurationError> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_is_its_own_source() {
        let stmt = Statement::new("SELECT * FROM t");
        let built = stmt.create_statement().unwrap();
        assert_eq!(built.cql(), "SELECT * FROM t");
    }

    #[test]
    fn test_closure_source() {
        let source = || -> Result<Statement, ConfigurationError> { Ok(Statement::new("SELECT 1")) };
        assert_eq!(source.create_statement().unwrap().cql(), "SELECT 1");
    }

    #[test]
    fn test_failing_source() {
        let source = || -> Result<Statement, ConfigurationError> {
            Err(ConfigurationError::StatementBuild(
                "unmapped entity".to_string(),
            ))
        };
        let err = source.create_statement().unwrap_err();
        assert!(err.to_string().contains("unmapped entity"));
    }
}
