//! Translation of raw driver failures into the operation error taxonomy.
//!
//! The translator is a collaborator: the surrounding layer may install its own
//! mapping. Returning `None` means "leave as-is", in which case the raw
//! failure is carried unchanged inside [`ExecutionError::Driver`].

use crate::error::{DriverFailure, ExecutionError};

/// Maps raw driver failures onto the domain taxonomy.
pub trait ErrorTranslator: Send + Sync {
    /// Translate a raw failure, or return `None` to leave it as-is.
    fn translate(&self, raw: &DriverFailure) -> Option<ExecutionError>;
}

/// Standard mapping from driver failures to [`ExecutionError`] variants.
///
/// I/O-level failures carry no domain meaning and are left untranslated.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTranslator;

impl ErrorTranslator for DefaultTranslator {
    fn translate(&self, raw: &DriverFailure) -> Option<ExecutionError> {
        match raw {
            DriverFailure::Unavailable { required, alive } => Some(ExecutionError::Unavailable {
                required: *required,
                alive: *alive,
            }),
            DriverFailure::ReadTimeout { required, received } => {
                Some(ExecutionError::ReadTimedOut {
                    required: *required,
                    received: *received,
                })
            }
            DriverFailure::WriteTimeout { required, received } => {
                Some(ExecutionError::WriteTimedOut {
                    required: *required,
                    received: *received,
                })
            }
            DriverFailure::Overloaded(message) => {
                Some(ExecutionError::Overloaded(message.clone()))
            }
            DriverFailure::ConnectionClosed => Some(ExecutionError::Disconnected),
            DriverFailure::Server { code, message } => Some(ExecutionError::Server {
                code: *code,
                message: message.clone(),
            }),
            DriverFailure::Io(_) => None,
        }
    }
}

/// Apply `translator` to `raw`, falling back to the as-is carrier variant.
pub(crate) fn translate_failure(
    translator: &dyn ErrorTranslator,
    raw: DriverFailure,
) -> ExecutionError {
    match translator.translate(&raw) {
        Some(translated) => translated,
        None => ExecutionError::Driver(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_translated() {
        let raw = DriverFailure::Unavailable {
            required: 2,
            alive: 1,
        };
        let translated = translate_failure(&DefaultTranslator, raw);
        assert!(matches!(
            translated,
            ExecutionError::Unavailable {
                required: 2,
                alive: 1
            }
        ));
    }

    #[test]
    fn test_write_timeout_is_translated() {
        let raw = DriverFailure::WriteTimeout {
            required: 3,
            received: 1,
        };
        let translated = translate_failure(&DefaultTranslator, raw);
        assert!(matches!(translated, ExecutionError::WriteTimedOut { .. }));
    }

    #[test]
    fn test_io_failure_is_left_as_is() {
        let raw = DriverFailure::Io("connection reset".to_string());
        let translated = translate_failure(&DefaultTranslator, raw);
        assert!(matches!(translated, ExecutionError::Driver(_)));
        assert!(translated.to_string().contains("connection reset"));
    }

    #[test]
    fn test_custom_translator_wins() {
        struct Pessimist;
        impl ErrorTranslator for Pessimist {
            fn translate(&self, _raw: &DriverFailure) -> Option<ExecutionError> {
                Some(ExecutionError::Disconnected)
            }
        }

        let raw = DriverFailure::Io("anything".to_string());
        let translated = translate_failure(&Pessimist, raw);
        assert!(matches!(translated, ExecutionError::Disconnected));
    }
}
