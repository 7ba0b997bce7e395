// Typed errors with thiserror. Surface meaningful messages to JS.

use thiserror::Error;

/// Tracker error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lesson progress service error in {operation}: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },

    #[error("Player session has been disposed")]
    Disposed,
}

impl TrackerError {
    pub fn service(operation: &'static str, message: impl Into<String>) -> Self {
        TrackerError::Service {
            operation,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TrackerError::InvalidConfig("missing lesson_id".to_string());
        assert!(err.to_string().contains("missing lesson_id"));
    }

    #[test]
    fn service_error_names_operation() {
        let err = TrackerError::service("complete_lesson", "HTTP 500");
        assert_eq!(
            err.to_string(),
            "Lesson progress service error in complete_lesson: HTTP 500"
        );
    }

    #[test]
    fn serde_errors_convert() {
        let err: TrackerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, TrackerError::Serialization(_)));
    }
}
