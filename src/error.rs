//! Error types and handling for the `WorkToHome` application

use thiserror::Error;

/// Main error type for the `WorkToHome` application
#[derive(Error, Debug)]
pub enum WorkToHomeError {
    /// A work or listing coordinate needed for a commute is unset
    #[error("Missing location: {what}")]
    MissingLocation { what: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A referenced record does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// The request collides with an existing record
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// No valid credentials were presented
    #[error("Unauthorized")]
    Unauthorized,

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Storage backend errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WorkToHomeError {
    /// Create a new missing location error
    pub fn missing_location<S: Into<String>>(what: S) -> Self {
        Self::MissingLocation { what: what.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a new conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WorkToHomeError::MissingLocation { what } => what.clone(),
            WorkToHomeError::Validation { message } | WorkToHomeError::Conflict { message } => {
                message.clone()
            }
            WorkToHomeError::NotFound { what } => format!("{what} not found"),
            WorkToHomeError::Unauthorized => "Missing or invalid access token".to_string(),
            WorkToHomeError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WorkToHomeError::Storage { .. } | WorkToHomeError::Io { .. } => {
                "Internal storage failure. Please try again later.".to_string()
            }
        }
    }
}

impl From<fjall::Error> for WorkToHomeError {
    fn from(err: fjall::Error) -> Self {
        WorkToHomeError::storage(err.to_string())
    }
}

impl From<postcard::Error> for WorkToHomeError {
    fn from(err: postcard::Error) -> Self {
        WorkToHomeError::storage(format!("corrupt record: {err}"))
    }
}

impl From<tokio::task::JoinError> for WorkToHomeError {
    fn from(err: tokio::task::JoinError) -> Self {
        WorkToHomeError::storage(format!("storage task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WorkToHomeError::missing_location("Work location not set");
        assert!(matches!(err, WorkToHomeError::MissingLocation { .. }));

        let err = WorkToHomeError::not_found("Housing");
        assert!(matches!(err, WorkToHomeError::NotFound { .. }));
        assert_eq!(err.to_string(), "Housing not found");

        let err = WorkToHomeError::validation("invalid coordinates");
        assert!(matches!(err, WorkToHomeError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let err = WorkToHomeError::missing_location("Work location not set");
        assert_eq!(err.user_message(), "Work location not set");

        let err = WorkToHomeError::config("test");
        assert!(err.user_message().contains("Configuration error"));

        let err = WorkToHomeError::storage("disk on fire");
        assert!(!err.user_message().contains("disk on fire"));

        let err = WorkToHomeError::conflict("Already in favorites");
        assert_eq!(err.user_message(), "Already in favorites");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WorkToHomeError = io_err.into();
        assert!(matches!(err, WorkToHomeError::Io { .. }));
    }
}
