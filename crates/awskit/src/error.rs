//! Error types for AWS operations.
//!
//! Errors are categorized so callers can tell expected conditions
//! (an entity that is missing or already there) apart from fatal ones.
//! The message of a fatal error is the service's own message, unmodified.

use thiserror::Error;

/// Categories of AWS errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The addressed entity does not exist
    NotFound,
    /// The entity being created already exists
    AlreadyExists,
    /// The request was malformed or rejected as invalid
    Validation,
    /// Any other client, service or network failure
    Transport,
    /// Local failures (runtime, missing configuration, odd responses)
    Other,
}

impl ErrorCategory {
    /// Whether this category signals a state rather than a failure.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NotFound | Self::AlreadyExists)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Entity not found",
            Self::AlreadyExists => "Entity already exists",
            Self::Validation => "Invalid request",
            Self::Transport => "Request failed",
            Self::Other => "Unexpected error",
        }
    }
}

/// Errors that can occur while talking to IAM or ECS.
#[derive(Debug, Error)]
pub enum Error {
    /// The entity addressed by the operation does not exist
    #[error("{message}")]
    NotFound {
        /// Operation that failed (e.g. `GetUser`)
        operation: &'static str,
        /// Message from the service
        message: String,
    },

    /// The entity being created already exists
    #[error("{message}")]
    AlreadyExists {
        /// Operation that failed
        operation: &'static str,
        /// Message from the service
        message: String,
    },

    /// Malformed request parameters
    #[error("{message}")]
    Validation {
        /// Operation that failed
        operation: &'static str,
        /// Message from the service or the request builder
        message: String,
    },

    /// Any other client or network failure
    #[error("{message}")]
    Transport {
        /// Operation that failed
        operation: &'static str,
        /// Service error code, when the service sent one
        code: Option<String>,
        /// Message from the service or transport
        message: String,
    },

    /// A response lacked a field the operation depends on
    #[error("{operation}: response is missing {field}")]
    MalformedResponse {
        /// Operation whose response was incomplete
        operation: &'static str,
        /// Name of the missing field
        field: &'static str,
    },

    /// No region could be resolved from flags, config or the environment
    #[error("region must be specified")]
    MissingRegion,

    /// The async runtime backing the SDK could not be started
    #[error("failed to start AWS runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::AlreadyExists { .. } => ErrorCategory::AlreadyExists,
            Error::Validation { .. } => ErrorCategory::Validation,
            Error::Transport { .. } => ErrorCategory::Transport,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error signals a state rather than a failure.
    pub fn is_expected(&self) -> bool {
        self.category().is_expected()
    }

    /// The operation that produced this error, if it came from a call.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Error::NotFound { operation, .. }
            | Error::AlreadyExists { operation, .. }
            | Error::Validation { operation, .. }
            | Error::Transport { operation, .. }
            | Error::MalformedResponse { operation, .. } => Some(operation),
            Error::MissingRegion | Error::Runtime(_) => None,
        }
    }

    /// Create an error from an AWS error code.
    ///
    /// IAM and ECS spell their conditions differently; both spellings
    /// map onto the same category.
    pub fn from_code(operation: &'static str, code: Option<&str>, message: String) -> Self {
        match code {
            Some("NoSuchEntity" | "NoSuchEntityException" | "ResourceNotFoundException") => {
                Error::NotFound { operation, message }
            }
            Some("EntityAlreadyExists" | "EntityAlreadyExistsException") => {
                Error::AlreadyExists { operation, message }
            }
            Some(
                "ValidationError"
                | "ValidationException"
                | "InvalidInput"
                | "InvalidParameterException"
                | "MalformedPolicyDocument",
            ) => Error::Validation { operation, message },
            other => Error::Transport {
                operation,
                code: other.map(str::to_string),
                message,
            },
        }
    }
}

/// Result type for AWS operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_expected() {
        assert!(ErrorCategory::NotFound.is_expected());
        assert!(ErrorCategory::AlreadyExists.is_expected());
        assert!(!ErrorCategory::Validation.is_expected());
        assert!(!ErrorCategory::Transport.is_expected());
    }

    #[test]
    fn test_from_code_not_found() {
        let err = Error::from_code("GetUser", Some("NoSuchEntity"), "no user".into());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.is_expected());
        assert_eq!(err.operation(), Some("GetUser"));
    }

    #[test]
    fn test_from_code_already_exists() {
        let err = Error::from_code(
            "CreateInstanceProfile",
            Some("EntityAlreadyExists"),
            "exists".into(),
        );
        assert_eq!(err.category(), ErrorCategory::AlreadyExists);
    }

    #[test]
    fn test_from_code_validation() {
        let err = Error::from_code(
            "ListTaskDefinitions",
            Some("InvalidParameterException"),
            "bad status".into(),
        );
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_expected());
    }

    #[test]
    fn test_from_code_unknown_is_transport() {
        let err = Error::from_code("DeleteUser", Some("DeleteConflict"), "attached".into());
        match &err {
            Error::Transport { code, .. } => assert_eq!(code.as_deref(), Some("DeleteConflict")),
            other => panic!("expected transport error, got {other:?}"),
        }

        let err = Error::from_code("GetUser", None, "connection reset".into());
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_message_is_verbatim() {
        let err = Error::from_code(
            "DescribeTaskDefinition",
            Some("ClientException"),
            "Unable to describe task definition.".into(),
        );
        assert_eq!(err.to_string(), "Unable to describe task definition.");
    }
}
