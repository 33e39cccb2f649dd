//! Error types for reconciliation.

use thiserror::Error;

/// Errors that abort a reconciliation.
#[derive(Debug, Error)]
pub enum Error {
    /// A call to IAM failed
    #[error(transparent)]
    Aws(#[from] awskit::Error),

    /// The managed policy list mixes the empty-string sentinel with ARNs
    #[error("managed policy list cannot mix an empty entry with policy ARNs: {0:?}")]
    InvalidPolicySelection(Vec<String>),

    /// The user name is empty
    #[error("user name must not be empty")]
    InvalidName,

    /// The user path is not of the form `/` or `/a/b/`
    #[error("path must begin and end with '/': {0}")]
    InvalidPath(String),

    /// IAM reported a condition this action cannot tolerate
    #[error("cannot {action}: {condition}")]
    Unexpected { action: String, condition: String },
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;
