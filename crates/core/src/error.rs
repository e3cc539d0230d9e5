// Central Error Type for queue construction and submission

use thiserror::Error;

/// Queue-level error type
///
/// Errors raised by submitted actions never appear here; those are routed
/// to the queue's [`ErrorHandler`](crate::port::ErrorHandler) as
/// [`ActionError`](crate::domain::ActionError).
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Duplicate queue: {0}")]
    DuplicateQueue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using QueueError
pub type Result<T> = std::result::Result<T, QueueError>;
