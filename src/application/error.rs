// Channel error types
use thiserror::Error;

/// Failures on either the push or the pull channel.
///
/// None of these are fatal: the coordinator turns them into health state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChannelError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Connection closed")]
    Closed,
}
