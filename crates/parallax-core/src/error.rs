//! Error types for the tracking and projection core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A landmark datagram could not be decoded.
    #[error("malformed landmark frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// A tuning value is outside the range the math can handle.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
