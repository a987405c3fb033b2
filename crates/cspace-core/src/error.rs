//! Error types for cspace

use thiserror::Error;

/// Result type for cspace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, installing or remapping color spaces
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed construction arguments or an unsuitable operand
    #[error("Range check: {0}")]
    RangeCheck(String),

    /// Storage for colorant names or tables could not be reserved
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// The operation is not available for this object (e.g. serializing a callback)
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// A color space has no concrete form
    #[error("Undefined: {0}")]
    Undefined(String),

    /// The output device reported a failure
    #[error("Device error: {0}")]
    Device(String),

    /// Profile lookup or creation failed
    #[error("Profile error: {0}")]
    Profile(String),

    /// Transform creation or execution failed
    #[error("Transform error: {0}")]
    Transform(String),

    /// I/O error while serializing or deserializing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn range(msg: impl Into<String>) -> Self {
        Self::RangeCheck(msg.into())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(e: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory(e.to_string())
    }
}
