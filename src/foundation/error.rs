/// Convenience result type used across Toonletter.
pub type ToonletterResult<T> = Result<T, ToonletterError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Geometry constraint violations are deliberately absent: attempted moves or
/// resizes past a boundary are clamped, never reported.
#[derive(thiserror::Error, Debug)]
pub enum ToonletterError {
    /// Malformed or truncated document bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failure while writing a document back to bytes.
    #[error("encode error: {0}")]
    Encode(String),

    /// A message failed the structural/signature check. This is a
    /// programming-error class and indicates a version mismatch between the
    /// interactive side and the worker.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid user-provided or session data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while rasterizing a balloon surface.
    #[error("raster error: {0}")]
    Raster(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToonletterError {
    /// Build a [`ToonletterError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ToonletterError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ToonletterError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a [`ToonletterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ToonletterError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
