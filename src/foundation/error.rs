/// Convenience result type used across chronoecho.
pub type EchoResult<T> = Result<T, EchoError>;

/// Top-level error taxonomy.
///
/// Contract violations surface as [`EchoError::Validation`]; a missing frame from a source is not
/// an error at all (see [`crate::FrameSource::next_frame`]).
#[derive(thiserror::Error, Debug)]
pub enum EchoError {
    /// Invalid caller-provided dimensions, buffers or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame source failed (device gone, decoder crashed, truncated stream).
    #[error("source error: {0}")]
    Source(String),

    /// Errors while rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while writing frames to a sink.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EchoError {
    /// Build an [`EchoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`EchoError::Source`] value.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Build an [`EchoError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`EchoError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`EchoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
