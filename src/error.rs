//! Error types for replay-middleware.

use thiserror::Error;

/// Main error type for all middleware operations.
#[derive(Debug, Error)]
pub enum MiddlewareError {
    /// I/O error on the input or output stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input line is not valid hex (odd length or non-hex character).
    #[error("Hex decode error: {0}")]
    Decode(#[from] hex::FromHexError),

    /// Decoded envelope has no newline separating metadata from payload.
    #[error("Malformed envelope: no newline between metadata and payload")]
    MalformedEnvelope,

    /// Leading metadata token is not one of the known type codes.
    #[error("Unknown message type: {0:?}")]
    UnknownMessageType(String),

    /// Payload has no `\r\n\r\n` header terminator.
    #[error("Header boundary not found in payload")]
    HeaderBoundaryNotFound,

    /// JSON serialization error (diagnostic sink only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A per-line failure, with the offending input line attached.
    #[error("{source} (line: {line:?})")]
    Line {
        /// The raw input line, terminators stripped.
        line: String,
        /// The stage error.
        #[source]
        source: Box<MiddlewareError>,
    },
}

impl MiddlewareError {
    /// Attach the offending input line to this error.
    ///
    /// An error that already carries a line is returned unchanged.
    pub fn at_line(self, line: impl Into<String>) -> Self {
        match self {
            MiddlewareError::Line { .. } => self,
            other => MiddlewareError::Line {
                line: line.into(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through any attached line.
    pub fn kind(&self) -> &MiddlewareError {
        match self {
            MiddlewareError::Line { source, .. } => source.kind(),
            other => other,
        }
    }

    /// The input line this error was raised for, if attached.
    pub fn line(&self) -> Option<&str> {
        match self {
            MiddlewareError::Line { line, .. } => Some(line),
            _ => None,
        }
    }
}

/// Result type alias using MiddlewareError.
pub type Result<T> = std::result::Result<T, MiddlewareError>;
