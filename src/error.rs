use thiserror::Error;

use crate::layer::LayerId;

/// Errors produced by canvas editing and file operations
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A pixel coordinate fell outside the buffer. Tools clip before writing,
    /// so this only surfaces from direct buffer access.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Malformed or version-mismatched project/image data
    #[error("corrupt file: {0}")]
    CorruptFile(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("no layer with id {0}")]
    UnknownLayer(LayerId),

    #[error("cannot remove the last remaining layer")]
    LastLayer,

    #[error("operation cancelled")]
    Cancelled,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for canvas operations
pub type CanvasResult<T> = Result<T, CanvasError>;

impl CanvasError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptFile(reason.into())
    }
}
