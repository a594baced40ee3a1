use alloc::string::String;
use enough::StopReason;

/// Errors from PICT decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PictError {
    /// The header's version marker is missing or malformed.
    #[error("not a PICT file: {0}")]
    WrongSignature(String),

    /// A well-formed picture this decoder can't produce a raster for
    /// (vector-only picture, unknown QuickTime codec, JPEG support off).
    #[error("unsupported PICT content: {0}")]
    FormatNotSupported(String),

    /// Structurally invalid PICT data (unknown opcode, bad pattern type,
    /// bad bit depth, palette index out of range).
    #[error("invalid PICT data: {0}")]
    FormatUnknown(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("pixel layout mismatch: expected {expected:?}, got {actual:?}")]
    LayoutMismatch {
        expected: crate::PixelLayout,
        actual: crate::PixelLayout,
    },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for PictError {
    fn from(r: StopReason) -> Self {
        PictError::Cancelled(r)
    }
}
