use thiserror::Error;

/// Failure while reading from a byte buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("invalid utf-8 payload")]
    InvalidUtf8,
}
