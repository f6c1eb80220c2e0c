//! Error taxonomy for the MessagePack engine.

use bytepack_buffers::BufferError;
use thiserror::Error;

/// Failure while encoding a [`crate::Value`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("no extension registered for id {0}")]
    UnknownExtension(i8),
    #[error("length {0} does not fit any 32-bit wire form")]
    LengthOverflow(usize),
}

/// Failure while decoding a MessagePack buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unrecognized tag byte 0x{tag:02x} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,
    #[error("no extension registered for id {0}")]
    UnknownExtension(i8),
}

impl From<BufferError> for DecodeError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => DecodeError::UnexpectedEof,
            BufferError::InvalidUtf8 => DecodeError::InvalidUtf8,
        }
    }
}

/// Failure while mutating an [`crate::ExtensionRegistry`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("extension id {0} is already registered")]
    DuplicateId(i8),
    #[error("extension id {0} is not registered")]
    UnknownId(i8),
}
