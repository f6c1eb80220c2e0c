//! Convenience entry points.
//!
//! Each call spins up a fresh encoder/decoder with an empty extension
//! registry; values carrying extension ids fail through these (register
//! descriptors on a shared [`crate::ExtensionRegistry`] and use
//! [`crate::MsgPackEncoder::with_registry`] /
//! [`crate::MsgPackDecoder::with_registry`] instead).

use crate::error::{DecodeError, EncodeError};
use crate::{MsgPackDecoder, MsgPackEncoder, Value};

/// Encodes a single value.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = MsgPackEncoder::new();
    encoder.encode(value)
}

/// Encodes each value in order and concatenates the results.
pub fn encode_many(values: &[Value]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = MsgPackEncoder::new();
    encoder.encode_many(values)
}

/// Decodes one value from the start of `input`; returns the value and the
/// position of the first byte after it.
pub fn decode(input: &[u8]) -> Result<(Value, usize), DecodeError> {
    MsgPackDecoder::new().decode(input)
}

/// Decodes one value starting at `position`.
pub fn decode_at(input: &[u8], position: usize) -> Result<(Value, usize), DecodeError> {
    MsgPackDecoder::new().decode_at(input, position)
}

/// Decodes values back to back until the buffer is exhausted.
pub fn decode_many(input: &[u8]) -> Result<Vec<Value>, DecodeError> {
    MsgPackDecoder::new().decode_many(input)
}
