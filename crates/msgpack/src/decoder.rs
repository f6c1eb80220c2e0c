//! MessagePack decoder.

use std::sync::Arc;

use bytepack_buffers::Reader;

use crate::error::DecodeError;
use crate::registry::ExtensionRegistry;
use crate::value::Value;

/// Decodes MessagePack bytes into [`Value`] trees.
///
/// Decoding requires the full buffer up front; every read is bounds-checked
/// and a truncated or adversarial length field fails with
/// [`DecodeError::UnexpectedEof`] instead of reading past the end.
pub struct MsgPackDecoder {
    registry: Arc<ExtensionRegistry>,
}

impl Default for MsgPackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgPackDecoder {
    /// Creates a decoder with an empty extension registry.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ExtensionRegistry::new()))
    }

    /// Creates a decoder that resolves extension ids through `registry`.
    pub fn with_registry(registry: Arc<ExtensionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    /// Decodes one value from the start of `input`. Returns the value and
    /// the position of the first byte after it.
    pub fn decode(&self, input: &[u8]) -> Result<(Value, usize), DecodeError> {
        self.decode_at(input, 0)
    }

    /// Decodes one value starting at `position`.
    pub fn decode_at(&self, input: &[u8], position: usize) -> Result<(Value, usize), DecodeError> {
        if position > input.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let mut reader = Reader::at(input, position);
        let value = self.read_any(&mut reader)?;
        Ok((value, reader.x))
    }

    /// Decodes values back to back until the buffer is exhausted.
    /// All-or-nothing: one bad value fails the whole call.
    pub fn decode_many(&self, input: &[u8]) -> Result<Vec<Value>, DecodeError> {
        let mut reader = Reader::new(input);
        let mut values = Vec::new();
        while reader.remaining() > 0 {
            values.push(self.read_any(&mut reader)?);
        }
        Ok(values)
    }

    pub fn read_any(&self, reader: &mut Reader<'_>) -> Result<Value, DecodeError> {
        let offset = reader.x;
        let tag = reader.u8()?;

        // positive fixint: 0x00-0x7f
        if tag <= 0x7f {
            return Ok(Value::Int(tag as i64));
        }
        // negative fixint: 0xe0-0xff
        if tag >= 0xe0 {
            return Ok(Value::Int(tag as i8 as i64));
        }
        // fixmap: 0x80-0x8f
        if (0x80..=0x8f).contains(&tag) {
            return self.read_map(reader, (tag & 0x0f) as usize);
        }
        // fixarray: 0x90-0x9f
        if (0x90..=0x9f).contains(&tag) {
            return self.read_array(reader, (tag & 0x0f) as usize);
        }
        // fixstr: 0xa0-0xbf
        if (0xa0..=0xbf).contains(&tag) {
            let len = (tag & 0x1f) as usize;
            return Ok(Value::Str(reader.utf8(len)?.to_owned()));
        }

        match tag {
            0xc0 => Ok(Value::Nil),
            0xc2 => Ok(Value::Bool(false)),
            0xc3 => Ok(Value::Bool(true)),
            // bin8, bin16, bin32
            0xc4 => {
                let n = reader.u8()? as usize;
                Ok(Value::Bin(reader.buf(n)?.to_vec()))
            }
            0xc5 => {
                let n = reader.u16()? as usize;
                Ok(Value::Bin(reader.buf(n)?.to_vec()))
            }
            0xc6 => {
                let n = reader.u32()? as usize;
                Ok(Value::Bin(reader.buf(n)?.to_vec()))
            }
            // ext8, ext16, ext32
            0xc7 => {
                let n = reader.u8()? as usize;
                self.read_ext(reader, n)
            }
            0xc8 => {
                let n = reader.u16()? as usize;
                self.read_ext(reader, n)
            }
            0xc9 => {
                let n = reader.u32()? as usize;
                self.read_ext(reader, n)
            }
            // float32, float64
            0xca => Ok(Value::Float(reader.f32()? as f64)),
            0xcb => Ok(Value::Float(reader.f64()?)),
            // uint8, uint16, uint32, uint64
            0xcc => Ok(Value::Int(reader.u8()? as i64)),
            0xcd => Ok(Value::Int(reader.u16()? as i64)),
            0xce => Ok(Value::Int(reader.u32()? as i64)),
            0xcf => {
                let n = reader.u64()?;
                Ok(match i64::try_from(n) {
                    Ok(n) => Value::Int(n),
                    Err(_) => Value::UInt(n),
                })
            }
            // int8, int16, int32, int64
            0xd0 => Ok(Value::Int(reader.i8()? as i64)),
            0xd1 => Ok(Value::Int(reader.i16()? as i64)),
            0xd2 => Ok(Value::Int(reader.i32()? as i64)),
            0xd3 => Ok(Value::Int(reader.i64()?)),
            // fixext1, fixext2, fixext4, fixext8, fixext16
            0xd4 => self.read_ext(reader, 1),
            0xd5 => self.read_ext(reader, 2),
            0xd6 => self.read_ext(reader, 4),
            0xd7 => self.read_ext(reader, 8),
            0xd8 => self.read_ext(reader, 16),
            // str8, str16, str32
            0xd9 => {
                let n = reader.u8()? as usize;
                Ok(Value::Str(reader.utf8(n)?.to_owned()))
            }
            0xda => {
                let n = reader.u16()? as usize;
                Ok(Value::Str(reader.utf8(n)?.to_owned()))
            }
            0xdb => {
                let n = reader.u32()? as usize;
                Ok(Value::Str(reader.utf8(n)?.to_owned()))
            }
            // array16, array32
            0xdc => {
                let n = reader.u16()? as usize;
                self.read_array(reader, n)
            }
            0xdd => {
                let n = reader.u32()? as usize;
                self.read_array(reader, n)
            }
            // map16, map32
            0xde => {
                let n = reader.u16()? as usize;
                self.read_map(reader, n)
            }
            0xdf => {
                let n = reader.u32()? as usize;
                self.read_map(reader, n)
            }
            // only 0xc1 reaches here
            _ => Err(DecodeError::InvalidTag { tag, offset }),
        }
    }

    fn read_array(&self, reader: &mut Reader<'_>, count: usize) -> Result<Value, DecodeError> {
        // every element occupies at least one byte, so a declared count
        // can't honestly exceed the remaining input
        let mut items = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            items.push(self.read_any(reader)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&self, reader: &mut Reader<'_>, count: usize) -> Result<Value, DecodeError> {
        let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(count.min(reader.remaining() / 2));
        for _ in 0..count {
            let key = self.read_any(reader)?;
            let val = self.read_any(reader)?;
            // later duplicate keys overwrite earlier ones
            match pairs.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = val,
                None => pairs.push((key, val)),
            }
        }
        Ok(Value::Map(pairs))
    }

    fn read_ext(&self, reader: &mut Reader<'_>, size: usize) -> Result<Value, DecodeError> {
        let id = reader.i8()?;
        let payload = reader.buf(size)?;
        let descriptor = self
            .registry
            .get(id)
            .ok_or(DecodeError::UnknownExtension(id))?;
        Ok(descriptor.deserialize(payload))
    }
}
