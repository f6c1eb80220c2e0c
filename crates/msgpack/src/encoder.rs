//! MessagePack encoder.

use std::sync::Arc;

use bytepack_buffers::Writer;

use crate::error::EncodeError;
use crate::registry::ExtensionRegistry;
use crate::value::{Ext, Value};

/// Encodes [`Value`] trees into MessagePack bytes.
///
/// Every value is written in its narrowest wire form. Output is
/// all-or-nothing: bytes are surfaced only after the whole value (or, for
/// [`encode_many`], every value) encoded successfully.
///
/// [`encode_many`]: MsgPackEncoder::encode_many
pub struct MsgPackEncoder {
    pub writer: Writer,
    registry: Arc<ExtensionRegistry>,
}

impl Default for MsgPackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgPackEncoder {
    /// Creates an encoder with an empty extension registry.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ExtensionRegistry::new()))
    }

    /// Creates an encoder that resolves extension ids through `registry`.
    pub fn with_registry(registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            writer: Writer::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.writer.reset();
        self.write_any(value)?;
        Ok(self.writer.flush())
    }

    /// Encodes each value in argument order and concatenates the results.
    pub fn encode_many(&mut self, values: &[Value]) -> Result<Vec<u8>, EncodeError> {
        self.writer.reset();
        for value in values {
            self.write_any(value)?;
        }
        Ok(self.writer.flush())
    }

    pub fn write_any(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Nil => {
                self.writer.u8(0xc0);
                Ok(())
            }
            Value::Bool(b) => {
                self.writer.u8(if *b { 0xc3 } else { 0xc2 });
                Ok(())
            }
            Value::Int(n) => {
                self.write_int(*n);
                Ok(())
            }
            Value::UInt(n) => {
                self.write_uint(*n);
                Ok(())
            }
            Value::Float(f) => {
                self.write_float(*f);
                Ok(())
            }
            Value::Str(s) => self.write_str(s),
            Value::Bin(b) => self.write_bin(b),
            Value::Array(items) => self.write_array(items),
            Value::Map(pairs) => self.write_map(pairs),
            Value::Ext(ext) => self.write_ext(ext),
        }
    }

    /// Signed integer in the narrowest form covering sign and magnitude.
    pub fn write_int(&mut self, n: i64) {
        if n >= 0 {
            self.write_uint(n as u64);
        } else if n >= -0x20 {
            // negative fixint: 0xe0..0xff is the value's two's complement
            self.writer.u8(n as u8);
        } else if n >= i8::MIN as i64 {
            self.writer.u16(0xd000 | (n as u8 as u16));
        } else if n >= i16::MIN as i64 {
            self.writer.u8(0xd1);
            self.writer.i16(n as i16);
        } else if n >= i32::MIN as i64 {
            self.writer.u8(0xd2);
            self.writer.i32(n as i32);
        } else {
            self.writer.u8(0xd3);
            self.writer.i64(n);
        }
    }

    /// Non-negative integer in the narrowest form.
    pub fn write_uint(&mut self, n: u64) {
        if n <= 0x7f {
            self.writer.u8(n as u8);
        } else if n <= 0xff {
            self.writer.u16(0xcc00 | n as u16);
        } else if n <= 0xffff {
            self.writer.u8u16(0xcd, n as u16);
        } else if n <= 0xffff_ffff {
            self.writer.u8u32(0xce, n as u32);
        } else {
            self.writer.u8u64(0xcf, n);
        }
    }

    /// float32 when the value survives the narrowing exactly, else float64.
    pub fn write_float(&mut self, f: f64) {
        let narrow = f as f32;
        if f64::from(narrow) == f {
            self.writer.u8f32(0xca, narrow);
        } else {
            self.writer.u8f64(0xcb, f);
        }
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        self.write_str_header(s.len())?;
        self.writer.utf8(s);
        Ok(())
    }

    pub fn write_str_header(&mut self, len: usize) -> Result<(), EncodeError> {
        if len <= 0x1f {
            self.writer.u8(0xa0 | len as u8);
        } else if len <= 0xff {
            self.writer.u16(0xd900 | len as u16);
        } else if len <= 0xffff {
            self.writer.u8u16(0xda, len as u16);
        } else if let Ok(len) = u32::try_from(len) {
            self.writer.u8u32(0xdb, len);
        } else {
            return Err(EncodeError::LengthOverflow(len));
        }
        Ok(())
    }

    pub fn write_bin(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.write_bin_header(bytes.len())?;
        self.writer.buf(bytes);
        Ok(())
    }

    pub fn write_bin_header(&mut self, len: usize) -> Result<(), EncodeError> {
        if len <= 0xff {
            self.writer.u16(0xc400 | len as u16);
        } else if len <= 0xffff {
            self.writer.u8u16(0xc5, len as u16);
        } else if let Ok(len) = u32::try_from(len) {
            self.writer.u8u32(0xc6, len);
        } else {
            return Err(EncodeError::LengthOverflow(len));
        }
        Ok(())
    }

    pub fn write_array(&mut self, items: &[Value]) -> Result<(), EncodeError> {
        self.write_array_header(items.len())?;
        for item in items {
            self.write_any(item)?;
        }
        Ok(())
    }

    pub fn write_array_header(&mut self, len: usize) -> Result<(), EncodeError> {
        if len <= 0xf {
            self.writer.u8(0x90 | len as u8);
        } else if len <= 0xffff {
            self.writer.u8u16(0xdc, len as u16);
        } else if let Ok(len) = u32::try_from(len) {
            self.writer.u8u32(0xdd, len);
        } else {
            return Err(EncodeError::LengthOverflow(len));
        }
        Ok(())
    }

    pub fn write_map(&mut self, pairs: &[(Value, Value)]) -> Result<(), EncodeError> {
        self.write_map_header(pairs.len())?;
        for (key, val) in pairs {
            self.write_any(key)?;
            self.write_any(val)?;
        }
        Ok(())
    }

    pub fn write_map_header(&mut self, len: usize) -> Result<(), EncodeError> {
        if len <= 0xf {
            self.writer.u8(0x80 | len as u8);
        } else if len <= 0xffff {
            self.writer.u8u16(0xde, len as u16);
        } else if let Ok(len) = u32::try_from(len) {
            self.writer.u8u32(0xdf, len);
        } else {
            return Err(EncodeError::LengthOverflow(len));
        }
        Ok(())
    }

    pub fn write_ext(&mut self, ext: &Ext) -> Result<(), EncodeError> {
        let descriptor = self
            .registry
            .get(ext.id)
            .ok_or(EncodeError::UnknownExtension(ext.id))?;
        let payload = descriptor.serialize(&ext.val);
        self.write_ext_header(ext.id, payload.len())?;
        self.writer.buf(&payload);
        Ok(())
    }

    /// fixext for the exact widths 1/2/4/8/16, ext8/16/32 otherwise.
    pub fn write_ext_header(&mut self, id: i8, len: usize) -> Result<(), EncodeError> {
        match len {
            1 => self.writer.u16(0xd400 | (id as u8 as u16)),
            2 => self.writer.u16(0xd500 | (id as u8 as u16)),
            4 => self.writer.u16(0xd600 | (id as u8 as u16)),
            8 => self.writer.u16(0xd700 | (id as u8 as u16)),
            16 => self.writer.u16(0xd800 | (id as u8 as u16)),
            _ => {
                if len <= 0xff {
                    self.writer.u16(0xc700 | len as u16);
                } else if len <= 0xffff {
                    self.writer.u8u16(0xc8, len as u16);
                } else if let Ok(len32) = u32::try_from(len) {
                    self.writer.u8u32(0xc9, len32);
                } else {
                    return Err(EncodeError::LengthOverflow(len));
                }
                self.writer.i8(id);
            }
        }
        Ok(())
    }
}
