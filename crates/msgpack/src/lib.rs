//! MessagePack serialization engine with a pluggable extension-type
//! registry.
//!
//! [`encode`] turns a [`Value`] tree into the compact self-describing
//! MessagePack byte form; [`decode`] reconstructs an equivalent value from
//! a full buffer. User-defined types travel in-band as extension values
//! resolved through an explicit [`ExtensionRegistry`].

mod decoder;
mod encoder;
mod error;
mod registry;
mod util;
mod value;

pub use decoder::MsgPackDecoder;
pub use encoder::MsgPackEncoder;
pub use error::{DecodeError, EncodeError, RegistryError};
pub use registry::{DeserializeFn, ExtensionDescriptor, ExtensionRegistry, SerializeFn};
pub use util::{decode, decode_at, decode_many, encode, encode_many};
pub use value::{Ext, Value};
