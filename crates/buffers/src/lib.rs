//! Byte buffer primitives shared by the bytepack codec crates.
//!
//! [`Writer`] produces big-endian binary output; [`Reader`] walks an
//! immutable input slice with a bounds-checked cursor.

mod error;
mod reader;
mod writer;

pub use error::BufferError;
pub use reader::Reader;
pub use writer::Writer;
