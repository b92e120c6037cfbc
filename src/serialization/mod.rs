//! Bitcoin wire format helpers
//!
//! Only the pieces Taproot hashing and witness serialization need: the
//! compact-size length prefix. All integers are little-endian.

pub mod varint;

pub use varint::{decode_varint, encode_varint, write_varint, VarIntError};
