//! Bitcoin VarInt (CompactSize) encoding/decoding
//!
//! Used as the script length prefix inside the TapLeaf hash and as the item
//! count / item length prefix of a serialized witness stack.
//!
//! Encoding rules:
//! - If value < 0xfd: single byte
//! - If value <= 0xffff: 0xfd prefix + 2 bytes (little-endian)
//! - If value <= 0xffffffff: 0xfe prefix + 4 bytes (little-endian)
//! - Otherwise: 0xff prefix + 8 bytes (little-endian)

use crate::error::{Result, TaprootError};
use std::borrow::Cow;

/// Error type for VarInt decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntError {
    /// Insufficient bytes to decode VarInt
    InsufficientBytes,
    /// Non-minimal encoding (value fits a shorter form)
    NonCanonical,
}

impl std::fmt::Display for VarIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarIntError::InsufficientBytes => write!(f, "Insufficient bytes to decode VarInt"),
            VarIntError::NonCanonical => write!(f, "Non-canonical VarInt encoding"),
        }
    }
}

impl std::error::Error for VarIntError {}

impl From<VarIntError> for TaprootError {
    fn from(err: VarIntError) -> Self {
        TaprootError::Serialization(Cow::Owned(err.to_string()))
    }
}

/// Append the VarInt encoding of `value` to `out`
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Encode a u64 value as a Bitcoin VarInt
///
/// # Examples
///
/// ```
/// use blvm_taproot::serialization::varint::encode_varint;
///
/// assert_eq!(encode_varint(36), vec![0x24]);
/// assert_eq!(encode_varint(253), vec![0xfd, 253, 0]);
/// assert_eq!(encode_varint(65536), vec![0xfe, 0, 0, 1, 0]);
/// ```
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut result = Vec::with_capacity(9);
    write_varint(&mut result, value);
    debug_assert!(matches!(result.len(), 1 | 3 | 5 | 9));
    result
}

/// Decode a Bitcoin VarInt, returning the value and the number of bytes consumed
///
/// Non-minimal encodings are rejected, matching Bitcoin Core's `ReadCompactSize`.
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let first = *data.first().ok_or(VarIntError::InsufficientBytes)?;

    let (width, min) = match first {
        b if b < 0xfd => return Ok((b as u64, 1)),
        0xfd => (2usize, 0xfd_u64),
        0xfe => (4, 0x1_0000),
        _ => (8, 0x1_0000_0000),
    };

    let bytes = data
        .get(1..1 + width)
        .ok_or(VarIntError::InsufficientBytes)?;
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(bytes);
    let value = u64::from_le_bytes(buf);

    if value < min {
        return Err(VarIntError::NonCanonical.into());
    }
    Ok((value, 1 + width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_varint_small() {
        assert_eq!(encode_varint(0), vec![0]);
        assert_eq!(encode_varint(0x24), vec![0x24]);
        assert_eq!(encode_varint(252), vec![252]);
    }

    #[test]
    fn test_encode_varint_medium() {
        assert_eq!(encode_varint(253), vec![0xfd, 253, 0]);
        assert_eq!(encode_varint(256), vec![0xfd, 0, 1]);
        assert_eq!(encode_varint(65535), vec![0xfd, 255, 255]);
    }

    #[test]
    fn test_encode_varint_large() {
        assert_eq!(encode_varint(65536), vec![0xfe, 0, 0, 1, 0]);
        assert_eq!(encode_varint(0xffffffff), vec![0xfe, 255, 255, 255, 255]);
    }

    #[test]
    fn test_encode_varint_huge() {
        assert_eq!(
            encode_varint(0x100000000),
            vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_decode_varint() {
        assert_eq!(decode_varint(&[0x24, 0xaa]), Ok((0x24, 1)));
        assert_eq!(decode_varint(&[0xfd, 253, 0]), Ok((253, 3)));
        assert_eq!(decode_varint(&[0xfe, 0, 0, 1, 0]), Ok((65536, 5)));
        assert_eq!(
            decode_varint(&[0xff, 0, 0, 0, 0, 1, 0, 0, 0]),
            Ok((0x100000000, 9))
        );
    }

    #[test]
    fn test_decode_varint_insufficient_bytes() {
        assert!(decode_varint(&[]).is_err());
        assert!(decode_varint(&[0xfd, 0x01]).is_err());
        assert!(decode_varint(&[0xfe, 0, 0, 1]).is_err());
    }

    #[test]
    fn test_decode_varint_non_canonical() {
        assert_eq!(
            decode_varint(&[0xfd, 0x24, 0x00]),
            Err(VarIntError::NonCanonical.into())
        );
        assert!(decode_varint(&[0xfe, 0xff, 0xff, 0, 0]).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_varint_decodes_what_it_encodes(value in any::<u64>()) {
            let encoded = encode_varint(value);
            let (decoded, consumed) = decode_varint(&encoded).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(consumed, encoded.len());
        }
    }
}
