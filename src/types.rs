//! Core Taproot types

use crate::constants::{TAPROOT_LEAF_MASK, TAPROOT_LEAF_TAPSCRIPT, TAPROOT_PARITY_MASK};
use crate::error::{Result, TaprootError};
use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// BIP 340 x-only public key (the y coordinate is implicitly even)
pub type XOnlyKey = [u8; 32];

/// Parity of the y coordinate of a tweaked output key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parity {
    Even = 0,
    Odd = 1,
}

impl Parity {
    /// Parity from the low bit of a byte
    #[inline]
    pub fn from_low_bit(byte: u8) -> Self {
        if byte & TAPROOT_PARITY_MASK != 0 {
            Parity::Odd
        } else {
            Parity::Even
        }
    }

    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl From<secp256k1::Parity> for Parity {
    fn from(parity: secp256k1::Parity) -> Self {
        match parity {
            secp256k1::Parity::Even => Parity::Even,
            secp256k1::Parity::Odd => Parity::Odd,
        }
    }
}

/// Result of tweaking an internal key with a Merkle root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweakResult {
    /// x-only output key placed in the P2TR output
    pub output_pubkey: XOnlyKey,
    /// Parity of the full output point
    pub parity: Parity,
}

/// A leaf script committed into a Taproot script tree
///
/// The leaf version is always even; the low bit of the control block's first
/// byte is reserved for the output key parity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawScriptLeaf")]
pub struct ScriptLeaf {
    script: ByteString,
    leaf_version: u8,
}

#[derive(Deserialize)]
struct RawScriptLeaf {
    script: ByteString,
    leaf_version: u8,
}

impl TryFrom<RawScriptLeaf> for ScriptLeaf {
    type Error = TaprootError;

    fn try_from(raw: RawScriptLeaf) -> Result<Self> {
        ScriptLeaf::new(raw.script, raw.leaf_version)
    }
}

impl ScriptLeaf {
    /// Create a leaf, rejecting odd leaf versions
    pub fn new(script: impl Into<ByteString>, leaf_version: u8) -> Result<Self> {
        if leaf_version & !TAPROOT_LEAF_MASK != 0 {
            return Err(TaprootError::InvalidLeafVersion(leaf_version));
        }
        Ok(Self {
            script: script.into(),
            leaf_version,
        })
    }

    /// Create a BIP 342 tapscript leaf (version 0xc0)
    pub fn tapscript(script: impl Into<ByteString>) -> Self {
        Self {
            script: script.into(),
            leaf_version: TAPROOT_LEAF_TAPSCRIPT,
        }
    }

    #[inline]
    pub fn script(&self) -> &[u8] {
        &self.script
    }

    #[inline]
    pub fn leaf_version(&self) -> u8 {
        self.leaf_version
    }
}
