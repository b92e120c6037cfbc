//! Script hash opcodes
//!
//! The hash functions a tapscript hash-lock can commit to. SHA256 goes through
//! `sha2`, RIPEMD160 through `ripemd`, and the composite Bitcoin hashes
//! (HASH160, HASH256) through `bitcoin_hashes`.

use crate::opcodes::{OP_HASH160, OP_HASH256, OP_RIPEMD160, OP_SHA256};
use bitcoin_hashes::{hash160, sha256d, Hash as BitcoinHash};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash function applied by a hash-lock leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// OP_SHA256
    Sha256,
    /// OP_HASH256: SHA256(SHA256(x))
    Hash256,
    /// OP_RIPEMD160
    Ripemd160,
    /// OP_HASH160: RIPEMD160(SHA256(x))
    Hash160,
}

impl HashAlgorithm {
    /// Digest length in bytes
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 | HashAlgorithm::Hash256 => 32,
            HashAlgorithm::Ripemd160 | HashAlgorithm::Hash160 => 20,
        }
    }

    pub fn opcode(self) -> u8 {
        match self {
            HashAlgorithm::Sha256 => OP_SHA256,
            HashAlgorithm::Hash256 => OP_HASH256,
            HashAlgorithm::Ripemd160 => OP_RIPEMD160,
            HashAlgorithm::Hash160 => OP_HASH160,
        }
    }

    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            OP_SHA256 => Some(HashAlgorithm::Sha256),
            OP_HASH256 => Some(HashAlgorithm::Hash256),
            OP_RIPEMD160 => Some(HashAlgorithm::Ripemd160),
            OP_HASH160 => Some(HashAlgorithm::Hash160),
            _ => None,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Hash256 => sha256d::Hash::hash(data).to_byte_array().to_vec(),
            HashAlgorithm::Ripemd160 => Ripemd160::digest(data).to_vec(),
            HashAlgorithm::Hash160 => hash160::Hash::hash(data).to_byte_array().to_vec(),
        }
    }
}
