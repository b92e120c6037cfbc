//! Hash primitives for Taproot
//!
//! - [`tagged`]: BIP 340 domain-separated hashing (`TapLeaf`, `TapBranch`, `TapTweak`)
//! - [`hash_ops`]: the script hash opcodes a leaf predicate can commit to

pub mod hash_ops;
pub mod tagged;

pub use hash_ops::HashAlgorithm;
pub use tagged::{tagged_hash, TapTag};
