//! BIP 340 tagged hashes
//!
//! `tagged_hash(tag, x) = SHA256(SHA256(tag) || SHA256(tag) || x)`
//!
//! Prefixing the tag digest twice fills one SHA256 block, so hashes from
//! different tags can never collide with each other or with untagged SHA256.

use crate::types::Hash;
use sha2::{Digest, Sha256};

/// Tags used by BIP 341
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapTag {
    /// Leaf hash: `leaf_version || compact_size(script) || script`
    TapLeaf,
    /// Interior node: `min(a, b) || max(a, b)`
    TapBranch,
    /// Key tweak: `internal_key || merkle_root?`
    TapTweak,
}

impl TapTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TapTag::TapLeaf => "TapLeaf",
            TapTag::TapBranch => "TapBranch",
            TapTag::TapTweak => "TapTweak",
        }
    }

    /// Start a hasher pre-loaded with this tag's prefix
    pub fn engine(self) -> Sha256 {
        tagged_engine(self.as_str())
    }
}

fn tagged_engine(tag: &str) -> Sha256 {
    let tag_hash = Sha256::digest(tag.as_bytes());
    let mut engine = Sha256::new();
    engine.update(tag_hash);
    engine.update(tag_hash);
    engine
}

/// Compute `SHA256(SHA256(tag) || SHA256(tag) || data)`
pub fn tagged_hash(tag: &str, data: &[u8]) -> Hash {
    let mut engine = tagged_engine(tag);
    engine.update(data);
    engine.finalize().into()
}

/// Tagged hash over several byte slices without concatenating them first
pub fn tap_hash(tag: TapTag, parts: &[&[u8]]) -> Hash {
    let mut engine = tag.engine();
    for part in parts {
        engine.update(part);
    }
    engine.finalize().into()
}
