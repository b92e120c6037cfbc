//! Taproot control block (BIP 341)
//!
//! Wire layout, 33 + 32·k bytes with 0 ≤ k ≤ 128:
//!
//! ```text
//! [0]       leaf_version (high 7 bits) | output key parity (low bit)
//! [1..33]   internal x-only public key
//! [33..]    Merkle proof siblings, bottom to top
//! ```
//!
//! Verification recomputes the leaf hash, folds it through the proof, tweaks
//! the internal key with the resulting root and compares against the output
//! key being spent. That comparison is the only proof that the revealed script
//! was committed in the output.

use crate::constants::{
    TAPROOT_CONTROL_BASE_SIZE, TAPROOT_CONTROL_MAX_SIZE, TAPROOT_CONTROL_NODE_SIZE,
    TAPROOT_LEAF_MASK,
};
use crate::error::{Result, TaprootError};
use crate::tree::{compute_proof, compute_root_from_proof, tap_leaf_hash, MerkleProof, ScriptTree};
use crate::tweak::{compute_output_key, verify_output_key};
use crate::types::{Hash, Parity, XOnlyKey};

/// Decoded control block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlBlock {
    pub leaf_version: u8,
    pub output_parity: Parity,
    pub internal_pubkey: XOnlyKey,
    pub merkle_proof: MerkleProof,
}

impl ControlBlock {
    /// Derive the control block for one leaf of a committed tree
    pub fn derive(internal_pubkey: &XOnlyKey, tree: &ScriptTree, leaf_index: usize) -> Result<Self> {
        let merkle_proof = compute_proof(tree, leaf_index)?;
        let leaf_version = tree.leaves()[leaf_index].leaf_version();
        let root = crate::tree::compute_merkle_root(tree);
        let tweaked = compute_output_key(internal_pubkey, Some(&root))?;

        Ok(Self {
            leaf_version,
            output_parity: tweaked.parity,
            internal_pubkey: *internal_pubkey,
            merkle_proof,
        })
    }

    /// Number of proof siblings
    pub fn depth(&self) -> usize {
        self.merkle_proof.len()
    }

    /// Serialized size in bytes
    pub fn size(&self) -> usize {
        TAPROOT_CONTROL_BASE_SIZE + TAPROOT_CONTROL_NODE_SIZE * self.merkle_proof.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        encode(
            &self.internal_pubkey,
            self.leaf_version,
            self.output_parity,
            &self.merkle_proof,
        )
    }

    /// Merkle root committed by this control block for `leaf_script`
    pub fn merkle_root(&self, leaf_script: &[u8]) -> Hash {
        let leaf = tap_leaf_hash(self.leaf_version, leaf_script);
        compute_root_from_proof(leaf, &self.merkle_proof)
    }

    /// Check that `leaf_script` is committed under `(claimed_output_key, claimed_parity)`
    ///
    /// The parity bit carried in the control block must agree with the claim.
    /// Any failure, including an internal key that is not on the curve, yields `false`.
    pub fn verify(
        &self,
        leaf_script: &[u8],
        claimed_output_key: &XOnlyKey,
        claimed_parity: Parity,
    ) -> bool {
        if self.output_parity != claimed_parity {
            return false;
        }
        let root = self.merkle_root(leaf_script);
        verify_output_key(
            &self.internal_pubkey,
            Some(&root),
            claimed_output_key,
            claimed_parity,
        )
        .unwrap_or(false)
    }
}

/// Serialize a control block
pub fn encode(
    internal_pubkey: &XOnlyKey,
    leaf_version: u8,
    output_parity: Parity,
    merkle_proof: &[Hash],
) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(TAPROOT_CONTROL_BASE_SIZE + TAPROOT_CONTROL_NODE_SIZE * merkle_proof.len());
    out.push((leaf_version & TAPROOT_LEAF_MASK) | output_parity.to_u8());
    out.extend_from_slice(internal_pubkey);
    for node in merkle_proof {
        out.extend_from_slice(node);
    }
    out
}

/// Whether `len` is a legal control block size
#[inline]
pub fn is_valid_control_block_size(len: usize) -> bool {
    len >= TAPROOT_CONTROL_BASE_SIZE
        && len <= TAPROOT_CONTROL_MAX_SIZE
        && (len - TAPROOT_CONTROL_BASE_SIZE) % TAPROOT_CONTROL_NODE_SIZE == 0
}

/// Parse a control block; only the length is validated here
pub fn decode(bytes: &[u8]) -> Result<ControlBlock> {
    if !is_valid_control_block_size(bytes.len()) {
        return Err(TaprootError::MalformedControlBlock(bytes.len()));
    }

    let mut internal_pubkey = [0u8; 32];
    internal_pubkey.copy_from_slice(&bytes[1..TAPROOT_CONTROL_BASE_SIZE]);

    let merkle_proof = bytes[TAPROOT_CONTROL_BASE_SIZE..]
        .chunks_exact(TAPROOT_CONTROL_NODE_SIZE)
        .map(|chunk| {
            let mut node = [0u8; 32];
            node.copy_from_slice(chunk);
            node
        })
        .collect();

    Ok(ControlBlock {
        leaf_version: bytes[0] & TAPROOT_LEAF_MASK,
        output_parity: Parity::from_low_bit(bytes[0]),
        internal_pubkey,
        merkle_proof,
    })
}

/// Verify a decoded control block against `leaf_script` and the claimed output key
pub fn verify(
    control_block: &ControlBlock,
    leaf_script: &[u8],
    claimed_output_key: &XOnlyKey,
    claimed_parity: Parity,
) -> bool {
    control_block.verify(leaf_script, claimed_output_key, claimed_parity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScriptLeaf;

    fn h32(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    const HELLO_SCRIPT: &str =
        "a820936a185caaa266bb9cbe981e9e05cb78cd732b0b3280eb944412bb6f8f8f07af8851";
    const HELLO_CONTROL: &str =
        "c150be5fc44ec580c387bf45df275aaa8b27e2d7716af31f10eeed357d126bb4d3";
    const HELLO_OUTPUT: &str = "a46780148be98aaa861ad0b5dfc5c9b935d515c7be8c9e2bc6cedfa594e2b6d9";

    const ABC_INTERNAL: &str = "55adf4e8967fbd2e29f20ac896e60c3b0f1d5b0efa9d34941b5958c7b0a0312d";
    const ABC_OUTPUT: &str = "75169f4001aa68f15bbed28b218df1d0a62cbbcf1188c6665110c293c907b831";
    const ABC_SCRIPTS: [&str; 3] = [
        "2071981521ad9fc9036687364118fb6ccd2035b96a423c59c5430e98310a11abe2ac",
        "20d5094d2dbe9b76e2c245a2b89b6006888952e2faa6a149ae318d69e520617748ac",
        "20c440b462ad48c7a77f94cd4532d8f2119dcebbd7c9764557e62726419b08ad4cac",
    ];
    const ABC_CONTROLS: [&str; 3] = [
        "c155adf4e8967fbd2e29f20ac896e60c3b0f1d5b0efa9d34941b5958c7b0a0312d3cd369a528b326bc9d2133cbd2ac21451acb31681a410434672c8e34fe757e91",
        "c155adf4e8967fbd2e29f20ac896e60c3b0f1d5b0efa9d34941b5958c7b0a0312dd7485025fceb78b9ed667db36ed8b8dc7b1f0b307ac167fa516fe4352b9f4ef7f154e8e8e17c31d3462d7132589ed29353c6fafdb884c5a6e04ea938834f0d9d",
        "c155adf4e8967fbd2e29f20ac896e60c3b0f1d5b0efa9d34941b5958c7b0a0312d737ed1fe30bc42b8022d717b44f0d93516617af64a64753b7a06bf16b26cd711f154e8e8e17c31d3462d7132589ed29353c6fafdb884c5a6e04ea938834f0d9d",
    ];

    fn abc_tree() -> ScriptTree {
        let leaf = |i: usize| ScriptLeaf::tapscript(hex::decode(ABC_SCRIPTS[i]).unwrap());
        ScriptTree::from_depth_first(&[(1, leaf(0)), (2, leaf(1)), (2, leaf(2))]).unwrap()
    }

    #[test]
    fn test_decode_hash_lock_control_block() {
        let bytes = hex::decode(HELLO_CONTROL).unwrap();
        let cb = decode(&bytes).unwrap();
        assert_eq!(cb.leaf_version, 0xc0);
        assert_eq!(cb.output_parity, Parity::Odd);
        assert_eq!(
            cb.internal_pubkey,
            h32("50be5fc44ec580c387bf45df275aaa8b27e2d7716af31f10eeed357d126bb4d3")
        );
        assert!(cb.merkle_proof.is_empty());
        assert_eq!(cb.size(), 33);
        assert_eq!(cb.encode(), bytes);
    }

    #[test]
    fn test_verify_hash_lock_control_block() {
        let cb = decode(&hex::decode(HELLO_CONTROL).unwrap()).unwrap();
        let script = hex::decode(HELLO_SCRIPT).unwrap();
        let output = h32(HELLO_OUTPUT);
        assert!(verify(&cb, &script, &output, Parity::Odd));
        assert!(!verify(&cb, &script, &output, Parity::Even));
    }

    #[test]
    fn test_derive_matches_known_control_blocks() {
        let tree = abc_tree();
        let internal = h32(ABC_INTERNAL);
        for (index, expected) in ABC_CONTROLS.iter().enumerate() {
            let cb = ControlBlock::derive(&internal, &tree, index).unwrap();
            assert_eq!(hex::encode(cb.encode()), *expected);
        }
    }

    #[test]
    fn test_verify_known_control_blocks() {
        let output = h32(ABC_OUTPUT);
        for (script, control) in ABC_SCRIPTS.iter().zip(ABC_CONTROLS.iter()) {
            let cb = decode(&hex::decode(control).unwrap()).unwrap();
            let script = hex::decode(script).unwrap();
            assert!(cb.verify(&script, &output, Parity::Odd));
        }
    }

    #[test]
    fn test_control_block_rejects_other_leaf() {
        // A's control block cannot authorise B's script
        let cb = decode(&hex::decode(ABC_CONTROLS[0]).unwrap()).unwrap();
        let script_b = hex::decode(ABC_SCRIPTS[1]).unwrap();
        assert!(!cb.verify(&script_b, &h32(ABC_OUTPUT), Parity::Odd));
    }

    #[test]
    fn test_derive_invalid_leaf_index() {
        let tree = abc_tree();
        assert_eq!(
            ControlBlock::derive(&h32(ABC_INTERNAL), &tree, 3),
            Err(TaprootError::InvalidLeafIndex {
                index: 3,
                leaf_count: 3
            })
        );
    }

    #[test]
    fn test_decode_malformed_lengths() {
        for len in [0usize, 1, 32, 34, 64, 66, 33 + 32 * 129] {
            assert_eq!(
                decode(&vec![0xc0; len]),
                Err(TaprootError::MalformedControlBlock(len))
            );
        }
    }

    #[test]
    fn test_decode_maximum_depth() {
        let bytes = vec![0xc0; TAPROOT_CONTROL_MAX_SIZE];
        let cb = decode(&bytes).unwrap();
        assert_eq!(cb.depth(), 128);
        assert_eq!(cb.encode(), bytes);
    }

    #[test]
    fn test_encode_masks_leaf_version() {
        let bytes = encode(&[2u8; 32], 0xc1, Parity::Even, &[]);
        assert_eq!(bytes[0], 0xc0);
        let bytes = encode(&[2u8; 32], 0xc0, Parity::Odd, &[[3u8; 32]]);
        assert_eq!(bytes[0], 0xc1);
        assert_eq!(bytes.len(), 65);
        assert_eq!(&bytes[33..], &[3u8; 32]);
    }

    #[test]
    fn test_verify_invalid_internal_key_is_false() {
        let cb = ControlBlock {
            leaf_version: 0xc0,
            output_parity: Parity::Even,
            internal_pubkey: [0xff; 32],
            merkle_proof: vec![],
        };
        assert!(!cb.verify(&[0x51], &h32(HELLO_OUTPUT), Parity::Even));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::tweak::internal_key_from_secret;
    use crate::types::ScriptLeaf;
    use proptest::prelude::*;

    fn well_formed_strategy() -> impl Strategy<Value = Vec<u8>> {
        (0usize..=8).prop_flat_map(|k| {
            prop::collection::vec(any::<u8>(), TAPROOT_CONTROL_BASE_SIZE + TAPROOT_CONTROL_NODE_SIZE * k)
        })
    }

    fn secret_strategy() -> impl Strategy<Value = [u8; 32]> {
        any::<[u8; 32]>()
            .prop_filter("valid secret key", |b| secp256k1::SecretKey::from_slice(b).is_ok())
    }

    fn tree_strategy() -> impl Strategy<Value = ScriptTree> {
        prop::collection::vec(prop::collection::vec(any::<u8>(), 1..30), 1..9).prop_map(|scripts| {
            ScriptTree::balanced(scripts.into_iter().map(ScriptLeaf::tapscript).collect()).unwrap()
        })
    }

    proptest! {
        /// encode(decode(bytes)) == bytes for every well-formed control block
        #[test]
        fn prop_decode_encode_identity(bytes in well_formed_strategy()) {
            let cb = decode(&bytes).unwrap();
            prop_assert_eq!(cb.encode(), bytes);
        }

        /// Honest control blocks verify; a single flipped byte anywhere breaks them
        #[test]
        fn prop_tamper_sensitivity(
            secret in secret_strategy(),
            tree in tree_strategy(),
            pick in any::<prop::sample::Index>(),
            flip in any::<prop::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let internal = internal_key_from_secret(&secret).unwrap();
            let index = pick.index(tree.leaf_count());
            let script = tree.leaves()[index].script().to_vec();
            let root = crate::tree::compute_merkle_root(&tree);
            let output = compute_output_key(&internal, Some(&root)).unwrap();
            let cb = ControlBlock::derive(&internal, &tree, index).unwrap();

            prop_assert!(cb.verify(&script, &output.output_pubkey, output.parity));

            // Flip a byte of the leaf script
            let mut bad_script = script.clone();
            let i = flip.index(bad_script.len());
            bad_script[i] ^= mask;
            prop_assert!(!cb.verify(&bad_script, &output.output_pubkey, output.parity));

            // Flip a byte of the serialized control block (header, key or proof)
            let mut bytes = cb.encode();
            let i = flip.index(bytes.len());
            bytes[i] ^= mask;
            let tampered = decode(&bytes).unwrap();
            prop_assert!(!tampered.verify(&script, &output.output_pubkey, output.parity));
        }
    }
}
