//! Commit phase: internal key + script tree -> P2TR output
//!
//! A [`TaprootCommitment`] fixes the Merkle root, output key and parity once,
//! then hands out control blocks and spend descriptors for its leaves during
//! the reveal phase.

use crate::constants::{TAPROOT_SCRIPT_LENGTH, XONLY_PUBKEY_SIZE};
use crate::control_block::ControlBlock;
use crate::error::{Result, TaprootError};
use crate::opcodes::{OP_1, OP_PUSHBYTES_32};
use crate::tree::{compute_merkle_root, ScriptTree};
use crate::tweak::compute_output_key;
use crate::types::{ByteString, Hash, Parity, TweakResult, XOnlyKey};
use crate::witness::SpendDescriptor;
use log::trace;

/// Validate Taproot output script: `OP_1 OP_PUSHBYTES_32 <32-byte output key>`
pub fn validate_taproot_script(script: &[u8]) -> bool {
    script.len() == TAPROOT_SCRIPT_LENGTH && script[0] == OP_1 && script[1] == OP_PUSHBYTES_32
}

/// Extract the output key from a P2TR script
pub fn extract_taproot_output_key(script: &[u8]) -> Option<XOnlyKey> {
    if !validate_taproot_script(script) {
        return None;
    }
    let mut output_key = [0u8; XONLY_PUBKEY_SIZE];
    output_key.copy_from_slice(&script[2..TAPROOT_SCRIPT_LENGTH]);
    Some(output_key)
}

/// P2TR script for an output key
pub fn taproot_script_pubkey(output_key: &XOnlyKey) -> ByteString {
    let mut script = Vec::with_capacity(TAPROOT_SCRIPT_LENGTH);
    script.push(OP_1);
    script.push(OP_PUSHBYTES_32);
    script.extend_from_slice(output_key);
    script
}

/// A Taproot output committed to an optional script tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaprootCommitment {
    internal_key: XOnlyKey,
    tree: Option<ScriptTree>,
    merkle_root: Option<Hash>,
    tweaked: TweakResult,
}

impl TaprootCommitment {
    /// Commit `internal_key` to `tree`; `None` gives a key-path-only output
    pub fn new(internal_key: XOnlyKey, tree: Option<ScriptTree>) -> Result<Self> {
        let merkle_root = tree.as_ref().map(compute_merkle_root);
        let tweaked = compute_output_key(&internal_key, merkle_root.as_ref())?;
        trace!(
            "taproot commitment: {} leaves, output key {:02x?} ({:?})",
            tree.as_ref().map_or(0, ScriptTree::leaf_count),
            tweaked.output_pubkey,
            tweaked.parity
        );
        Ok(Self {
            internal_key,
            tree,
            merkle_root,
            tweaked,
        })
    }

    pub fn internal_key(&self) -> &XOnlyKey {
        &self.internal_key
    }

    pub fn tree(&self) -> Option<&ScriptTree> {
        self.tree.as_ref()
    }

    pub fn merkle_root(&self) -> Option<&Hash> {
        self.merkle_root.as_ref()
    }

    pub fn output_key(&self) -> &XOnlyKey {
        &self.tweaked.output_pubkey
    }

    pub fn parity(&self) -> Parity {
        self.tweaked.parity
    }

    pub fn tweak_result(&self) -> TweakResult {
        self.tweaked
    }

    pub fn script_pubkey(&self) -> ByteString {
        taproot_script_pubkey(&self.tweaked.output_pubkey)
    }

    /// Control block for the leaf at `leaf_index`
    pub fn control_block(&self, leaf_index: usize) -> Result<ControlBlock> {
        let tree = self.tree.as_ref().ok_or(TaprootError::InvalidLeafIndex {
            index: leaf_index,
            leaf_count: 0,
        })?;
        ControlBlock::derive(&self.internal_key, tree, leaf_index)
    }

    /// Control block for the first leaf matching `script` and `leaf_version`
    pub fn control_block_for(&self, script: &[u8], leaf_version: u8) -> Option<ControlBlock> {
        let index = self.tree.as_ref()?.find_leaf(script, leaf_version)?;
        self.control_block(index).ok()
    }

    /// Script-path spend of the leaf at `leaf_index` with the given inputs
    pub fn script_path_spend(
        &self,
        leaf_index: usize,
        script_inputs: Vec<ByteString>,
    ) -> Result<SpendDescriptor> {
        let control_block = self.control_block(leaf_index)?;
        let leaf_script = self
            .tree
            .as_ref()
            .and_then(|tree| tree.leaves().get(leaf_index).map(|leaf| leaf.script().to_vec()))
            .ok_or(TaprootError::InvalidLeafIndex {
                index: leaf_index,
                leaf_count: self.tree.as_ref().map_or(0, ScriptTree::leaf_count),
            })?;
        Ok(SpendDescriptor::ScriptPath {
            script_inputs,
            leaf_script,
            control_block: control_block.encode(),
        })
    }
}
