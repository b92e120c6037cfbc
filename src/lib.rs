//! # blvm-taproot
//!
//! Taproot commit-reveal engine (BIP 340/341/342).
//!
//! This crate provides the cryptographic core of Taproot outputs: committing a
//! script tree into an output key, proving a revealed leaf belongs to that
//! tree, and assembling and verifying the witness stacks that spend it.
//!
//! ## Architecture
//!
//! The modules build on each other leaf first:
//! - Tagged hashes (`crypto::tagged`)
//! - Script trees and Merkle proofs (`tree`)
//! - Key tweaking (`tweak`)
//! - Control blocks (`control_block`)
//! - Witness assembly (`witness`)
//! - Spend verification (`verifier`), with leaf predicates (`predicate`)
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every operation is deterministic and side-effect-free
//! 2. **Typed Failures**: every error is a distinct [`TaprootError`] variant
//! 3. **Vetted Curve Arithmetic**: all point and scalar operations go through `secp256k1`
//! 4. **No I/O**: UTXO lookup, sighash computation and transaction serialization are external
//!
//! ## Usage
//!
//! ```rust
//! use blvm_taproot::commitment::TaprootCommitment;
//! use blvm_taproot::predicate::hash_lock_script;
//! use blvm_taproot::tree::ScriptTree;
//! use blvm_taproot::types::ScriptLeaf;
//! use blvm_taproot::verifier::verify_spend;
//! use blvm_taproot::witness::build_witness;
//!
//! let internal_key = blvm_taproot::tweak::internal_key_from_secret(&[7u8; 32]).unwrap();
//! let tree = ScriptTree::leaf(ScriptLeaf::tapscript(hash_lock_script(b"helloworld")));
//! let commitment = TaprootCommitment::new(internal_key, Some(tree)).unwrap();
//!
//! let spend = commitment.script_path_spend(0, vec![b"helloworld".to_vec()]).unwrap();
//! let witness = build_witness(&spend).unwrap();
//! assert_eq!(witness.len(), 3);
//! assert!(verify_spend(commitment.output_key(), witness.as_slice()).is_ok());
//! ```

pub mod commitment;
pub mod config;
pub mod constants;
pub mod control_block;
pub mod crypto;
pub mod error;
pub mod opcodes;
pub mod predicate;
pub mod schnorr;
pub mod serialization;
pub mod tree;
pub mod tweak;
pub mod types;
pub mod verifier;
pub mod witness;

pub use commitment::TaprootCommitment;
pub use config::TaprootConfig;
pub use control_block::ControlBlock;
pub use crypto::{tagged_hash, HashAlgorithm};
pub use error::{ErrorKind, Result, TaprootError};
pub use predicate::{ExecutionContext, LeafPredicate};
pub use tree::{MerkleProof, ScriptTree};
pub use types::{Hash, Parity, ScriptLeaf, TweakResult, XOnlyKey};
pub use verifier::{SpendVerifier, VerifiedSpend, VerifierState};
pub use witness::{SpendDescriptor, WitnessStack};

/// Entry point bundling a configuration with the main operations
#[derive(Debug, Clone, Default)]
pub struct TaprootEngine {
    config: TaprootConfig,
}

impl TaprootEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a validated configuration
    pub fn with_config(config: TaprootConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TaprootConfig {
        &self.config
    }

    /// Commit an internal key to an optional script tree
    pub fn commit(&self, internal_key: XOnlyKey, tree: Option<ScriptTree>) -> Result<TaprootCommitment> {
        TaprootCommitment::new(internal_key, tree)
    }

    /// Compile predicates into leaves using the configured leaf version
    pub fn leaves_for(&self, predicates: &[LeafPredicate]) -> Result<Vec<ScriptLeaf>> {
        predicates
            .iter()
            .map(|p| p.to_leaf(self.config.witness.default_leaf_version))
            .collect()
    }

    /// Assemble the witness for a spend
    pub fn build_witness(&self, spend: &SpendDescriptor) -> Result<WitnessStack> {
        witness::build_witness_with(spend, &self.config)
    }

    /// Verify a script-path spend
    pub fn verify_script_path(
        &self,
        output_key: &XOnlyKey,
        witness: &[types::ByteString],
        sighash: Option<Hash>,
    ) -> Result<VerifiedSpend> {
        let verifier = SpendVerifier::new(&self.config);
        match sighash {
            Some(sighash) => verifier.with_sighash(sighash).verify(output_key, witness),
            None => verifier.verify(output_key, witness),
        }
    }

    /// Verify a key-path spend
    pub fn verify_key_path(
        &self,
        output_key: &XOnlyKey,
        witness: &[types::ByteString],
        sighash: &Hash,
    ) -> Result<()> {
        if let [signature] = witness {
            schnorr::check_signature_length(signature.len(), self.config.witness.allow_sighash_suffix)?;
        }
        schnorr::verify_key_path(output_key, witness, sighash)
    }
}
