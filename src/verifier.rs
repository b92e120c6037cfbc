//! Script-path spend verification
//!
//! A witness is checked in a fixed sequence of states:
//!
//! ```text
//! ParseWitness -> ExtractControlBlock -> RecomputeMerkleProof
//!              -> VerifyOutputKey -> ExecuteLeafScript -> Accept
//! ```
//!
//! Any failing state moves straight to `Reject` with the error of that state:
//! `MalformedWitness` while parsing, `BadControlBlock` while extracting the
//! control block or checking the output key, and `ScriptExecutionFailed` while
//! running the leaf predicate. A spend is accepted only if the leaf is proven
//! to be committed in the output key *and* its predicate is satisfied.

use crate::config::TaprootConfig;
use crate::control_block::{self, ControlBlock};
use crate::constants::TAPROOT_LEAF_TAPSCRIPT;
use crate::error::{Result, TaprootError};
use crate::predicate::{ExecutionContext, LeafPredicate};
use crate::tree::{compute_root_from_proof, tap_leaf_hash};
use crate::tweak::verify_output_key;
use crate::types::{ByteString, Hash, XOnlyKey};
use crate::witness::split_script_path;
use log::{debug, trace};

/// States of the spend verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifierState {
    ParseWitness,
    ExtractControlBlock,
    RecomputeMerkleProof,
    VerifyOutputKey,
    ExecuteLeafScript,
    Accept,
    Reject,
}

impl VerifierState {
    pub fn is_terminal(self) -> bool {
        matches!(self, VerifierState::Accept | VerifierState::Reject)
    }
}

/// Everything learned from an accepted script-path spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSpend {
    pub control_block: ControlBlock,
    pub leaf_script: ByteString,
    pub leaf_hash: Hash,
    pub merkle_root: Hash,
    pub predicate: LeafPredicate,
}

/// Verifies script-path witnesses against a Taproot output key
#[derive(Debug, Clone, Default)]
pub struct SpendVerifier {
    config: TaprootConfig,
    sighash: Option<Hash>,
}

impl SpendVerifier {
    pub fn new(config: &TaprootConfig) -> Self {
        Self {
            config: config.clone(),
            sighash: None,
        }
    }

    /// Signature hash used by `OP_CHECKSIG` leaves
    pub fn with_sighash(mut self, sighash: Hash) -> Self {
        self.sighash = Some(sighash);
        self
    }

    /// Verify that `witness` is a valid script-path spend of `output_key`
    pub fn verify(&self, output_key: &XOnlyKey, witness: &[ByteString]) -> Result<VerifiedSpend> {
        self.run(output_key, witness, |state| debug!("taproot verifier: {state:?}"))
    }

    /// Like [`verify`](Self::verify), also returning every state visited
    pub fn verify_traced(
        &self,
        output_key: &XOnlyKey,
        witness: &[ByteString],
    ) -> (Vec<VerifierState>, Result<VerifiedSpend>) {
        let mut states = Vec::new();
        let result = self.run(output_key, witness, |state| states.push(state));
        (states, result)
    }

    fn run(
        &self,
        output_key: &XOnlyKey,
        witness: &[ByteString],
        mut enter: impl FnMut(VerifierState),
    ) -> Result<VerifiedSpend> {
        let mut last = VerifierState::ParseWitness;
        let mut step = |state: VerifierState| {
            last = state;
            enter(state);
        };
        let result = self.check(output_key, witness, &mut step);

        match &result {
            Ok(_) => enter(VerifierState::Accept),
            Err(err) => {
                if self.config.debug.log_rejections {
                    debug!("taproot spend rejected in {last:?}: {err}");
                }
                enter(VerifierState::Reject);
            }
        }
        result
    }

    fn check(
        &self,
        output_key: &XOnlyKey,
        witness: &[ByteString],
        step: &mut dyn FnMut(VerifierState),
    ) -> Result<VerifiedSpend> {
        step(VerifierState::ParseWitness);
        if witness.len() > self.config.limits.max_witness_items {
            return Err(TaprootError::MalformedWitness(
                format!(
                    "{} witness items exceed limit of {}",
                    witness.len(),
                    self.config.limits.max_witness_items
                )
                .into(),
            ));
        }
        let parts = split_script_path(witness)?;

        step(VerifierState::ExtractControlBlock);
        let control_block =
            control_block::decode(parts.control_block).map_err(|_| TaprootError::BadControlBlock)?;
        if control_block.depth() > self.config.limits.max_merkle_depth {
            return Err(TaprootError::BadControlBlock);
        }

        step(VerifierState::RecomputeMerkleProof);
        let leaf_hash = tap_leaf_hash(control_block.leaf_version, parts.leaf_script);
        let merkle_root = compute_root_from_proof(leaf_hash, &control_block.merkle_proof);
        trace!(
            "leaf {:02x?} at depth {} folds to root {:02x?}",
            leaf_hash,
            control_block.depth(),
            merkle_root
        );

        step(VerifierState::VerifyOutputKey);
        let committed = verify_output_key(
            &control_block.internal_pubkey,
            Some(&merkle_root),
            output_key,
            control_block.output_parity,
        )
        .map_err(|_| TaprootError::BadControlBlock)?;
        if !committed {
            return Err(TaprootError::BadControlBlock);
        }

        step(VerifierState::ExecuteLeafScript);
        if control_block.leaf_version != TAPROOT_LEAF_TAPSCRIPT {
            return Err(TaprootError::ScriptExecutionFailed(
                format!("unsupported leaf version {:#04x}", control_block.leaf_version).into(),
            ));
        }
        let predicate = LeafPredicate::from_script(parts.leaf_script).ok_or_else(|| {
            TaprootError::ScriptExecutionFailed("leaf script matches no known predicate".into())
        })?;
        let mut context = ExecutionContext::from_config(&self.config);
        context.sighash = self.sighash;
        predicate.evaluate(parts.script_inputs, &context)?;

        Ok(VerifiedSpend {
            control_block,
            leaf_script: parts.leaf_script.to_vec(),
            leaf_hash,
            merkle_root,
            predicate,
        })
    }
}

/// Verify a script-path spend with the default configuration
pub fn verify_spend(output_key: &XOnlyKey, witness: &[ByteString]) -> Result<VerifiedSpend> {
    SpendVerifier::default().verify(output_key, witness)
}
