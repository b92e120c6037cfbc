//! Leaf predicates
//!
//! Full tapscript interpretation is out of scope. Instead each leaf script is
//! recognised as one of a few fixed templates and evaluated directly:
//!
//! | Predicate        | Script                                              | Inputs      |
//! |------------------|-----------------------------------------------------|-------------|
//! | `AlwaysTrue`     | `OP_TRUE`                                           | none        |
//! | `HashEquality`   | `<hash-op> <push digest> OP_EQUALVERIFY OP_TRUE`    | preimage    |
//! | `SignatureCheck` | `<push 32-byte key> OP_CHECKSIG`                    | signature   |
//!
//! A script matching no template cannot be executed and the spend is rejected.

use crate::constants::{MAX_SCRIPT_ELEMENT_SIZE, XONLY_PUBKEY_SIZE};
use crate::config::TaprootConfig;
use crate::crypto::HashAlgorithm;
use crate::error::{Result, TaprootError};
use crate::opcodes::{OP_CHECKSIG, OP_EQUALVERIFY, OP_PUSHBYTES_20, OP_PUSHBYTES_32, OP_TRUE};
use crate::schnorr::verify_schnorr;
use crate::types::{ByteString, Hash, ScriptLeaf, XOnlyKey};
use serde::{Deserialize, Serialize};

/// Spending condition encoded by a leaf script
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafPredicate {
    /// Anyone can spend by revealing the leaf
    AlwaysTrue,
    /// The single input must hash to `digest` under `algorithm`
    HashEquality {
        algorithm: HashAlgorithm,
        digest: ByteString,
    },
    /// The single input must be a BIP 340 signature by `pubkey`
    SignatureCheck { pubkey: XOnlyKey },
}

/// Inputs to predicate evaluation that do not come from the witness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Signature hash of the spending transaction, if known
    pub sighash: Option<Hash>,
    /// Largest script input accepted
    pub max_input_size: usize,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            sighash: None,
            max_input_size: MAX_SCRIPT_ELEMENT_SIZE,
        }
    }
}

impl ExecutionContext {
    pub fn from_config(config: &TaprootConfig) -> Self {
        Self {
            sighash: None,
            max_input_size: config.limits.max_script_input_size,
        }
    }

    pub fn with_sighash(mut self, sighash: Hash) -> Self {
        self.sighash = Some(sighash);
        self
    }
}

#[inline]
fn push_opcode(len: usize) -> Option<u8> {
    match len {
        20 => Some(OP_PUSHBYTES_20),
        32 => Some(OP_PUSHBYTES_32),
        _ => None,
    }
}

/// `<hash-op> <push digest> OP_EQUALVERIFY OP_TRUE`
///
/// `digest` must already be `algorithm.digest_len()` bytes.
fn encode_hash_lock(algorithm: HashAlgorithm, push: u8, digest: &[u8]) -> ByteString {
    let mut script = Vec::with_capacity(digest.len() + 4);
    script.push(algorithm.opcode());
    script.push(push);
    script.extend_from_slice(digest);
    script.push(OP_EQUALVERIFY);
    script.push(OP_TRUE);
    script
}

fn fail(reason: impl Into<std::borrow::Cow<'static, str>>) -> TaprootError {
    TaprootError::ScriptExecutionFailed(reason.into())
}

impl LeafPredicate {
    /// Hash-lock on `preimage`
    pub fn hash_lock(algorithm: HashAlgorithm, preimage: &[u8]) -> Self {
        LeafPredicate::HashEquality {
            algorithm,
            digest: algorithm.digest(preimage),
        }
    }

    /// Compile to a leaf script
    ///
    /// A `HashEquality` digest whose length does not match its algorithm fails
    /// with [`TaprootError::InvalidPredicate`].
    pub fn to_script(&self) -> Result<ByteString> {
        match self {
            LeafPredicate::AlwaysTrue => Ok(vec![OP_TRUE]),
            LeafPredicate::HashEquality { algorithm, digest } => {
                let len = algorithm.digest_len();
                match push_opcode(len) {
                    Some(push) if digest.len() == len => {
                        Ok(encode_hash_lock(*algorithm, push, digest))
                    }
                    _ => Err(TaprootError::InvalidPredicate(
                        format!("{algorithm:?} digest must be {len} bytes, got {}", digest.len()).into(),
                    )),
                }
            }
            LeafPredicate::SignatureCheck { pubkey } => {
                let mut script = Vec::with_capacity(XONLY_PUBKEY_SIZE + 2);
                script.push(OP_PUSHBYTES_32);
                script.extend_from_slice(pubkey);
                script.push(OP_CHECKSIG);
                Ok(script)
            }
        }
    }

    /// Compile to a leaf with the given version
    pub fn to_leaf(&self, leaf_version: u8) -> Result<ScriptLeaf> {
        ScriptLeaf::new(self.to_script()?, leaf_version)
    }

    /// Recognise a leaf script as one of the supported templates
    pub fn from_script(script: &[u8]) -> Option<Self> {
        match script {
            [OP_TRUE] => Some(LeafPredicate::AlwaysTrue),
            [OP_PUSHBYTES_32, key @ .., OP_CHECKSIG] if key.len() == XONLY_PUBKEY_SIZE => {
                let mut pubkey = [0u8; XONLY_PUBKEY_SIZE];
                pubkey.copy_from_slice(key);
                Some(LeafPredicate::SignatureCheck { pubkey })
            }
            [op, push, digest @ .., OP_EQUALVERIFY, OP_TRUE] => {
                let algorithm = HashAlgorithm::from_opcode(*op)?;
                let len = algorithm.digest_len();
                if Some(*push) != push_opcode(len) || digest.len() != len {
                    return None;
                }
                Some(LeafPredicate::HashEquality {
                    algorithm,
                    digest: digest.to_vec(),
                })
            }
            _ => None,
        }
    }

    /// Run the predicate against the script inputs of a witness
    ///
    /// Every failure is reported as [`TaprootError::ScriptExecutionFailed`].
    pub fn evaluate(&self, inputs: &[ByteString], context: &ExecutionContext) -> Result<()> {
        if let Some(big) = inputs.iter().find(|i| i.len() > context.max_input_size) {
            return Err(fail(format!(
                "script input of {} bytes exceeds {}",
                big.len(),
                context.max_input_size
            )));
        }

        match self {
            LeafPredicate::AlwaysTrue => {
                if !inputs.is_empty() {
                    return Err(fail(format!("{} unexpected script inputs", inputs.len())));
                }
                Ok(())
            }
            LeafPredicate::HashEquality { algorithm, digest } => {
                let preimage = single_input(inputs)?;
                if algorithm.digest(preimage) != *digest {
                    return Err(fail("preimage does not match committed digest"));
                }
                Ok(())
            }
            LeafPredicate::SignatureCheck { pubkey } => {
                let signature = single_input(inputs)?;
                let sighash = context
                    .sighash
                    .ok_or_else(|| fail("signature check requires a sighash"))?;
                verify_schnorr(pubkey, signature, &sighash)
                    .map_err(|e| fail(format!("signature check failed: {e}")))
            }
        }
    }
}

fn single_input(inputs: &[ByteString]) -> Result<&[u8]> {
    match inputs {
        [input] => Ok(input.as_slice()),
        _ => Err(fail(format!("expected 1 script input, got {}", inputs.len()))),
    }
}

/// SHA-256 hash-lock leaf script for `preimage`
pub fn hash_lock_script(preimage: &[u8]) -> ByteString {
    let algorithm = HashAlgorithm::Sha256;
    encode_hash_lock(algorithm, OP_PUSHBYTES_32, &algorithm.digest(preimage))
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn algorithm_strategy() -> impl Strategy<Value = HashAlgorithm> {
        prop_oneof![
            Just(HashAlgorithm::Sha256),
            Just(HashAlgorithm::Hash256),
            Just(HashAlgorithm::Ripemd160),
            Just(HashAlgorithm::Hash160),
        ]
    }

    proptest! {
        /// Every compiled hash-lock is recognised and accepts its own preimage
        #[test]
        fn prop_hash_lock_template(
            algorithm in algorithm_strategy(),
            preimage in prop::collection::vec(any::<u8>(), 0..100)
        ) {
            let predicate = LeafPredicate::hash_lock(algorithm, &preimage);
            let script = predicate.to_script().unwrap();
            prop_assert_eq!(LeafPredicate::from_script(&script), Some(predicate.clone()));
            prop_assert!(predicate.evaluate(&[preimage], &ExecutionContext::default()).is_ok());
        }
    }
}
