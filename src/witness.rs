//! Taproot witness assembly (BIP 341)
//!
//! Two layouts exist:
//!
//! ```text
//! key path:     [signature]
//! script path:  [input_0, ..., input_n, leaf_script, control_block]
//! ```
//!
//! The script-path ordering is fixed: the last element is always the control
//! block and the second-to-last is always the leaf script. The builders here
//! refuse to produce anything else.

use crate::config::TaprootConfig;
use crate::control_block;
use crate::error::{Result, TaprootError};
use crate::schnorr::{check_signature_length, split_sighash_type};
use crate::serialization::{decode_varint, write_varint};
use crate::types::ByteString;
use serde::{Deserialize, Serialize};

/// Ordered witness stack for one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessStack(Vec<ByteString>);

impl WitnessStack {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ByteString> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&ByteString> {
        self.0.last()
    }

    pub fn as_slice(&self) -> &[ByteString] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<ByteString> {
        self.0
    }

    /// Serialize as in a segwit transaction: item count, then length-prefixed items
    pub fn serialize(&self) -> Vec<u8> {
        let size = self.0.iter().map(|item| item.len() + 9).sum::<usize>() + 9;
        let mut out = Vec::with_capacity(size);
        write_varint(&mut out, self.0.len() as u64);
        for item in &self.0 {
            write_varint(&mut out, item.len() as u64);
            out.extend_from_slice(item);
        }
        out
    }

    /// Parse a serialized witness stack; trailing bytes are an error
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let (count, mut offset) = decode_varint(data)?;
        let mut items = Vec::new();

        for _ in 0..count {
            let (len, consumed) = decode_varint(&data[offset..])?;
            offset += consumed;
            let end = usize::try_from(len)
                .ok()
                .and_then(|len| offset.checked_add(len))
                .filter(|end| *end <= data.len())
                .ok_or_else(|| TaprootError::Serialization("witness item truncated".into()))?;
            items.push(data[offset..end].to_vec());
            offset = end;
        }

        if offset != data.len() {
            return Err(TaprootError::Serialization(
                format!("{} trailing bytes after witness", data.len() - offset).into(),
            ));
        }
        Ok(WitnessStack(items))
    }
}

impl From<WitnessStack> for Vec<ByteString> {
    fn from(stack: WitnessStack) -> Self {
        stack.0
    }
}

impl AsRef<[ByteString]> for WitnessStack {
    fn as_ref(&self) -> &[ByteString] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a WitnessStack {
    type Item = &'a ByteString;
    type IntoIter = std::slice::Iter<'a, ByteString>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// How an output is being spent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendDescriptor {
    KeyPath {
        signature: ByteString,
    },
    ScriptPath {
        script_inputs: Vec<ByteString>,
        leaf_script: ByteString,
        control_block: ByteString,
    },
}

/// Borrowed view of a script-path witness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptPathWitness<'a> {
    pub script_inputs: &'a [ByteString],
    pub leaf_script: &'a [u8],
    pub control_block: &'a [u8],
}

/// Split a script-path witness into inputs, leaf script and control block
pub fn split_script_path(witness: &[ByteString]) -> Result<ScriptPathWitness<'_>> {
    match witness {
        [script_inputs @ .., leaf_script, control_block] => Ok(ScriptPathWitness {
            script_inputs,
            leaf_script,
            control_block,
        }),
        _ => Err(TaprootError::MalformedWitness(
            format!(
                "script-path witness needs at least 2 elements, got {}",
                witness.len()
            )
            .into(),
        )),
    }
}

/// `[signature]`, accepting an optional sighash type byte
pub fn build_key_path_witness(signature: &[u8]) -> Result<WitnessStack> {
    build_key_path_witness_with(signature, &TaprootConfig::default())
}

pub fn build_key_path_witness_with(signature: &[u8], config: &TaprootConfig) -> Result<WitnessStack> {
    check_signature_length(signature.len(), config.witness.allow_sighash_suffix)?;
    split_sighash_type(signature)?;
    Ok(WitnessStack(vec![signature.to_vec()]))
}

/// `script_inputs ++ [leaf_script, control_block]`
///
/// Fails with [`TaprootError::MalformedControlBlock`] if `control_block` is not
/// a well-formed control block, which also catches swapped arguments.
pub fn build_script_path_witness(
    script_inputs: &[ByteString],
    leaf_script: &[u8],
    control_block: &[u8],
) -> Result<WitnessStack> {
    build_script_path_witness_with(script_inputs, leaf_script, control_block, &TaprootConfig::default())
}

pub fn build_script_path_witness_with(
    script_inputs: &[ByteString],
    leaf_script: &[u8],
    control_block: &[u8],
    config: &TaprootConfig,
) -> Result<WitnessStack> {
    if !control_block::is_valid_control_block_size(control_block.len()) {
        return Err(TaprootError::MalformedControlBlock(control_block.len()));
    }

    let len = script_inputs.len() + 2;
    if len > config.limits.max_witness_items {
        return Err(TaprootError::MalformedWitness(
            format!(
                "{len} witness items exceed limit of {}",
                config.limits.max_witness_items
            )
            .into(),
        ));
    }

    let mut items = Vec::with_capacity(len);
    items.extend(script_inputs.iter().cloned());
    items.push(leaf_script.to_vec());
    items.push(control_block.to_vec());
    Ok(WitnessStack(items))
}

/// Assemble the witness described by `spend`
pub fn build_witness(spend: &SpendDescriptor) -> Result<WitnessStack> {
    build_witness_with(spend, &TaprootConfig::default())
}

pub fn build_witness_with(spend: &SpendDescriptor, config: &TaprootConfig) -> Result<WitnessStack> {
    match spend {
        SpendDescriptor::KeyPath { signature } => build_key_path_witness_with(signature, config),
        SpendDescriptor::ScriptPath {
            script_inputs,
            leaf_script,
            control_block,
        } => build_script_path_witness_with(script_inputs, leaf_script, control_block, config),
    }
}
