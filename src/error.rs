//! Error types for Taproot commitment and spend validation

use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TaprootError {
    #[error("Invalid x-only public key")]
    InvalidPublicKey,

    #[error("Tweak is not a valid scalar (>= curve order)")]
    InvalidTweak,

    #[error("Invalid leaf index {index} for a tree with {leaf_count} leaves")]
    InvalidLeafIndex { index: usize, leaf_count: usize },

    #[error("Malformed control block of {0} bytes")]
    MalformedControlBlock(usize),

    #[error("Invalid signature length: {0} bytes")]
    InvalidSignatureLength(usize),

    #[error("Malformed witness: {0}")]
    MalformedWitness(Cow<'static, str>),

    #[error("Control block does not commit to the output key")]
    BadControlBlock,

    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(Cow<'static, str>),

    #[error("Invalid leaf version: {0:#04x}")]
    InvalidLeafVersion(u8),

    #[error("Invalid script tree: {0}")]
    InvalidTreeStructure(Cow<'static, str>),

    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Invalid Schnorr signature")]
    InvalidSignature,

    #[error("Invalid leaf predicate: {0}")]
    InvalidPredicate(Cow<'static, str>),

    #[error("Serialization error: {0}")]
    Serialization(Cow<'static, str>),

    #[error("Configuration error: {0}")]
    Config(Cow<'static, str>),
}

/// Payload-free discriminant of [`TaprootError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPublicKey,
    InvalidTweak,
    InvalidLeafIndex,
    MalformedControlBlock,
    InvalidSignatureLength,
    MalformedWitness,
    BadControlBlock,
    ScriptExecutionFailed,
    InvalidLeafVersion,
    InvalidTreeStructure,
    InvalidSecretKey,
    InvalidSignature,
    InvalidPredicate,
    Serialization,
    Config,
}

impl TaprootError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaprootError::InvalidPublicKey => ErrorKind::InvalidPublicKey,
            TaprootError::InvalidTweak => ErrorKind::InvalidTweak,
            TaprootError::InvalidLeafIndex { .. } => ErrorKind::InvalidLeafIndex,
            TaprootError::MalformedControlBlock(_) => ErrorKind::MalformedControlBlock,
            TaprootError::InvalidSignatureLength(_) => ErrorKind::InvalidSignatureLength,
            TaprootError::MalformedWitness(_) => ErrorKind::MalformedWitness,
            TaprootError::BadControlBlock => ErrorKind::BadControlBlock,
            TaprootError::ScriptExecutionFailed(_) => ErrorKind::ScriptExecutionFailed,
            TaprootError::InvalidLeafVersion(_) => ErrorKind::InvalidLeafVersion,
            TaprootError::InvalidTreeStructure(_) => ErrorKind::InvalidTreeStructure,
            TaprootError::InvalidSecretKey => ErrorKind::InvalidSecretKey,
            TaprootError::InvalidSignature => ErrorKind::InvalidSignature,
            TaprootError::InvalidPredicate(_) => ErrorKind::InvalidPredicate,
            TaprootError::Serialization(_) => ErrorKind::Serialization,
            TaprootError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, TaprootError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ignores_payload() {
        let a = TaprootError::ScriptExecutionFailed("digest mismatch".into());
        let b = TaprootError::ScriptExecutionFailed("stack empty".into());
        assert_ne!(a, b);
        assert_eq!(a.kind(), b.kind());
    }

    #[test]
    fn test_display_messages() {
        let err = TaprootError::InvalidLeafIndex {
            index: 3,
            leaf_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Invalid leaf index 3 for a tree with 2 leaves"
        );
        assert_eq!(
            TaprootError::InvalidLeafVersion(0xc1).to_string(),
            "Invalid leaf version: 0xc1"
        );
    }
}
