//! BIP 340 Schnorr signatures for Taproot spends
//!
//! Key-path spends sign with the tweaked secret `d' = d + t`, and
//! `OP_CHECKSIG` leaves verify against the pushed x-only key. The signature
//! hash itself is computed by the transaction layer and passed in as 32 bytes.
//!
//! A signature is 64 bytes, or 65 with an explicit sighash type appended. The
//! type byte does not take part in BIP 340 verification, but an explicit
//! `SIGHASH_DEFAULT` (0x00) is rejected: that type is only spelled as 64 bytes.

use crate::constants::{SCHNORR_SIGNATURE_SIZE, SCHNORR_SIGNATURE_WITH_SIGHASH_SIZE, SIGHASH_DEFAULT};
use crate::error::{Result, TaprootError};
use crate::tweak::{keypair_from_secret, parse_xonly, tweak_keypair, with_context};
use crate::types::{ByteString, Hash, XOnlyKey};
use secp256k1::{schnorr::Signature, Keypair, Message};

/// Check a signature length, optionally allowing the sighash suffix byte
#[inline]
pub fn check_signature_length(len: usize, allow_sighash_suffix: bool) -> Result<()> {
    match len {
        SCHNORR_SIGNATURE_SIZE => Ok(()),
        SCHNORR_SIGNATURE_WITH_SIGHASH_SIZE if allow_sighash_suffix => Ok(()),
        _ => Err(TaprootError::InvalidSignatureLength(len)),
    }
}

/// Split off the sighash type byte of a 65-byte signature
///
/// An explicit `SIGHASH_DEFAULT` byte fails with [`TaprootError::InvalidSignature`].
pub fn split_sighash_type(signature: &[u8]) -> Result<(&[u8], Option<u8>)> {
    check_signature_length(signature.len(), true)?;
    Ok(match signature.split_at(SCHNORR_SIGNATURE_SIZE) {
        (sig, []) => (sig, None),
        (_, [SIGHASH_DEFAULT]) => return Err(TaprootError::InvalidSignature),
        (sig, [sighash_type]) => (sig, Some(*sighash_type)),
        _ => return Err(TaprootError::InvalidSignatureLength(signature.len())),
    })
}

/// Verify a BIP 340 signature over `sighash` for an x-only key
pub fn verify_schnorr(pubkey: &XOnlyKey, signature: &[u8], sighash: &Hash) -> Result<()> {
    let (sig, _) = split_sighash_type(signature)?;
    let pubkey = parse_xonly(pubkey)?;
    let sig = Signature::from_slice(sig).map_err(|_| TaprootError::InvalidSignature)?;
    let msg = Message::from_digest(*sighash);

    with_context(|secp| secp.verify_schnorr(&sig, &msg, &pubkey))
        .map_err(|_| TaprootError::InvalidSignature)
}

/// Sign `sighash` with the key-path key of a commitment
///
/// The secret is tweaked with the commitment's Merkle root (`None` for a
/// key-path-only output). Signing uses no auxiliary randomness, so the result
/// is deterministic.
pub fn sign_key_path(
    secret: &[u8; 32],
    merkle_root: Option<&Hash>,
    sighash: &Hash,
) -> Result<[u8; SCHNORR_SIGNATURE_SIZE]> {
    let keypair = tweak_keypair(secret, merkle_root)?;
    Ok(sign_with(&keypair, sighash))
}

/// Sign `sighash` with an untweaked key, as `OP_CHECKSIG` leaves expect
pub fn sign_schnorr(secret: &[u8; 32], sighash: &Hash) -> Result<[u8; SCHNORR_SIGNATURE_SIZE]> {
    let keypair = keypair_from_secret(secret)?;
    Ok(sign_with(&keypair, sighash))
}

fn sign_with(keypair: &Keypair, sighash: &Hash) -> [u8; SCHNORR_SIGNATURE_SIZE] {
    let msg = Message::from_digest(*sighash);
    let sig = with_context(|secp| secp.sign_schnorr_no_aux_rand(&msg, keypair));

    let bytes: &[u8] = sig.as_ref();
    let mut out = [0u8; SCHNORR_SIGNATURE_SIZE];
    out.copy_from_slice(bytes);
    out
}

/// Verify a key-path witness against the output key
pub fn verify_key_path(output_key: &XOnlyKey, witness: &[ByteString], sighash: &Hash) -> Result<()> {
    let signature = match witness {
        [signature] => signature,
        _ => {
            return Err(TaprootError::MalformedWitness(
                format!("key-path witness has {} elements, expected 1", witness.len()).into(),
            ))
        }
    };
    verify_schnorr(output_key, signature, sighash)
}
