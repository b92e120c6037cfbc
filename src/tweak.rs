//! Taproot key tweaking (BIP 341)
//!
//! OutputKey = InternalKey + t × G, where
//! t = tagged_hash("TapTweak", internal_key || merkle_root) interpreted as a scalar.
//!
//! A key-path-only output omits the Merkle root from the tweak preimage
//! entirely; it is not replaced by a zero hash.
//!
//! The same tweak drives three operations: building the commitment, deriving
//! the tweaked signing key `d' = d + t (mod n)`, and checking a claimed output
//! key during control block verification.

use crate::crypto::tagged::TapTag;
use crate::error::{Result, TaprootError};
use crate::types::{Hash, Parity, TweakResult, XOnlyKey};
use secp256k1::{All, Keypair, Scalar, Secp256k1, SecretKey, XOnlyPublicKey};
use sha2::Digest;

thread_local! {
    /// Secp256k1 context reused across calls on this thread
    static SECP256K1_CONTEXT: Secp256k1<All> = Secp256k1::new();
}

/// Run `f` with this thread's secp256k1 context
pub(crate) fn with_context<R>(f: impl FnOnce(&Secp256k1<All>) -> R) -> R {
    SECP256K1_CONTEXT.with(|secp| f(secp))
}

/// `tagged_hash("TapTweak", internal_key || merkle_root?)`
pub fn tap_tweak_hash(internal_pubkey: &XOnlyKey, merkle_root: Option<&Hash>) -> Hash {
    let mut engine = TapTag::TapTweak.engine();
    engine.update(internal_pubkey);
    if let Some(root) = merkle_root {
        engine.update(root);
    }
    engine.finalize().into()
}

/// Tweak as a curve scalar; fails if the hash is not below the curve order
pub fn tweak_scalar(internal_pubkey: &XOnlyKey, merkle_root: Option<&Hash>) -> Result<Scalar> {
    scalar_from_hash(tap_tweak_hash(internal_pubkey, merkle_root))
}

/// Raw tweak bytes, checked to be a valid scalar
pub fn tap_tweak(internal_pubkey: &XOnlyKey, merkle_root: Option<&Hash>) -> Result<[u8; 32]> {
    Ok(tweak_scalar(internal_pubkey, merkle_root)?.to_be_bytes())
}

fn scalar_from_hash(hash: Hash) -> Result<Scalar> {
    Scalar::from_be_bytes(hash).map_err(|_| TaprootError::InvalidTweak)
}

/// Parse a 32-byte x-only key, lifting it to the even-y curve point
pub fn parse_xonly(pubkey: &XOnlyKey) -> Result<XOnlyPublicKey> {
    XOnlyPublicKey::from_slice(pubkey).map_err(|_| TaprootError::InvalidPublicKey)
}

/// Derive the output key and its parity from an internal key and optional Merkle root
pub fn compute_output_key(
    internal_pubkey: &XOnlyKey,
    merkle_root: Option<&Hash>,
) -> Result<TweakResult> {
    let internal = parse_xonly(internal_pubkey)?;
    let tweak = tweak_scalar(internal_pubkey, merkle_root)?;

    // P + t·G can only fail if it lands on the point at infinity
    let (output, parity) = with_context(|secp| internal.add_tweak(secp, &tweak))
        .map_err(|_| TaprootError::InvalidTweak)?;

    Ok(TweakResult {
        output_pubkey: output.serialize(),
        parity: parity.into(),
    })
}

/// Check a claimed output key and parity against an internal key and Merkle root
pub fn verify_output_key(
    internal_pubkey: &XOnlyKey,
    merkle_root: Option<&Hash>,
    claimed_output_key: &XOnlyKey,
    claimed_parity: Parity,
) -> Result<bool> {
    let tweaked = compute_output_key(internal_pubkey, merkle_root)?;
    Ok(tweaked.output_pubkey == *claimed_output_key && tweaked.parity == claimed_parity)
}

/// x-only public key for a secret key
pub fn internal_key_from_secret(secret: &[u8; 32]) -> Result<XOnlyKey> {
    let keypair = keypair_from_secret(secret)?;
    Ok(keypair.x_only_public_key().0.serialize())
}

pub(crate) fn keypair_from_secret(secret: &[u8; 32]) -> Result<Keypair> {
    with_context(|secp| Keypair::from_seckey_slice(secp, secret))
        .map_err(|_| TaprootError::InvalidSecretKey)
}

/// Tweaked key pair for key-path signing
///
/// If the internal point has odd y the secret is negated first, so the
/// result always matches [`compute_output_key`] for the x-only internal key.
pub fn tweak_keypair(secret: &[u8; 32], merkle_root: Option<&Hash>) -> Result<Keypair> {
    let keypair = keypair_from_secret(secret)?;
    let internal = keypair.x_only_public_key().0.serialize();
    let tweak = tweak_scalar(&internal, merkle_root)?;
    with_context(|secp| keypair.add_xonly_tweak(secp, &tweak)).map_err(|_| TaprootError::InvalidTweak)
}

/// Tweaked signing scalar `d' = d + t (mod n)`
pub fn tweak_secret_key(secret: &[u8; 32], merkle_root: Option<&Hash>) -> Result<SecretKey> {
    Ok(tweak_keypair(secret, merkle_root)?.secret_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h32(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    const HELLO_SECRET: &str = "82a3ddde60ca9ebece3ef5af4e02b0f44113703520895047c32d081d762e29ac";
    const HELLO_INTERNAL: &str = "50be5fc44ec580c387bf45df275aaa8b27e2d7716af31f10eeed357d126bb4d3";
    const HELLO_LEAF: &str = "fe78d8523ce9603014b28739a51ef826f791aa17511e617af6dc96a8f10f659e";
    const HELLO_OUTPUT: &str = "a46780148be98aaa861ad0b5dfc5c9b935d515c7be8c9e2bc6cedfa594e2b6d9";

    #[test]
    fn test_tap_tweak_hash_hash_lock() {
        assert_eq!(
            tap_tweak_hash(&h32(HELLO_INTERNAL), Some(&h32(HELLO_LEAF))),
            h32("184064d0b2fc2485f5ca4cb38907603e0837e26f3b66c6e3c9fcdd621844ea38")
        );
    }

    #[test]
    fn test_tap_tweak_bytes() {
        assert_eq!(
            tap_tweak(&h32(HELLO_INTERNAL), Some(&h32(HELLO_LEAF))).unwrap(),
            h32("184064d0b2fc2485f5ca4cb38907603e0837e26f3b66c6e3c9fcdd621844ea38")
        );
    }

    #[test]
    fn test_compute_output_key_script_commitment() {
        let result = compute_output_key(&h32(HELLO_INTERNAL), Some(&h32(HELLO_LEAF))).unwrap();
        assert_eq!(result.output_pubkey, h32(HELLO_OUTPUT));
        assert_eq!(result.parity, Parity::Odd);
    }

    #[test]
    fn test_compute_output_key_without_scripts() {
        let result = compute_output_key(&h32(HELLO_INTERNAL), None).unwrap();
        assert_eq!(
            result.output_pubkey,
            h32("7e9e22f81c870d9f3b57389ff2dbbba5a7ed4b8352b38cffd474bfb9d8265cff")
        );
        assert_eq!(result.parity, Parity::Even);

        // Omitting the root is not the same as committing to a zero root
        let zero_root = compute_output_key(&h32(HELLO_INTERNAL), Some(&[0u8; 32])).unwrap();
        assert_ne!(zero_root.output_pubkey, result.output_pubkey);
    }

    #[test]
    fn test_compute_output_key_single_checksig_leaf() {
        let internal = h32("93478e9488f956df2396be2ce6c5cced75f900dfa18e7dabd2428aae78451820");
        let script =
            hex::decode("20b617298552a72ade070667e86ca63b8f5789a9fe8731ef91202a91c9f3459007ac")
                .unwrap();
        let root = crate::tree::tap_leaf_hash(0xc0, &script);
        let result = compute_output_key(&internal, Some(&root)).unwrap();
        assert_eq!(
            result.output_pubkey,
            h32("e4d810fd50586274face62b8a807eb9719cef49c04177cc6b76a9a4251d5450e")
        );
        assert_eq!(result.parity, Parity::Even);
    }

    #[test]
    fn test_compute_output_key_invalid_pubkey() {
        assert_eq!(
            compute_output_key(&[0xff; 32], None),
            Err(TaprootError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_tweak_out_of_range() {
        // Curve order n itself is not a valid scalar
        let n = h32("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");
        assert_eq!(scalar_from_hash(n).err(), Some(TaprootError::InvalidTweak));
        assert_eq!(scalar_from_hash([0xff; 32]).err(), Some(TaprootError::InvalidTweak));
        assert!(scalar_from_hash([0x01; 32]).is_ok());
    }

    #[test]
    fn test_verify_output_key() {
        let internal = h32(HELLO_INTERNAL);
        let root = h32(HELLO_LEAF);
        let output = h32(HELLO_OUTPUT);
        assert!(verify_output_key(&internal, Some(&root), &output, Parity::Odd).unwrap());
        assert!(!verify_output_key(&internal, Some(&root), &output, Parity::Even).unwrap());
        assert!(!verify_output_key(&internal, None, &output, Parity::Odd).unwrap());
    }

    #[test]
    fn test_internal_key_from_secret() {
        assert_eq!(
            internal_key_from_secret(&h32(HELLO_SECRET)).unwrap(),
            h32(HELLO_INTERNAL)
        );
        assert_eq!(
            internal_key_from_secret(&[0u8; 32]),
            Err(TaprootError::InvalidSecretKey)
        );
    }

    #[test]
    fn test_tweaked_keypair_matches_output_key() {
        let keypair = tweak_keypair(&h32(HELLO_SECRET), Some(&h32(HELLO_LEAF))).unwrap();
        let (xonly, parity) = keypair.x_only_public_key();
        assert_eq!(xonly.serialize(), h32(HELLO_OUTPUT));
        assert_eq!(Parity::from(parity), Parity::Odd);
    }

    #[test]
    fn test_tweak_secret_key_is_keypair_secret() {
        let secret = h32(HELLO_SECRET);
        let root = h32(HELLO_LEAF);
        assert_eq!(
            tweak_secret_key(&secret, Some(&root)).unwrap(),
            tweak_keypair(&secret, Some(&root)).unwrap().secret_key()
        );
    }
}
