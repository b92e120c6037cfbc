//! Taproot consensus constants from BIP 340/341/342

/// Leaf version for BIP 342 tapscript
pub const TAPROOT_LEAF_TAPSCRIPT: u8 = 0xc0;

/// Mask selecting the leaf version bits of the first control block byte
pub const TAPROOT_LEAF_MASK: u8 = 0xfe;

/// Mask selecting the output key parity bit of the first control block byte
pub const TAPROOT_PARITY_MASK: u8 = 0x01;

/// Control block header: leaf version/parity byte + 32-byte internal key
pub const TAPROOT_CONTROL_BASE_SIZE: usize = 33;

/// Size of one Merkle proof node in a control block
pub const TAPROOT_CONTROL_NODE_SIZE: usize = 32;

/// Maximum Merkle proof depth (2^128 leaves)
pub const TAPROOT_CONTROL_MAX_NODE_COUNT: usize = 128;

/// Maximum control block size: 33 + 32 × 128
pub const TAPROOT_CONTROL_MAX_SIZE: usize =
    TAPROOT_CONTROL_BASE_SIZE + TAPROOT_CONTROL_NODE_SIZE * TAPROOT_CONTROL_MAX_NODE_COUNT;

/// BIP 340 Schnorr signature size
pub const SCHNORR_SIGNATURE_SIZE: usize = 64;

/// Schnorr signature with an explicit sighash type byte appended
pub const SCHNORR_SIGNATURE_WITH_SIGHASH_SIZE: usize = 65;

/// Implicit sighash type of a 64-byte signature; never valid as an explicit byte
pub const SIGHASH_DEFAULT: u8 = 0x00;

/// BIP 340 x-only public key size
pub const XONLY_PUBKEY_SIZE: usize = 32;

/// P2TR scriptPubKey: OP_1 OP_PUSHBYTES_32 <32-byte output key>
pub const TAPROOT_SCRIPT_LENGTH: usize = 34;

/// Maximum script element size (tapscript stack elements are bounded at 520 bytes)
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum stack size during script execution
pub const MAX_STACK_SIZE: usize = 1000;
