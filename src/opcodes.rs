//! Tapscript opcode constants used by leaf predicates
//!
//! Only the opcodes that appear in the leaf templates understood by
//! [`crate::predicate`] are listed here.
//!
//! Reference: Bitcoin Core `script/script.h` and BIP 342

/// OP_PUSHBYTES_20 - Push the next 20 bytes
pub const OP_PUSHBYTES_20: u8 = 0x14;

/// OP_PUSHBYTES_32 - Push the next 32 bytes
pub const OP_PUSHBYTES_32: u8 = 0x20;

/// OP_1 / OP_TRUE - Push 1 onto stack
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = 0x51;

/// OP_EQUALVERIFY - OP_EQUAL followed by OP_VERIFY
pub const OP_EQUALVERIFY: u8 = 0x88;

/// OP_RIPEMD160 - RIPEMD160 of top item
pub const OP_RIPEMD160: u8 = 0xa6;

/// OP_SHA256 - SHA256 of top item
pub const OP_SHA256: u8 = 0xa8;

/// OP_HASH160 - RIPEMD160(SHA256(x))
pub const OP_HASH160: u8 = 0xa9;

/// OP_HASH256 - SHA256(SHA256(x))
pub const OP_HASH256: u8 = 0xaa;

/// OP_CHECKSIG - BIP 340 Schnorr signature check in tapscript
pub const OP_CHECKSIG: u8 = 0xac;
