//! CPU-instruction function codes
//!
//! PCC and KDSA select their operation through a function code in general
//! register 0. These values come from the machine's instruction reference;
//! MSA 9 guarantees the curve-specific codes below.

/// PCC: scalar multiplication on P-256.
pub const PCC_SCALAR_MULTIPLY_P256: u64 = 0x40;
/// PCC: scalar multiplication on P-384.
pub const PCC_SCALAR_MULTIPLY_P384: u64 = 0x41;
/// PCC: scalar multiplication on P-521.
pub const PCC_SCALAR_MULTIPLY_P521: u64 = 0x42;
/// PCC: scalar multiplication on edwards25519.
pub const PCC_SCALAR_MULTIPLY_ED25519: u64 = 0x48;
/// PCC: scalar multiplication on edwards448.
pub const PCC_SCALAR_MULTIPLY_ED448: u64 = 0x49;
/// PCC: scalar multiplication on curve25519.
pub const PCC_SCALAR_MULTIPLY_X25519: u64 = 0x50;
/// PCC: scalar multiplication on curve448.
pub const PCC_SCALAR_MULTIPLY_X448: u64 = 0x51;

/// KDSA: ECDSA verification.
pub const KDSA_ECDSA_VERIFY_P256: u64 = 0x01;
pub const KDSA_ECDSA_VERIFY_P384: u64 = 0x02;
pub const KDSA_ECDSA_VERIFY_P521: u64 = 0x03;

/// KDSA: ECDSA signing with instruction-internal randomness.
pub const KDSA_ECDSA_SIGN_P256: u64 = 0x09;
pub const KDSA_ECDSA_SIGN_P384: u64 = 0x0a;
pub const KDSA_ECDSA_SIGN_P521: u64 = 0x0b;

/// ORed into a KDSA signing code to make the instruction consume the random
/// number supplied in the parameter block instead of generating its own.
pub const KDSA_DETERMINISTIC: u64 = 0x80;
