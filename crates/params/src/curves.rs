//! Supported curves and their constants
//!
//! Coordinates and scalars are fixed-length byte strings of exactly
//! [`CurveId::privlen`] bytes. Weierstrass constants are big-endian;
//! Montgomery base points are little-endian u-coordinates; the Edwards base
//! points are stored big-endian because that is how they are fed to the
//! scalar-multiplication parameter block.

use crate::fc;

/// Largest private-scalar length over all supported curves (P-521).
pub const MAX_PRIVLEN: usize = 66;

/// Identifier of a supported elliptic curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveId {
    /// NIST P-256 (secp256r1)
    P256,
    /// NIST P-384 (secp384r1)
    P384,
    /// NIST P-521 (secp521r1)
    P521,
    /// Edwards curve edwards25519 (RFC 8032)
    Ed25519,
    /// Edwards curve edwards448 (RFC 8032)
    Ed448,
    /// Montgomery curve curve25519 (RFC 7748)
    X25519,
    /// Montgomery curve curve448 (RFC 7748)
    X448,
}

impl CurveId {
    /// All supported curves, in catalog order.
    pub const ALL: [CurveId; 7] = [
        CurveId::P256,
        CurveId::P384,
        CurveId::P521,
        CurveId::Ed25519,
        CurveId::Ed448,
        CurveId::X25519,
        CurveId::X448,
    ];

    /// Canonical byte length of a private scalar (and of each public
    /// coordinate) for this curve.
    pub const fn privlen(self) -> usize {
        match self {
            CurveId::P256 | CurveId::Ed25519 | CurveId::X25519 => 32,
            CurveId::P384 => 48,
            CurveId::P521 => 66,
            CurveId::Ed448 => 57,
            CurveId::X448 => 56,
        }
    }

    /// Bit length carried in coprocessor key tokens. `privlen * 8` except for
    /// P-521 whose order is 521 bits.
    pub const fn priv_bitlen(self) -> u16 {
        match self {
            CurveId::P521 => 521,
            _ => (self.privlen() * 8) as u16,
        }
    }

    /// Slot width of the Weierstrass/Edwards scalar-multiplication and ECDSA
    /// parameter blocks. `None` for the Montgomery curves.
    pub const fn wei_slot(self) -> Option<usize> {
        match self {
            CurveId::P256 | CurveId::Ed25519 => Some(32),
            CurveId::P384 => Some(48),
            CurveId::P521 => Some(80),
            CurveId::Ed448 => Some(64),
            CurveId::X25519 | CurveId::X448 => None,
        }
    }

    /// Slot width of the Montgomery scalar-multiplication parameter block.
    pub const fn mont_slot(self) -> Option<usize> {
        match self {
            CurveId::X25519 => Some(32),
            CurveId::X448 => Some(64),
            _ => None,
        }
    }

    pub const fn is_weierstrass(self) -> bool {
        matches!(self, CurveId::P256 | CurveId::P384 | CurveId::P521)
    }

    pub const fn is_edwards(self) -> bool {
        matches!(self, CurveId::Ed25519 | CurveId::Ed448)
    }

    pub const fn is_montgomery(self) -> bool {
        matches!(self, CurveId::X25519 | CurveId::X448)
    }

    /// Curve-type tag carried in coprocessor key tokens. Only the prime
    /// curves are routed to the coprocessor.
    pub const fn cca_curve_type(self) -> Option<u8> {
        match self {
            CurveId::P256 | CurveId::P384 | CurveId::P521 => Some(0x00),
            _ => None,
        }
    }

    /// PCC function code for scalar multiplication on this curve.
    pub const fn pcc_scalar_mul_fc(self) -> u64 {
        match self {
            CurveId::P256 => fc::PCC_SCALAR_MULTIPLY_P256,
            CurveId::P384 => fc::PCC_SCALAR_MULTIPLY_P384,
            CurveId::P521 => fc::PCC_SCALAR_MULTIPLY_P521,
            CurveId::Ed25519 => fc::PCC_SCALAR_MULTIPLY_ED25519,
            CurveId::Ed448 => fc::PCC_SCALAR_MULTIPLY_ED448,
            CurveId::X25519 => fc::PCC_SCALAR_MULTIPLY_X25519,
            CurveId::X448 => fc::PCC_SCALAR_MULTIPLY_X448,
        }
    }

    /// KDSA function code for ECDSA signing; `None` off the P-curves.
    pub const fn kdsa_sign_fc(self) -> Option<u64> {
        match self {
            CurveId::P256 => Some(fc::KDSA_ECDSA_SIGN_P256),
            CurveId::P384 => Some(fc::KDSA_ECDSA_SIGN_P384),
            CurveId::P521 => Some(fc::KDSA_ECDSA_SIGN_P521),
            _ => None,
        }
    }

    /// KDSA function code for ECDSA verification; `None` off the P-curves.
    pub const fn kdsa_verify_fc(self) -> Option<u64> {
        match self {
            CurveId::P256 => Some(fc::KDSA_ECDSA_VERIFY_P256),
            CurveId::P384 => Some(fc::KDSA_ECDSA_VERIFY_P384),
            CurveId::P521 => Some(fc::KDSA_ECDSA_VERIFY_P521),
            _ => None,
        }
    }

    /// Affine x of the base point. Big-endian, `privlen` bytes. `None` for
    /// the Montgomery curves, which use [`CurveId::base_u`].
    pub const fn base_x(self) -> Option<&'static [u8]> {
        match self {
            CurveId::P256 => Some(&P256_BASE_X),
            CurveId::P384 => Some(&P384_BASE_X),
            CurveId::P521 => Some(&P521_BASE_X),
            CurveId::Ed25519 => Some(&ED25519_BASE_X),
            CurveId::Ed448 => Some(&ED448_BASE_X),
            _ => None,
        }
    }

    /// Affine y of the base point. Big-endian, `privlen` bytes.
    pub const fn base_y(self) -> Option<&'static [u8]> {
        match self {
            CurveId::P256 => Some(&P256_BASE_Y),
            CurveId::P384 => Some(&P384_BASE_Y),
            CurveId::P521 => Some(&P521_BASE_Y),
            CurveId::Ed25519 => Some(&ED25519_BASE_Y),
            CurveId::Ed448 => Some(&ED448_BASE_Y),
            _ => None,
        }
    }

    /// Base u-coordinate of a Montgomery curve, little-endian.
    pub const fn base_u(self) -> Option<&'static [u8]> {
        match self {
            CurveId::X25519 => Some(&X25519_BASE_U),
            CurveId::X448 => Some(&X448_BASE_U),
            _ => None,
        }
    }

    /// Group order, big-endian, `privlen` bytes. Available for the prime
    /// curves, where it bounds random-scalar key generation.
    pub const fn order(self) -> Option<&'static [u8]> {
        match self {
            CurveId::P256 => Some(&P256_ORDER),
            CurveId::P384 => Some(&P384_ORDER),
            CurveId::P521 => Some(&P521_ORDER),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CurveId::P256 => "P-256",
            CurveId::P384 => "P-384",
            CurveId::P521 => "P-521",
            CurveId::Ed25519 => "Ed25519",
            CurveId::Ed448 => "Ed448",
            CurveId::X25519 => "X25519",
            CurveId::X448 => "X448",
        }
    }
}

impl core::fmt::Display for CurveId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

const P256_BASE_X: [u8; 32] = [
    0x6B, 0x17, 0xD1, 0xF2, 0xE1, 0x2C, 0x42, 0x47, 0xF8, 0xBC, 0xE6, 0xE5,
    0x63, 0xA4, 0x40, 0xF2, 0x77, 0x03, 0x7D, 0x81, 0x2D, 0xEB, 0x33, 0xA0,
    0xF4, 0xA1, 0x39, 0x45, 0xD8, 0x98, 0xC2, 0x96,
];

const P256_BASE_Y: [u8; 32] = [
    0x4F, 0xE3, 0x42, 0xE2, 0xFE, 0x1A, 0x7F, 0x9B, 0x8E, 0xE7, 0xEB, 0x4A,
    0x7C, 0x0F, 0x9E, 0x16, 0x2B, 0xCE, 0x33, 0x57, 0x6B, 0x31, 0x5E, 0xCE,
    0xCB, 0xB6, 0x40, 0x68, 0x37, 0xBF, 0x51, 0xF5,
];

const P256_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xBC, 0xE6, 0xFA, 0xAD, 0xA7, 0x17, 0x9E, 0x84,
    0xF3, 0xB9, 0xCA, 0xC2, 0xFC, 0x63, 0x25, 0x51,
];

const P384_BASE_X: [u8; 48] = [
    0xAA, 0x87, 0xCA, 0x22, 0xBE, 0x8B, 0x05, 0x37, 0x8E, 0xB1, 0xC7, 0x1E,
    0xF3, 0x20, 0xAD, 0x74, 0x6E, 0x1D, 0x3B, 0x62, 0x8B, 0xA7, 0x9B, 0x98,
    0x59, 0xF7, 0x41, 0xE0, 0x82, 0x54, 0x2A, 0x38, 0x55, 0x02, 0xF2, 0x5D,
    0xBF, 0x55, 0x29, 0x6C, 0x3A, 0x54, 0x5E, 0x38, 0x72, 0x76, 0x0A, 0xB7,
];

const P384_BASE_Y: [u8; 48] = [
    0x36, 0x17, 0xDE, 0x4A, 0x96, 0x26, 0x2C, 0x6F, 0x5D, 0x9E, 0x98, 0xBF,
    0x92, 0x92, 0xDC, 0x29, 0xF8, 0xF4, 0x1D, 0xBD, 0x28, 0x9A, 0x14, 0x7C,
    0xE9, 0xDA, 0x31, 0x13, 0xB5, 0xF0, 0xB8, 0xC0, 0x0A, 0x60, 0xB1, 0xCE,
    0x1D, 0x7E, 0x81, 0x9D, 0x7A, 0x43, 0x1D, 0x7C, 0x90, 0xEA, 0x0E, 0x5F,
];

const P384_ORDER: [u8; 48] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xC7, 0x63, 0x4D, 0x81, 0xF4, 0x37, 0x2D, 0xDF, 0x58, 0x1A, 0x0D, 0xB2,
    0x48, 0xB0, 0xA7, 0x7A, 0xEC, 0xEC, 0x19, 0x6A, 0xCC, 0xC5, 0x29, 0x73,
];

const P521_BASE_X: [u8; 66] = [
    0x00, 0xC6, 0x85, 0x8E, 0x06, 0xB7, 0x04, 0x04, 0xE9, 0xCD, 0x9E, 0x3E,
    0xCB, 0x66, 0x23, 0x95, 0xB4, 0x42, 0x9C, 0x64, 0x81, 0x39, 0x05, 0x3F,
    0xB5, 0x21, 0xF8, 0x28, 0xAF, 0x60, 0x6B, 0x4D, 0x3D, 0xBA, 0xA1, 0x4B,
    0x5E, 0x77, 0xEF, 0xE7, 0x59, 0x28, 0xFE, 0x1D, 0xC1, 0x27, 0xA2, 0xFF,
    0xA8, 0xDE, 0x33, 0x48, 0xB3, 0xC1, 0x85, 0x6A, 0x42, 0x9B, 0xF9, 0x7E,
    0x7E, 0x31, 0xC2, 0xE5, 0xBD, 0x66,
];

const P521_BASE_Y: [u8; 66] = [
    0x01, 0x18, 0x39, 0x29, 0x6A, 0x78, 0x9A, 0x3B, 0xC0, 0x04, 0x5C, 0x8A,
    0x5F, 0xB4, 0x2C, 0x7D, 0x1B, 0xD9, 0x98, 0xF5, 0x44, 0x49, 0x57, 0x9B,
    0x44, 0x68, 0x17, 0xAF, 0xBD, 0x17, 0x27, 0x3E, 0x66, 0x2C, 0x97, 0xEE,
    0x72, 0x99, 0x5E, 0xF4, 0x26, 0x40, 0xC5, 0x50, 0xB9, 0x01, 0x3F, 0xAD,
    0x07, 0x61, 0x35, 0x3C, 0x70, 0x86, 0xA2, 0x72, 0xC2, 0x40, 0x88, 0xBE,
    0x94, 0x76, 0x9F, 0xD1, 0x66, 0x50,
];

const P521_ORDER: [u8; 66] = [
    0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFA, 0x51, 0x86,
    0x87, 0x83, 0xBF, 0x2F, 0x96, 0x6B, 0x7F, 0xCC, 0x01, 0x48, 0xF7, 0x09,
    0xA5, 0xD0, 0x3B, 0xB5, 0xC9, 0xB8, 0x89, 0x9C, 0x47, 0xAE, 0xBB, 0x6F,
    0xB7, 0x1E, 0x91, 0x38, 0x64, 0x09,
];

// edwards25519 base point, big-endian affine coordinates.
const ED25519_BASE_X: [u8; 32] = [
    0x21, 0x69, 0x36, 0xd3, 0xcd, 0x6e, 0x53, 0xfe, 0xc0, 0xa4, 0xe2, 0x31,
    0xfd, 0xd6, 0xdc, 0x5c, 0x69, 0x2c, 0xc7, 0x60, 0x95, 0x25, 0xa7, 0xb2,
    0xc9, 0x56, 0x2d, 0x60, 0x8f, 0x25, 0xd5, 0x1a,
];

const ED25519_BASE_Y: [u8; 32] = [
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x58,
];

// edwards448 base point, big-endian, padded to the 57-byte coordinate width.
const ED448_BASE_X: [u8; 57] = [
    0x00, 0x4f, 0x19, 0x70, 0xc6, 0x6b, 0xed, 0x0d, 0xed, 0x22, 0x1d, 0x15,
    0xa6, 0x22, 0xbf, 0x36, 0xda, 0x9e, 0x14, 0x65, 0x70, 0x47, 0x0f, 0x17,
    0x67, 0xea, 0x6d, 0xe3, 0x24, 0xa3, 0xd3, 0xa4, 0x64, 0x12, 0xae, 0x1a,
    0xf7, 0x2a, 0xb6, 0x65, 0x11, 0x43, 0x3b, 0x80, 0xe1, 0x8b, 0x00, 0x93,
    0x8e, 0x26, 0x26, 0xa8, 0x2b, 0xc7, 0x0c, 0xc0, 0x5e,
];

const ED448_BASE_Y: [u8; 57] = [
    0x00, 0x69, 0x3f, 0x46, 0x71, 0x6e, 0xb6, 0xbc, 0x24, 0x88, 0x76, 0x20,
    0x37, 0x56, 0xc9, 0xc7, 0x62, 0x4b, 0xea, 0x73, 0x73, 0x6c, 0xa3, 0x98,
    0x40, 0x87, 0x78, 0x9c, 0x1e, 0x05, 0xa0, 0xc2, 0xd7, 0x3a, 0xd3, 0xff,
    0x1c, 0xe6, 0x7c, 0x39, 0xc4, 0xfd, 0xbd, 0x13, 0x2c, 0x4e, 0xd7, 0xc8,
    0xad, 0x98, 0x08, 0x79, 0x5b, 0xf2, 0x30, 0xfa, 0x14,
];

// RFC 7748 base u-coordinates, little-endian.
const X25519_BASE_U: [u8; 32] = [
    0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const X448_BASE_U: [u8; 56] = [
    0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privlen_table() {
        assert_eq!(CurveId::P256.privlen(), 32);
        assert_eq!(CurveId::P384.privlen(), 48);
        assert_eq!(CurveId::P521.privlen(), 66);
        assert_eq!(CurveId::Ed25519.privlen(), 32);
        assert_eq!(CurveId::Ed448.privlen(), 57);
        assert_eq!(CurveId::X25519.privlen(), 32);
        assert_eq!(CurveId::X448.privlen(), 56);
    }

    #[test]
    fn bitlen_follows_privlen_except_p521() {
        assert_eq!(CurveId::P256.priv_bitlen(), 256);
        assert_eq!(CurveId::P384.priv_bitlen(), 384);
        assert_eq!(CurveId::P521.priv_bitlen(), 521);
        assert_eq!(CurveId::Ed448.priv_bitlen(), 456);
    }

    #[test]
    fn base_points_match_privlen() {
        for curve in CurveId::ALL {
            if curve.is_montgomery() {
                assert_eq!(curve.base_u().unwrap().len(), curve.privlen());
            } else {
                assert_eq!(curve.base_x().unwrap().len(), curve.privlen());
                assert_eq!(curve.base_y().unwrap().len(), curve.privlen());
            }
        }
    }

    #[test]
    fn p521_constants_keep_leading_zero_padding() {
        assert_eq!(CurveId::P521.base_x().unwrap()[0], 0x00);
        assert_eq!(CurveId::P521.base_y().unwrap()[0], 0x01);
        assert_eq!(CurveId::P521.order().unwrap()[0], 0x01);
    }

    #[test]
    fn only_prime_curves_have_card_tags_and_orders() {
        for curve in CurveId::ALL {
            assert_eq!(curve.cca_curve_type().is_some(), curve.is_weierstrass());
            assert_eq!(curve.order().is_some(), curve.is_weierstrass());
            assert_eq!(curve.kdsa_sign_fc().is_some(), curve.is_weierstrass());
        }
    }

    #[test]
    fn slot_widths_cover_privlen() {
        for curve in CurveId::ALL {
            let slot = curve.wei_slot().or_else(|| curve.mont_slot()).unwrap();
            assert!(slot >= curve.privlen());
        }
    }
}
