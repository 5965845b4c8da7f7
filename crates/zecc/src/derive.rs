//! Public-key derivation for the Montgomery and Edwards curves
//!
//! These run on the CPU instructions alone; callers are expected to have
//! checked for MSA 9. The Montgomery derivations are a single clamped
//! ladder step over the base u-coordinate. The Edwards derivations follow
//! RFC 8032: expand the seed (SHA-512 for Ed25519, SHAKE-256 for Ed448),
//! clamp, multiply the base point, then compress the result by folding the
//! sign of x into the top bit of y.
//!
//! Inputs and outputs use the RFC little-endian conventions; outputs are
//! returned in the caller's big-endian buffer convention after the final
//! flip.

use api::{Error, Result};
use common::endian::{flip_endian_32, flip_endian_64};
use params::CurveId;
use sha2::{Digest, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;
use zeroize::Zeroize;

use crate::cpacf;

/// X25519 public key for a 32-byte private scalar.
pub fn x25519_derive_pub(priv_: &[u8; 32]) -> Result<[u8; 32]> {
    let base_u = CurveId::X25519.base_u().ok_or(Error::UnsupportedCurve {
        curve: CurveId::X25519,
        backend: "cpacf",
    })?;
    let mut pub_ = [0u8; 32];
    cpacf::scalar_mul_x(CurveId::X25519, priv_, base_u, &mut pub_)?;
    Ok(pub_)
}

/// X448 public key for a 56-byte private scalar.
pub fn x448_derive_pub(priv_: &[u8; 56]) -> Result<[u8; 56]> {
    let base_u = CurveId::X448.base_u().ok_or(Error::UnsupportedCurve {
        curve: CurveId::X448,
        backend: "cpacf",
    })?;
    let mut pub_ = [0u8; 56];
    cpacf::scalar_mul_x(CurveId::X448, priv_, base_u, &mut pub_)?;
    Ok(pub_)
}

/// Ed25519 public key for a 32-byte seed.
pub fn ed25519_derive_pub(priv_: &[u8; 32]) -> Result<[u8; 32]> {
    let (base_x, base_y) = edwards_base(CurveId::Ed25519)?;

    let mut buf = [0u8; 64];
    buf.copy_from_slice(&Sha512::digest(priv_));
    // Clamp: clear the cofactor bits, set the fixed top bit.
    buf[0] &= !7;
    buf[31] &= 0x3f;
    buf[31] |= 0x40;

    let scalar: &mut [u8; 32] = (&mut buf[..32]).try_into().expect("scalar half");
    flip_endian_32(scalar);

    let mut res_x = [0u8; 32];
    let mut pub_ = [0u8; 32];
    let rc = cpacf::scalar_mul(
        CurveId::Ed25519,
        &buf[..32],
        base_x,
        base_y,
        Some(&mut res_x),
        Some(&mut pub_),
    );
    buf.zeroize();
    rc?;

    flip_endian_32(&mut res_x);
    flip_endian_32(&mut pub_);

    // Fold the sign of x into the top bit of y.
    pub_[31] |= (res_x[0] & 0x01) << 7;

    flip_endian_32(&mut pub_);
    Ok(pub_)
}

/// Ed448 public key for a 57-byte seed.
pub fn ed448_derive_pub(priv_: &[u8; 57]) -> Result<[u8; 57]> {
    let (base_x, base_y) = edwards_base(CurveId::Ed448)?;

    let mut buf = [0u8; 114];
    let mut xof = Shake256::default();
    xof.update(priv_);
    xof.finalize_xof().read(&mut buf);
    buf[57..].fill(0);
    // Clamp: clear the cofactor bits, set the top bit of the 56th byte,
    // zero the 57th.
    buf[0] &= !3;
    buf[55] |= 0x80;
    buf[56] = 0;

    // The 57 meaningful bytes travel inside a zero-padded 64-byte field.
    let head: &mut [u8; 64] = (&mut buf[..64]).try_into().expect("scalar field");
    flip_endian_64(head);

    let mut res_x = [0u8; 64];
    let mut pub64 = [0u8; 64];
    let rc = cpacf::scalar_mul(
        CurveId::Ed448,
        &buf[7..64],
        base_x,
        base_y,
        Some(&mut res_x[7..]),
        Some(&mut pub64[7..]),
    );
    buf.zeroize();
    rc?;

    flip_endian_64(&mut res_x);
    flip_endian_64(&mut pub64);

    pub64[56] |= (res_x[0] & 0x01) << 7;

    flip_endian_64(&mut pub64);
    let mut pub_ = [0u8; 57];
    pub_.copy_from_slice(&pub64[7..]);
    Ok(pub_)
}

fn edwards_base(curve: CurveId) -> Result<(&'static [u8], &'static [u8])> {
    match (curve.base_x(), curve.base_y()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(Error::UnsupportedCurve {
            curve,
            backend: "cpacf",
        }),
    }
}

#[cfg(all(test, not(target_arch = "s390x")))]
mod tests {
    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn x25519_derive_pub_rfc7748() {
        // RFC 7748, 6.1.
        let a: [u8; 32] = h("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a")
            .try_into()
            .unwrap();
        let a_pub = x25519_derive_pub(&a).unwrap();
        assert_eq!(
            a_pub.to_vec(),
            h("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a")
        );

        let b: [u8; 32] = h("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb")
            .try_into()
            .unwrap();
        let b_pub = x25519_derive_pub(&b).unwrap();
        assert_eq!(
            b_pub.to_vec(),
            h("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f")
        );
    }

    #[test]
    fn x448_derive_pub_rfc7748() {
        // RFC 7748, 6.2.
        let a: [u8; 56] = h(
            "9a8f4925d1519f5775cf46b04b5800d4ee9ee8bae8bc5565d498c28d\
             d9c9baf574a9419744897391006382a6f127ab1d9ac2d8c0a598726b",
        )
        .try_into()
        .unwrap();
        let a_pub = x448_derive_pub(&a).unwrap();
        assert_eq!(
            a_pub.to_vec(),
            h(
                "9b08f7cc31b7e3e67d22d5aea121074a273bd2b83de09c63faa73d2c\
                 22c5d9bbc836647241d953d40c5b12da88120d53177f80e532c41fa0"
            )
        );
    }

    // The Edwards derivations hand the key back big-endian, so the RFC 8032
    // vectors (little-endian point encodings) compare reversed.
    fn reversed(s: &str) -> Vec<u8> {
        let mut v = h(s);
        v.reverse();
        v
    }

    #[test]
    fn ed25519_derive_pub_rfc8032() {
        // RFC 8032, 7.1, test 1 and test 2.
        let seed1: [u8; 32] =
            h("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .try_into()
                .unwrap();
        assert_eq!(
            ed25519_derive_pub(&seed1).unwrap().to_vec(),
            reversed("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a")
        );

        let seed2: [u8; 32] =
            h("4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb")
                .try_into()
                .unwrap();
        assert_eq!(
            ed25519_derive_pub(&seed2).unwrap().to_vec(),
            reversed("3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c")
        );
    }

    #[test]
    fn ed448_derive_pub_rfc8032() {
        // RFC 8032, 7.4, blank test.
        let seed: [u8; 57] = h(
            "6c82a562cb808d10d632be89c8513ebf6c929f34ddfa8c9f63c9960e\
             f6e348a3528c8a3fbc2f044e39a3fc5b94492f8f032e7549a20098f95b",
        )
        .try_into()
        .unwrap();
        assert_eq!(
            ed448_derive_pub(&seed).unwrap().to_vec(),
            reversed(
                "5fd7449b59b461fd2ce787ec616ad46a1da1342485a70e1f8a0ea75d\
                 80e96778edf124769b46c7061bd6783df1e50f6cd1fa1abeafe8256180"
            )
        );
    }
}
