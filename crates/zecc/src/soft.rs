//! Software rendition of the Weierstrass operations
//!
//! Thin adapters over the ecosystem P-curve implementations. Two consumers:
//! the public `*_sw` fallback operations for machines without any
//! acceleration, and the instruction software model, which serves the PCC
//! and KDSA function codes from the same helpers on targets other than
//! s390x.
//!
//! All helper inputs and outputs are big-endian byte strings of exactly
//! `privlen(curve)` bytes, matching the key-record convention.

use api::{EcKey, Error, FipsPolicy, Result};
use common::SecretBytes;
use params::CurveId;
use rand::{CryptoRng, RngCore};

const BACKEND: &str = "software";

macro_rules! wei_ops {
    ($name:ident, $c:ident, $curve:ident) => {
        mod $name {
            use ecdsa::hazmat::{SignPrimitive, VerifyPrimitive};
            use ecdsa::Signature;
            use rand::rngs::OsRng;
            use rand::{CryptoRng, RngCore};
            use zeroize::Zeroizing;
            use $c::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
            use $c::elliptic_curve::{ecdh, Field, PrimeField};
            use $c::{AffinePoint, EncodedPoint, FieldBytes, NonZeroScalar, ProjectivePoint, Scalar};

            type Sig = Signature<$c::$curve>;

            fn scalar(bytes: &[u8]) -> Option<Scalar> {
                Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(bytes)))
            }

            fn point(x: &[u8], y: &[u8]) -> Option<AffinePoint> {
                let encoded = EncodedPoint::from_affine_coordinates(
                    FieldBytes::from_slice(x),
                    FieldBytes::from_slice(y),
                    false,
                );
                Option::from(AffinePoint::from_encoded_point(&encoded))
            }

            fn coordinates(point: &AffinePoint) -> Option<(Vec<u8>, Vec<u8>)> {
                let encoded = point.to_encoded_point(false);
                Some((encoded.x()?.to_vec(), encoded.y()?.to_vec()))
            }

            pub(super) fn scalar_mul(k: &[u8], x: &[u8], y: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
                let k = scalar(k)?;
                let p = point(x, y)?;
                coordinates(&(ProjectivePoint::from(p) * k).to_affine())
            }

            pub(super) fn sign_prehashed(
                d: &[u8],
                k: Option<&[u8]>,
                z: &[u8],
            ) -> Option<(Vec<u8>, Vec<u8>)> {
                let d = scalar(d)?;
                let k = match k {
                    Some(bytes) => {
                        let k = scalar(bytes)?;
                        if bool::from(k.is_zero()) {
                            return None;
                        }
                        k
                    }
                    None => *NonZeroScalar::random(&mut OsRng).as_ref(),
                };
                let z = FieldBytes::clone_from_slice(z);
                let (sig, _) = d.try_sign_prehashed(*Zeroizing::new(k), &z).ok()?;
                let bytes = sig.to_bytes();
                let half = bytes.len() / 2;
                Some((bytes[..half].to_vec(), bytes[half..].to_vec()))
            }

            pub(super) fn verify_prehashed(
                x: &[u8],
                y: &[u8],
                z: &[u8],
                r: &[u8],
                s: &[u8],
            ) -> bool {
                let point = match point(x, y) {
                    Some(p) => p,
                    None => return false,
                };
                let sig = match Sig::from_scalars(
                    FieldBytes::clone_from_slice(r),
                    FieldBytes::clone_from_slice(s),
                ) {
                    Ok(sig) => sig,
                    Err(_) => return false,
                };
                let z = FieldBytes::clone_from_slice(z);
                point.verify_prehashed(&z, &sig).is_ok()
            }

            pub(super) fn diffie_hellman(d: &[u8], x: &[u8], y: &[u8]) -> Option<Vec<u8>> {
                let d: NonZeroScalar = Option::from(NonZeroScalar::new(scalar(d)?))?;
                let p = point(x, y)?;
                let shared = ecdh::diffie_hellman(&d, &p);
                Some(shared.raw_secret_bytes().to_vec())
            }

            pub(super) fn generate<R: CryptoRng + RngCore>(
                rng: &mut R,
            ) -> Option<(Vec<u8>, Vec<u8>, Vec<u8>)> {
                let d = NonZeroScalar::random(rng);
                let public = (ProjectivePoint::GENERATOR * d.as_ref()).to_affine();
                let (x, y) = coordinates(&public)?;
                Some((d.as_ref().to_repr().to_vec(), x, y))
            }
        }
    };
}

wei_ops!(p256_ops, p256, NistP256);
wei_ops!(p384_ops, p384, NistP384);
wei_ops!(p521_ops, p521, NistP521);

pub(crate) fn wei_scalar_mul(
    curve: CurveId,
    k: &[u8],
    x: &[u8],
    y: &[u8],
) -> Option<(Vec<u8>, Vec<u8>)> {
    match curve {
        CurveId::P256 => p256_ops::scalar_mul(k, x, y),
        CurveId::P384 => p384_ops::scalar_mul(k, x, y),
        CurveId::P521 => p521_ops::scalar_mul(k, x, y),
        _ => None,
    }
}

pub(crate) fn wei_sign_prehashed(
    curve: CurveId,
    d: &[u8],
    k: Option<&[u8]>,
    z: &[u8],
) -> Option<(Vec<u8>, Vec<u8>)> {
    match curve {
        CurveId::P256 => p256_ops::sign_prehashed(d, k, z),
        CurveId::P384 => p384_ops::sign_prehashed(d, k, z),
        CurveId::P521 => p521_ops::sign_prehashed(d, k, z),
        _ => None,
    }
}

pub(crate) fn wei_verify_prehashed(
    curve: CurveId,
    x: &[u8],
    y: &[u8],
    z: &[u8],
    r: &[u8],
    s: &[u8],
) -> Option<bool> {
    match curve {
        CurveId::P256 => Some(p256_ops::verify_prehashed(x, y, z, r, s)),
        CurveId::P384 => Some(p384_ops::verify_prehashed(x, y, z, r, s)),
        CurveId::P521 => Some(p521_ops::verify_prehashed(x, y, z, r, s)),
        _ => None,
    }
}

pub(crate) fn wei_diffie_hellman(curve: CurveId, d: &[u8], x: &[u8], y: &[u8]) -> Option<Vec<u8>> {
    match curve {
        CurveId::P256 => p256_ops::diffie_hellman(d, x, y),
        CurveId::P384 => p384_ops::diffie_hellman(d, x, y),
        CurveId::P521 => p521_ops::diffie_hellman(d, x, y),
        _ => None,
    }
}

pub(crate) fn wei_generate<R: CryptoRng + RngCore>(
    curve: CurveId,
    rng: &mut R,
) -> Option<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    match curve {
        CurveId::P256 => p256_ops::generate(rng),
        CurveId::P384 => p384_ops::generate(rng),
        CurveId::P521 => p521_ops::generate(rng),
        _ => None,
    }
}

/// The leftmost `privlen` bytes of the hash, right-aligned in a `privlen`
/// field element.
pub(crate) fn z_from_hash(privlen: usize, hash: &[u8]) -> Vec<u8> {
    let mut z = vec![0u8; privlen];
    let n = hash.len().min(privlen);
    z[privlen - n..].copy_from_slice(&hash[..n]);
    z
}

fn require_weierstrass(curve: CurveId) -> Result<()> {
    if !curve.is_weierstrass() {
        return Err(Error::UnsupportedCurve {
            curve,
            backend: BACKEND,
        });
    }
    Ok(())
}

/// ECDH shared-secret computation in software.
pub fn ecdh_sw(policy: &FipsPolicy, priv_a: &EcKey, pub_b: &EcKey) -> Result<SecretBytes> {
    policy.check("software ECDH")?;
    let curve = priv_a.curve();
    require_weierstrass(curve)?;
    let d = priv_a.d().ok_or(Error::InvalidKey {
        context: "ECDH requires the private scalar",
    })?;
    let (x, y) = pub_b.public().ok_or(Error::InvalidKey {
        context: "ECDH requires the peer public point",
    })?;
    let z = wei_diffie_hellman(curve, d, x, y).ok_or(Error::Hardware {
        context: "software ECDH",
    })?;
    Ok(SecretBytes::new(z))
}

/// ECDSA signature creation in software, `r ‖ s` output.
pub fn ecdsa_sign_sw(policy: &FipsPolicy, key: &EcKey, hash: &[u8]) -> Result<Vec<u8>> {
    policy.check("software ECDSA sign")?;
    let curve = key.curve();
    require_weierstrass(curve)?;
    let d = key.d().ok_or(Error::InvalidKey {
        context: "signing requires the private scalar",
    })?;
    let z = z_from_hash(curve.privlen(), hash);
    let (r, s) = wei_sign_prehashed(curve, d, None, &z).ok_or(Error::Hardware {
        context: "software ECDSA sign",
    })?;
    let mut sig = r;
    sig.extend_from_slice(&s);
    Ok(sig)
}

/// ECDSA signature verification in software.
pub fn ecdsa_verify_sw(policy: &FipsPolicy, key: &EcKey, hash: &[u8], sig: &[u8]) -> Result<()> {
    policy.check("software ECDSA verify")?;
    let curve = key.curve();
    require_weierstrass(curve)?;
    let privlen = curve.privlen();
    let (x, y) = key.public().ok_or(Error::InvalidKey {
        context: "verification requires the public point",
    })?;
    if sig.len() != 2 * privlen {
        return Err(Error::InvalidKey {
            context: "signature length",
        });
    }
    let z = z_from_hash(privlen, hash);
    match wei_verify_prehashed(curve, x, y, &z, &sig[..privlen], &sig[privlen..]) {
        Some(true) => Ok(()),
        Some(false) => Err(Error::SignatureInvalid),
        None => Err(Error::Hardware {
            context: "software ECDSA verify",
        }),
    }
}

/// EC key generation in software.
pub fn eckeygen_sw<R: CryptoRng + RngCore>(
    policy: &FipsPolicy,
    curve: CurveId,
    rng: &mut R,
) -> Result<EcKey> {
    policy.check("software key generation")?;
    require_weierstrass(curve)?;
    let (d, x, y) = wei_generate(curve, rng).ok_or(Error::Hardware {
        context: "software key generation",
    })?;
    EcKey::from_parts(curve, &d, &x, &y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn scalar_one_times_base_point_is_the_base_point() {
        for curve in [CurveId::P256, CurveId::P384, CurveId::P521] {
            let privlen = curve.privlen();
            let mut one = vec![0u8; privlen];
            one[privlen - 1] = 1;
            let (x, y) = wei_scalar_mul(
                curve,
                &one,
                curve.base_x().unwrap(),
                curve.base_y().unwrap(),
            )
            .unwrap();
            assert_eq!(x, curve.base_x().unwrap(), "{} base x", curve);
            assert_eq!(y, curve.base_y().unwrap(), "{} base y", curve);
        }
    }

    #[test]
    fn software_sign_verify_round_trip() {
        let policy = FipsPolicy::default();
        for curve in [CurveId::P256, CurveId::P384, CurveId::P521] {
            let key = eckeygen_sw(&policy, curve, &mut OsRng).unwrap();
            let hash = [0x5Au8; 32];
            let sig = ecdsa_sign_sw(&policy, &key, &hash).unwrap();
            assert_eq!(sig.len(), 2 * curve.privlen());
            ecdsa_verify_sw(&policy, &key, &hash, &sig).unwrap();

            let mut bad = sig.clone();
            bad[0] ^= 0x08;
            assert_eq!(
                ecdsa_verify_sw(&policy, &key, &hash, &bad),
                Err(Error::SignatureInvalid)
            );
        }
    }

    #[test]
    fn software_ecdh_agreement() {
        let policy = FipsPolicy::default();
        let a = eckeygen_sw(&policy, CurveId::P256, &mut OsRng).unwrap();
        let b = eckeygen_sw(&policy, CurveId::P256, &mut OsRng).unwrap();
        let z_ab = ecdh_sw(&policy, &a, &b).unwrap();
        let z_ba = ecdh_sw(&policy, &b, &a).unwrap();
        assert_eq!(z_ab, z_ba);
        assert_eq!(z_ab.len(), 32);
    }

    #[test]
    fn fips_gate_blocks_software_paths() {
        let policy = FipsPolicy {
            required: true,
            operational: false,
        };
        let err = eckeygen_sw(&policy, CurveId::P256, &mut OsRng).unwrap_err();
        assert!(matches!(err, Error::PolicyDenied { .. }));
        assert_eq!(err.errno(), api::error::errno::EACCES);
    }

    #[test]
    fn montgomery_curves_are_refused() {
        let policy = FipsPolicy::default();
        assert!(matches!(
            eckeygen_sw(&policy, CurveId::X25519, &mut OsRng),
            Err(Error::UnsupportedCurve { .. })
        ));
    }
}
