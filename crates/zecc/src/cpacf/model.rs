//! Software model of the PCC and KDSA function codes
//!
//! Serves the instruction entry points on targets without the real silicon,
//! against the identical parameter-block contract: big-endian, right-aligned
//! slots, condition-code style return (0 success, nonzero failure). The
//! Weierstrass codes run on the [`crate::soft`] helpers; the Montgomery and
//! Edwards codes run on the ecosystem implementations of those curves.
//!
//! The Edwards multiplication codes are served for the fixed generator, the
//! only point this library feeds them, and report the x result through its
//! low bit, which is all the Edwards derivation consumes.

use super::PARM_BLOCK_SIZE;
use crate::soft;
use params::{fc, CurveId};
use zeroize::{Zeroize, Zeroizing};

pub(crate) fn pcc(fc_code: u64, parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    match fc_code {
        fc::PCC_SCALAR_MULTIPLY_P256 => wei_mul(CurveId::P256, parm),
        fc::PCC_SCALAR_MULTIPLY_P384 => wei_mul(CurveId::P384, parm),
        fc::PCC_SCALAR_MULTIPLY_P521 => wei_mul(CurveId::P521, parm),
        fc::PCC_SCALAR_MULTIPLY_ED25519 => ed25519_mul(parm),
        fc::PCC_SCALAR_MULTIPLY_ED448 => ed448_mul(parm),
        fc::PCC_SCALAR_MULTIPLY_X25519 => x25519_mul(parm),
        fc::PCC_SCALAR_MULTIPLY_X448 => x448_mul(parm),
        _ => 1,
    }
}

pub(crate) fn kdsa(fc_code: u64, parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    let deterministic = fc_code & fc::KDSA_DETERMINISTIC != 0;
    match fc_code & !fc::KDSA_DETERMINISTIC {
        fc::KDSA_ECDSA_SIGN_P256 => sign(CurveId::P256, parm, deterministic),
        fc::KDSA_ECDSA_SIGN_P384 => sign(CurveId::P384, parm, deterministic),
        fc::KDSA_ECDSA_SIGN_P521 => sign(CurveId::P521, parm, deterministic),
        fc::KDSA_ECDSA_VERIFY_P256 => verify(CurveId::P256, parm),
        fc::KDSA_ECDSA_VERIFY_P384 => verify(CurveId::P384, parm),
        fc::KDSA_ECDSA_VERIFY_P521 => verify(CurveId::P521, parm),
        _ => 1,
    }
}

fn slot(parm: &[u8], idx: usize, width: usize) -> &[u8] {
    &parm[idx * width..(idx + 1) * width]
}

fn slot_mut(parm: &mut [u8], idx: usize, width: usize) -> &mut [u8] {
    &mut parm[idx * width..(idx + 1) * width]
}

fn tail(parm: &[u8], idx: usize, width: usize, len: usize) -> &[u8] {
    &slot(parm, idx, width)[width - len..]
}

fn write_tail(parm: &mut [u8], idx: usize, width: usize, src: &[u8]) {
    let s = slot_mut(parm, idx, width);
    let off = s.len() - src.len();
    s[off..].copy_from_slice(src);
}

fn wei_mul(curve: CurveId, parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    let width = match curve.wei_slot() {
        Some(w) => w,
        None => return 1,
    };
    let len = curve.privlen();
    let scalar = Zeroizing::new(tail(parm, 4, width, len).to_vec());
    let x = tail(parm, 2, width, len).to_vec();
    let y = tail(parm, 3, width, len).to_vec();
    match soft::wei_scalar_mul(curve, &scalar, &x, &y) {
        Some((rx, ry)) => {
            write_tail(parm, 0, width, &rx);
            write_tail(parm, 1, width, &ry);
            0
        }
        None => 1,
    }
}

fn is_base_point(curve: CurveId, parm: &[u8], width: usize, len: usize) -> bool {
    match (curve.base_x(), curve.base_y()) {
        (Some(bx), Some(by)) => tail(parm, 2, width, len) == bx && tail(parm, 3, width, len) == by,
        _ => false,
    }
}

fn ed25519_mul(parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    use curve25519_dalek::edwards::EdwardsPoint;
    use curve25519_dalek::scalar::Scalar;

    let curve = CurveId::Ed25519;
    let (width, len) = (32, 32);
    if !is_base_point(curve, parm, width, len) {
        return 1;
    }

    let mut k = [0u8; 32];
    k.copy_from_slice(tail(parm, 4, width, len));
    k.reverse();
    let point = EdwardsPoint::mul_base(&Scalar::from_bytes_mod_order(k));
    k.zeroize();

    let compressed = point.compress().to_bytes();
    let parity = compressed[31] >> 7;
    let mut y = compressed;
    y[31] &= 0x7f;
    y.reverse();
    write_tail(parm, 1, width, &y);
    let mut rx = [0u8; 32];
    rx[31] = parity;
    write_tail(parm, 0, width, &rx);
    0
}

fn ed448_mul(parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    use ed448_goldilocks::{EdwardsPoint, EdwardsScalar};

    let curve = CurveId::Ed448;
    let (width, len) = (64, 57);
    if !is_base_point(curve, parm, width, len) {
        return 1;
    }

    let mut le = [0u8; 57];
    le.copy_from_slice(tail(parm, 4, width, len));
    le.reverse();
    let mut wide = [0u8; 114];
    wide[..57].copy_from_slice(&le);
    let k = EdwardsScalar::from_bytes_mod_order_wide((&wide).into());
    le.zeroize();
    wide.zeroize();

    let point = &EdwardsPoint::GENERATOR * &k;
    let compressed = point.to_affine().compress().to_bytes();
    let parity = compressed[56] >> 7;
    let mut y = [0u8; 57];
    y[..56].copy_from_slice(&compressed[..56]);
    y.reverse();
    write_tail(parm, 1, width, &y);
    let mut rx = [0u8; 57];
    rx[56] = parity;
    write_tail(parm, 0, width, &rx);
    0
}

fn x25519_mul(parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    let width = 32;
    let mut u = [0u8; 32];
    u.copy_from_slice(slot(parm, 1, width));
    u.reverse();
    let mut k = [0u8; 32];
    k.copy_from_slice(slot(parm, 2, width));
    k.reverse();

    let mut res = x25519_dalek::x25519(k, u);
    k.zeroize();
    res.reverse();
    slot_mut(parm, 0, width).copy_from_slice(&res);
    0
}

fn x448_mul(parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    let width = 64;
    let mut u64b = [0u8; 64];
    u64b.copy_from_slice(slot(parm, 1, width));
    u64b.reverse();
    let mut k64 = [0u8; 64];
    k64.copy_from_slice(slot(parm, 2, width));
    k64.reverse();

    let mut u = [0u8; 56];
    u.copy_from_slice(&u64b[..56]);
    let mut k = [0u8; 56];
    k.copy_from_slice(&k64[..56]);
    k64.zeroize();

    let res = x448::x448(k, u);
    k.zeroize();
    let res = match res {
        Some(res) => res,
        None => return 1,
    };
    let mut out = [0u8; 64];
    out[..56].copy_from_slice(&res);
    out.reverse();
    slot_mut(parm, 0, width).copy_from_slice(&out);
    0
}

fn sign(curve: CurveId, parm: &mut [u8; PARM_BLOCK_SIZE], deterministic: bool) -> u32 {
    let width = match curve.wei_slot() {
        Some(w) => w,
        None => return 1,
    };
    let len = curve.privlen();
    let z = tail(parm, 2, width, len).to_vec();
    let d = Zeroizing::new(tail(parm, 3, width, len).to_vec());
    let k = if deterministic {
        Some(Zeroizing::new(tail(parm, 4, width, len).to_vec()))
    } else {
        None
    };
    match soft::wei_sign_prehashed(curve, &d, k.as_ref().map(|k| k.as_slice()), &z) {
        Some((r, s)) => {
            write_tail(parm, 0, width, &r);
            write_tail(parm, 1, width, &s);
            0
        }
        None => 1,
    }
}

fn verify(curve: CurveId, parm: &mut [u8; PARM_BLOCK_SIZE]) -> u32 {
    let width = match curve.wei_slot() {
        Some(w) => w,
        None => return 1,
    };
    let len = curve.privlen();
    let r = tail(parm, 0, width, len);
    let s = tail(parm, 1, width, len);
    let z = tail(parm, 2, width, len);
    let x = tail(parm, 3, width, len);
    let y = tail(parm, 4, width, len);
    match soft::wei_verify_prehashed(curve, x, y, z, r, s) {
        Some(true) => 0,
        _ => 1,
    }
}
