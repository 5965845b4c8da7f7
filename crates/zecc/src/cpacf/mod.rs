//! CPU-instruction backend (PCC / KDSA)
//!
//! Both instructions consume a 4 KiB parameter block laid out as a row of
//! equally sized slots; everything past the defined slots is scratch for the
//! instruction. Values are big-endian and right-aligned within their slot,
//! shorter curves leaving leading zero bytes. The Montgomery block is the
//! one exception: its callers speak little-endian, so the bytes are flipped
//! on the way in and out.
//!
//! The block is wiped in full when it goes out of scope; a signing or
//! multiplication failure still scrubs the private scalar and the random
//! number it carried.

use api::{EcKey, Error, Result};
use common::endian::{flip_endian_32, flip_endian_64};
use params::{fc, CurveId};
use zeroize::Zeroize;

mod insn;
#[cfg(not(target_arch = "s390x"))]
mod model;


/// Parameter-block size shared by every PCC/KDSA function code used here.
pub(crate) const PARM_BLOCK_SIZE: usize = 4096;

const BACKEND: &str = "cpacf";

// Slot order of the scalar-multiplication block.
const SM_RES_X: usize = 0;
const SM_RES_Y: usize = 1;
const SM_X: usize = 2;
const SM_Y: usize = 3;
const SM_SCALAR: usize = 4;

// Slot order of the Montgomery scalar-multiplication block.
const MX_RES_U: usize = 0;
const MX_U: usize = 1;
const MX_SCALAR: usize = 2;

// Slot order of the combined ECDSA block. The last slot holds the random
// number when signing and the public y coordinate when verifying.
const DSA_SIG_R: usize = 0;
const DSA_SIG_S: usize = 1;
const DSA_HASH: usize = 2;
const DSA_KEY: usize = 3;
const DSA_EXTRA: usize = 4;

/// Instruction parameter block, scrubbed on drop.
struct ParmBlock {
    buf: [u8; PARM_BLOCK_SIZE],
}

impl ParmBlock {
    fn new() -> Self {
        Self {
            buf: [0u8; PARM_BLOCK_SIZE],
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8; PARM_BLOCK_SIZE] {
        &mut self.buf
    }

    fn slot(&self, idx: usize, width: usize) -> &[u8] {
        &self.buf[idx * width..(idx + 1) * width]
    }

    fn slot_mut(&mut self, idx: usize, width: usize) -> &mut [u8] {
        &mut self.buf[idx * width..(idx + 1) * width]
    }

    /// Write `src` right-aligned into a slot.
    fn put_tail(&mut self, idx: usize, width: usize, src: &[u8]) {
        let slot = self.slot_mut(idx, width);
        let off = width - src.len();
        slot[off..].copy_from_slice(src);
    }

    /// Write a hash right-aligned, keeping the leftmost `width` bytes when
    /// the hash is longer than the slot.
    fn put_hash(&mut self, idx: usize, width: usize, hash: &[u8]) {
        let n = hash.len().min(width);
        let slot = self.slot_mut(idx, width);
        let off = width - n;
        slot[off..].copy_from_slice(&hash[..n]);
    }

    /// The trailing `len` bytes of a slot.
    fn tail(&self, idx: usize, width: usize, len: usize) -> &[u8] {
        &self.slot(idx, width)[width - len..]
    }

    fn tail_mut(&mut self, idx: usize, width: usize, len: usize) -> &mut [u8] {
        let slot = self.slot_mut(idx, width);
        &mut slot[width - len..]
    }
}

impl Drop for ParmBlock {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

/// Scalar multiplication on the Weierstrass and Edwards curves.
///
/// `scalar`, `x` and `y` are big-endian strings of exactly `privlen(curve)`
/// bytes. On success the affine result is copied into whichever of `res_x`
/// and `res_y` is provided, each `privlen` bytes.
pub fn scalar_mul(
    curve: CurveId,
    scalar: &[u8],
    x: &[u8],
    y: &[u8],
    res_x: Option<&mut [u8]>,
    res_y: Option<&mut [u8]>,
) -> Result<()> {
    let slot = curve.wei_slot().ok_or(Error::UnsupportedCurve {
        curve,
        backend: BACKEND,
    })?;
    let len = curve.privlen();
    debug_assert_eq!(scalar.len(), len);
    debug_assert_eq!(x.len(), len);
    debug_assert_eq!(y.len(), len);

    let mut block = ParmBlock::new();
    block.put_tail(SM_X, slot, x);
    block.put_tail(SM_Y, slot, y);
    block.put_tail(SM_SCALAR, slot, scalar);

    let cc = insn::pcc(curve.pcc_scalar_mul_fc(), block.bytes_mut());
    if cc != 0 {
        return Err(Error::Hardware {
            context: "PCC scalar multiplication",
        });
    }

    if let Some(out) = res_x {
        out.copy_from_slice(block.tail(SM_RES_X, slot, len));
    }
    if let Some(out) = res_y {
        out.copy_from_slice(block.tail(SM_RES_Y, slot, len));
    }
    Ok(())
}

/// Scalar multiplication on the Montgomery curves.
///
/// `scalar` and `u` are little-endian, `privlen(curve)` bytes each. The
/// RFC 7748 clamping is applied to the copies inside the block, after which
/// everything is flipped to big-endian for the instruction; the result is
/// flipped back and written little-endian to `res_u`.
pub fn scalar_mul_x(curve: CurveId, scalar: &[u8], u: &[u8], res_u: &mut [u8]) -> Result<()> {
    let slot = curve.mont_slot().ok_or(Error::UnsupportedCurve {
        curve,
        backend: BACKEND,
    })?;
    let len = curve.privlen();
    debug_assert_eq!(scalar.len(), len);
    debug_assert_eq!(u.len(), len);
    debug_assert_eq!(res_u.len(), len);

    let mut block = ParmBlock::new();
    block.slot_mut(MX_U, slot)[..len].copy_from_slice(u);
    block.slot_mut(MX_SCALAR, slot)[..len].copy_from_slice(scalar);

    match curve {
        CurveId::X25519 => {
            {
                // Mask the non-canonical high bit of u, then clamp.
                let us = block.slot_mut(MX_U, slot);
                us[31] &= 0x7f;
            }
            {
                let s = block.slot_mut(MX_SCALAR, slot);
                s[0] &= 248;
                s[31] &= 127;
                s[31] |= 64;
            }
            flip_endian_32(slot_array_32(block.slot_mut(MX_U, slot)));
            flip_endian_32(slot_array_32(block.slot_mut(MX_SCALAR, slot)));
        }
        CurveId::X448 => {
            {
                let s = block.slot_mut(MX_SCALAR, slot);
                s[0] &= 252;
                s[55] |= 128;
            }
            flip_endian_64(slot_array_64(block.slot_mut(MX_U, slot)));
            flip_endian_64(slot_array_64(block.slot_mut(MX_SCALAR, slot)));
        }
        _ => unreachable!(),
    }

    let cc = insn::pcc(curve.pcc_scalar_mul_fc(), block.bytes_mut());
    if cc != 0 {
        return Err(Error::Hardware {
            context: "PCC Montgomery scalar multiplication",
        });
    }

    match curve {
        CurveId::X25519 => flip_endian_32(slot_array_32(block.slot_mut(MX_RES_U, slot))),
        CurveId::X448 => flip_endian_64(slot_array_64(block.slot_mut(MX_RES_U, slot))),
        _ => unreachable!(),
    }
    res_u.copy_from_slice(&block.slot(MX_RES_U, slot)[..len]);
    Ok(())
}

/// ECDSA signing via KDSA. Supported for the P-curves only.
///
/// Without a callback the instruction draws its own random number per
/// invocation. With a callback the deterministic function code is used and
/// the callback fills the random-number slot; the instruction may reject a
/// particular value, in which case the callback is drained again and the
/// instruction retried.
///
/// The signature is written as `r ‖ s`, `2 × privlen` bytes.
pub fn ecdsa_sign(
    key: &EcKey,
    hash: &[u8],
    sig: &mut [u8],
    rng_cb: Option<&mut dyn FnMut(&mut [u8])>,
) -> Result<()> {
    let curve = key.curve();
    let (slot, fc_sign) = match (curve.wei_slot(), curve.kdsa_sign_fc()) {
        (Some(slot), Some(fc_sign)) => (slot, fc_sign),
        _ => {
            return Err(Error::UnsupportedCurve {
                curve,
                backend: BACKEND,
            })
        }
    };
    let len = curve.privlen();
    let d = key.d().ok_or(Error::InvalidKey {
        context: "signing requires the private scalar",
    })?;
    if sig.len() != 2 * len {
        return Err(Error::InvalidKey {
            context: "signature buffer length",
        });
    }

    let mut block = ParmBlock::new();
    block.put_hash(DSA_HASH, slot, hash);
    block.put_tail(DSA_KEY, slot, d);

    let cc = match rng_cb {
        None => insn::kdsa(fc_sign, block.bytes_mut()),
        Some(cb) => {
            let fc_det = fc_sign | fc::KDSA_DETERMINISTIC;
            loop {
                cb(block.tail_mut(DSA_EXTRA, slot, len));
                if insn::kdsa(fc_det, block.bytes_mut()) == 0 {
                    break 0;
                }
            }
        }
    };
    if cc != 0 {
        return Err(Error::Hardware {
            context: "KDSA sign",
        });
    }

    sig[..len].copy_from_slice(block.tail(DSA_SIG_R, slot, len));
    sig[len..].copy_from_slice(block.tail(DSA_SIG_S, slot, len));
    // The private scalar and random number go down with the block.
    Ok(())
}

/// ECDSA verification via KDSA. Supported for the P-curves only.
pub fn ecdsa_verify(key: &EcKey, hash: &[u8], sig: &[u8]) -> Result<()> {
    let curve = key.curve();
    let (slot, fc_verify) = match (curve.wei_slot(), curve.kdsa_verify_fc()) {
        (Some(slot), Some(fc_verify)) => (slot, fc_verify),
        _ => {
            return Err(Error::UnsupportedCurve {
                curve,
                backend: BACKEND,
            })
        }
    };
    let len = curve.privlen();
    let (x, y) = key.public().ok_or(Error::InvalidKey {
        context: "verification requires the public point",
    })?;
    if sig.len() != 2 * len {
        return Err(Error::InvalidKey {
            context: "signature length",
        });
    }

    let mut block = ParmBlock::new();
    block.put_hash(DSA_HASH, slot, hash);
    block.put_tail(DSA_SIG_R, slot, &sig[..len]);
    block.put_tail(DSA_SIG_S, slot, &sig[len..]);
    block.put_tail(DSA_KEY, slot, x);
    block.put_tail(DSA_EXTRA, slot, y);

    if insn::kdsa(fc_verify, block.bytes_mut()) != 0 {
        return Err(Error::SignatureInvalid);
    }
    Ok(())
}

fn slot_array_32(slot: &mut [u8]) -> &mut [u8; 32] {
    (&mut slot[..32]).try_into().expect("32-byte slot")
}

fn slot_array_64(slot: &mut [u8]) -> &mut [u8; 64] {
    (&mut slot[..64]).try_into().expect("64-byte slot")
}
