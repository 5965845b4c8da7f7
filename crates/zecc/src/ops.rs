//! Top-level operations and backend dispatch
//!
//! Each operation tries the CPU-instruction path first when MSA 9 is
//! available, unless offload forces the card (key generation always tries
//! the CPU). A curve the instructions do not implement escalates to the
//! coprocessor; any other instruction outcome, success or failure, is final.
//! Without an online card the escalation ends in `NoDevice`; with a card
//! flagged online but no loaded driver it ends in a hardware error.

use api::{Capabilities, EcKey, Error, Result};
use common::SecretBytes;
use params::CurveId;
use rand::{CryptoRng, RngCore};

use crate::card::{self, Coprocessor, CprbBuffer};
use crate::cpacf;
use crate::soft;

/// Entry point tying the capability flags to an optional coprocessor
/// channel. `card: None` models an online-flagged card whose driver is not
/// loaded.
pub struct Accelerator<D> {
    caps: Capabilities,
    card: Option<D>,
}

impl<D: Coprocessor> Accelerator<D> {
    pub fn new(caps: Capabilities, card: Option<D>) -> Self {
        Self { caps, card }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// The installed coprocessor channel, if any.
    pub fn card_ref(&self) -> Option<&D> {
        self.card.as_ref()
    }

    fn card(&self) -> Result<&D> {
        if !self.caps.online_card {
            return Err(Error::NoDevice);
        }
        self.card.as_ref().ok_or(Error::Hardware {
            context: "coprocessor driver not loaded",
        })
    }

    fn try_cpu(&self) -> bool {
        self.caps.msa9 && !self.caps.ica_offload
    }

    /// ECDH shared-secret derivation: own private key `priv_a`, peer public
    /// key `pub_b`. The secret is the affine x coordinate of `d_A · Q_B`,
    /// `privlen` bytes.
    pub fn ecdh(&self, priv_a: &EcKey, pub_b: &EcKey) -> Result<SecretBytes> {
        let curve = priv_a.curve();
        let privlen = curve.privlen();

        if self.try_cpu() {
            let d = priv_a.d().ok_or(Error::InvalidKey {
                context: "ECDH requires the private scalar",
            })?;
            let (x, y) = pub_b.public().ok_or(Error::InvalidKey {
                context: "ECDH requires the peer public point",
            })?;
            let mut z = SecretBytes::zeroed(privlen);
            let rc = cpacf::scalar_mul(curve, d, x, y, Some(z.as_mut_slice()), None);
            match rc {
                Ok(()) => return Ok(z),
                Err(Error::UnsupportedCurve { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let card = self.card()?;
        let mut buf = CprbBuffer::new();
        card::build_ecdh_request(&mut buf, priv_a, pub_b)?;
        card.transfer(&mut buf)?;
        card::parse_ecdh_reply(&buf, privlen)
    }

    /// ECDSA signature over a prehashed message, returned as `r ‖ s` of
    /// `2 × privlen` bytes.
    pub fn ecdsa_sign(&self, key: &EcKey, hash: &[u8]) -> Result<Vec<u8>> {
        let curve = key.curve();
        let privlen = curve.privlen();
        let mut sig = vec![0u8; 2 * privlen];

        if self.try_cpu() {
            let rc = cpacf::ecdsa_sign(key, hash, &mut sig, None);
            match rc {
                Ok(()) => return Ok(sig),
                Err(Error::UnsupportedCurve { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let card = self.card()?;
        let (x, y) = provide_pubkey(key)?;
        let mut buf = CprbBuffer::new();
        card::build_ecdsa_sign_request(&mut buf, key, &x, &y, hash)?;
        card.transfer(&mut buf)?;
        card::parse_ecdsa_sign_reply(&buf, privlen, &mut sig)?;
        Ok(sig)
    }

    /// ECDSA verification of an `r ‖ s` signature over a prehashed message.
    pub fn ecdsa_verify(&self, key: &EcKey, hash: &[u8], sig: &[u8]) -> Result<()> {
        if self.try_cpu() {
            match cpacf::ecdsa_verify(key, hash, sig) {
                Err(Error::UnsupportedCurve { .. }) => {}
                other => return other,
            }
        }

        let card = self.card()?;
        let mut buf = CprbBuffer::new();
        card::build_ecdsa_verify_request(&mut buf, key, hash, sig)?;
        card.transfer(&mut buf)?;
        card::parse_ecdsa_verify_reply(&buf)
    }

    /// EC key generation. Always tries the CPU path first when MSA 9 is
    /// available, offload notwithstanding.
    pub fn generate_key<R: CryptoRng + RngCore>(
        &self,
        curve: CurveId,
        rng: &mut R,
    ) -> Result<EcKey> {
        if self.caps.msa9 {
            match keygen_cpacf(curve, rng) {
                Err(Error::UnsupportedCurve { .. }) => {}
                other => return other,
            }
        }

        let card = self.card()?;
        let mut buf = CprbBuffer::new();
        card::build_eckeygen_request(&mut buf, curve)?;
        card.transfer(&mut buf)?;
        let mut key = EcKey::new(curve);
        card::parse_eckeygen_reply(&buf, &mut key)?;
        Ok(key)
    }
}

/// The card demands a complete key token for signing. Use the record's
/// public point when present, otherwise materialize it by multiplying the
/// base point.
fn provide_pubkey(key: &EcKey) -> Result<(Vec<u8>, Vec<u8>)> {
    if let Some((x, y)) = key.public() {
        return Ok((x.to_vec(), y.to_vec()));
    }
    let curve = key.curve();
    let d = key.d().ok_or(Error::InvalidKey {
        context: "signing requires the private scalar",
    })?;
    let (bx, by) = base_point(curve)?;
    soft::wei_scalar_mul(curve, d, bx, by).ok_or(Error::Hardware {
        context: "public key derivation",
    })
}

/// Key generation on the CPU path: a uniformly random scalar in [1, order)
/// by rejection sampling, then one base-point multiplication for the public
/// point. Rejected candidates are overwritten in place; the final scalar
/// lives in the key record's scrubbed buffer.
fn keygen_cpacf<R: CryptoRng + RngCore>(curve: CurveId, rng: &mut R) -> Result<EcKey> {
    let order = curve.order().ok_or(Error::UnsupportedCurve {
        curve,
        backend: "cpacf",
    })?;
    let (bx, by) = base_point(curve)?;
    let privlen = curve.privlen();

    let mut d = SecretBytes::zeroed(privlen);
    loop {
        rng.fill_bytes(d.as_mut_slice());
        // Trim to the order's bit length so the loop terminates quickly.
        d.as_mut_slice()[0] &= top_mask(order[0]);
        let candidate = d.as_slice();
        if candidate.iter().all(|&b| b == 0) || candidate >= order {
            continue;
        }
        break;
    }

    let mut x = vec![0u8; privlen];
    let mut y = vec![0u8; privlen];
    cpacf::scalar_mul(curve, d.as_slice(), bx, by, Some(&mut x), Some(&mut y))?;

    let mut key = EcKey::new(curve);
    key.set_private(d.as_slice())?;
    key.set_public(&x, &y)?;
    Ok(key)
}

fn base_point(curve: CurveId) -> Result<(&'static [u8], &'static [u8])> {
    match (curve.base_x(), curve.base_y()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(Error::UnsupportedCurve {
            curve,
            backend: "cpacf",
        }),
    }
}

/// Smallest all-ones mask covering the byte's significant bits.
fn top_mask(top: u8) -> u8 {
    if top == 0 {
        0
    } else {
        0xFF >> top.leading_zeros()
    }
}
