//! In-memory EC key record
//!
//! An [`EcKey`] ties a curve to up to three fixed-length byte strings: the
//! private scalar D and the affine public coordinates (X, Y). Any component
//! may be absent — a signing key often arrives without its public half, a
//! verification key without D. Every stored buffer is exactly
//! `privlen(curve)` bytes; shorter input is left-padded with zeros at
//! construction so the hardware paths never see a short coordinate.
//!
//! Weierstrass coordinates are big-endian. The Montgomery and Edwards curves
//! keep their RFC 7748/8032 little-endian convention here; the
//! CPU-instruction layer flips them as it packs its parameter blocks.

use crate::error::{Error, Result};
use common::SecretBytes;
use params::CurveId;

/// EC key record: curve, optional private scalar, optional public point.
#[derive(Clone)]
pub struct EcKey {
    curve: CurveId,
    d: Option<SecretBytes>,
    x: Option<Vec<u8>>,
    y: Option<Vec<u8>>,
}

impl EcKey {
    /// An empty record for `curve`; components are attached with the
    /// `set_*` methods or filled in by key generation.
    pub fn new(curve: CurveId) -> Self {
        Self {
            curve,
            d: None,
            x: None,
            y: None,
        }
    }

    /// A record holding only the private scalar.
    pub fn from_private(curve: CurveId, d: &[u8]) -> Result<Self> {
        let mut key = Self::new(curve);
        key.set_private(d)?;
        Ok(key)
    }

    /// A record holding only the public point.
    pub fn from_public(curve: CurveId, x: &[u8], y: &[u8]) -> Result<Self> {
        let mut key = Self::new(curve);
        key.set_public(x, y)?;
        Ok(key)
    }

    /// A record holding private scalar and public point.
    pub fn from_parts(curve: CurveId, d: &[u8], x: &[u8], y: &[u8]) -> Result<Self> {
        let mut key = Self::new(curve);
        key.set_private(d)?;
        key.set_public(x, y)?;
        Ok(key)
    }

    pub fn curve(&self) -> CurveId {
        self.curve
    }

    /// Canonical component length for this key's curve.
    pub fn privlen(&self) -> usize {
        self.curve.privlen()
    }

    /// Private scalar, exactly `privlen` bytes, if present.
    pub fn d(&self) -> Option<&[u8]> {
        self.d.as_ref().map(|d| d.as_slice())
    }

    /// Affine x coordinate, exactly `privlen` bytes, if present.
    pub fn x(&self) -> Option<&[u8]> {
        self.x.as_deref()
    }

    /// Affine y coordinate, exactly `privlen` bytes, if present.
    pub fn y(&self) -> Option<&[u8]> {
        self.y.as_deref()
    }

    /// Both public coordinates, when the public half is complete.
    pub fn public(&self) -> Option<(&[u8], &[u8])> {
        match (&self.x, &self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Attach the private scalar, left-padding to `privlen` bytes.
    pub fn set_private(&mut self, d: &[u8]) -> Result<()> {
        let mut buf = SecretBytes::zeroed(self.privlen());
        pad_into(buf.as_mut_slice(), d)?;
        self.d = Some(buf);
        Ok(())
    }

    /// Attach the public point, left-padding each coordinate.
    pub fn set_public(&mut self, x: &[u8], y: &[u8]) -> Result<()> {
        self.x = Some(padded(self.privlen(), x)?);
        self.y = Some(padded(self.privlen(), y)?);
        Ok(())
    }

}

impl core::fmt::Debug for EcKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EcKey")
            .field("curve", &self.curve)
            .field("d", &self.d.as_ref().map(|_| "[REDACTED]"))
            .field("x", &self.x.as_ref().map(|v| hex_ish(v)))
            .field("y", &self.y.as_ref().map(|v| hex_ish(v)))
            .finish()
    }
}

fn hex_ish(v: &[u8]) -> String {
    v.iter().map(|b| format!("{:02x}", b)).collect()
}

fn padded(len: usize, src: &[u8]) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    pad_into(&mut buf, src)?;
    Ok(buf)
}

fn pad_into(dst: &mut [u8], src: &[u8]) -> Result<()> {
    if src.len() > dst.len() {
        return Err(Error::InvalidKey {
            context: "component longer than the curve allows",
        });
    }
    let off = dst.len() - src.len();
    dst[..off].fill(0);
    dst[off..].copy_from_slice(src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_are_padded_to_privlen() {
        let key = EcKey::from_private(CurveId::P521, &[0x01]).unwrap();
        let d = key.d().unwrap();
        assert_eq!(d.len(), 66);
        assert!(d[..65].iter().all(|&b| b == 0));
        assert_eq!(d[65], 0x01);
    }

    #[test]
    fn oversized_component_is_rejected() {
        let too_long = [0u8; 33];
        assert!(matches!(
            EcKey::from_private(CurveId::P256, &too_long),
            Err(Error::InvalidKey { .. })
        ));
    }

    #[test]
    fn public_is_complete_only_with_both_coordinates() {
        let mut key = EcKey::new(CurveId::P256);
        assert!(key.public().is_none());
        key.set_public(&[0x02; 32], &[0x03; 32]).unwrap();
        let (x, y) = key.public().unwrap();
        assert_eq!(x, &[0x02; 32][..]);
        assert_eq!(y, &[0x03; 32][..]);
    }

    #[test]
    fn debug_redacts_the_scalar() {
        let key = EcKey::from_private(CurveId::P256, &[0xAB; 32]).unwrap();
        let out = format!("{:?}", key);
        assert!(out.contains("REDACTED"));
        assert!(!out.contains("abab"));
    }
}
