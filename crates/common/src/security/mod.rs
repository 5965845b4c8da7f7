//! Secret data types with guaranteed zeroization
//!
//! [`SecretBytes`] is the workspace's container for private scalars, shared
//! secrets and random material whose length is only known at run time (it
//! follows the curve). The buffer is wiped on drop through `zeroize`, which
//! places a compiler barrier behind the wipe so it cannot be optimized away.

use core::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Variable-length secret buffer that is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes {
    data: Vec<u8>,
}

impl SecretBytes {
    /// Take ownership of `data`.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Copy a slice into a fresh secret buffer.
    pub fn from_slice(slice: &[u8]) -> Self {
        Self {
            data: slice.to_vec(),
        }
    }

    /// An all-zero buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self {
            data: vec![0u8; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl AsRef<[u8]> for SecretBytes {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl AsMut<[u8]> for SecretBytes {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Constant-time comparison; the length check is the only data-dependent
/// branch and lengths are public (they follow the curve).
impl PartialEq for SecretBytes {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len() && bool::from(self.data.ct_eq(&other.data))
    }
}

impl Eq for SecretBytes {}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes({} bytes, [REDACTED])", self.data.len())
    }
}
