//! Shared support code for the zecc workspace
//!
//! Two concerns live here: containers for secret byte material with
//! guaranteed zeroization, and the in-place endianness flips used when
//! shuttling little-endian curve data through big-endian hardware parameter
//! blocks.

pub mod endian;
pub mod security;

pub use security::SecretBytes;
