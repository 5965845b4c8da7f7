//! In-place byte reversal
//!
//! The Montgomery and Edwards curves expose little-endian field elements
//! while the CPU instructions consume big-endian parameter blocks. The two
//! flip widths below match the block slot widths (32 for the 255-bit curves,
//! 64 for the 448-bit curves, which travel zero-padded inside 64-byte
//! fields).

/// Reverse a 32-byte field in place.
pub fn flip_endian_32(buf: &mut [u8; 32]) {
    buf.reverse();
}

/// Reverse a 64-byte field in place.
pub fn flip_endian_64(buf: &mut [u8; 64]) {
    buf.reverse();
}
