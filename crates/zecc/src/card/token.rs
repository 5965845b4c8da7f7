//! CCA key tokens
//!
//! A key travels to the coprocessor as a token: a 4-byte length/flags
//! prefix, a token header (id 0x1E), a private-key section (id 0x20) with
//! its associated data and the clear scalar, and a public-key section
//! (id 0x21) holding the uncompressed point. Every numeric field is
//! big-endian; all layouts are written byte-by-byte at fixed offsets.

use super::{put_u16, put_u8};
use params::CurveId;

pub(crate) const TOKEN_HDR_ID: u8 = 0x1E;
pub(crate) const PRIV_SECTION_ID: u8 = 0x20;
pub(crate) const PUB_SECTION_ID: u8 = 0x21;
/// Clear (unencrypted) key material.
pub(crate) const KEY_FORMAT_UNENCRYPTED: u8 = 0x40;
/// Uncompressed point encoding.
pub(crate) const COMPRESS_UNCOMPRESSED: u8 = 0x04;
/// Key usage: key agreement.
pub(crate) const USAGE_KEY_AGREEMENT: u8 = 0xC0;
/// Key usage: signature generation.
pub(crate) const USAGE_SIGNATURE: u8 = 0x80;

pub(crate) const TOKEN_HDR_SIZE: usize = 8;
pub(crate) const PRIV_SECTION_SIZE: usize = 20;
pub(crate) const ADATA_SIZE: usize = 8;
pub(crate) const PUB_SECTION_SIZE: usize = 12;

/// Total length of a combined private+public key token.
pub(crate) const fn key_token_len(privlen: usize) -> usize {
    4 + TOKEN_HDR_SIZE
        + PRIV_SECTION_SIZE
        + ADATA_SIZE
        + privlen
        + PUB_SECTION_SIZE
        + 1
        + 2 * privlen
}

/// Total length of a standalone public-key block.
pub(crate) const fn public_key_block_len(privlen: usize) -> usize {
    4 + TOKEN_HDR_SIZE + PUB_SECTION_SIZE + 1 + 2 * privlen
}

/// Length of the skeleton token sent with a key-generation request.
pub(crate) const KEYGEN_TOKEN_LEN: usize =
    4 + TOKEN_HDR_SIZE + PRIV_SECTION_SIZE + ADATA_SIZE + PUB_SECTION_SIZE;

/// 2-byte key-block length field.
pub(crate) fn make_keyblock_length(buf: &mut [u8], off: usize, len: usize) -> usize {
    put_u16(buf, off, len as u16);
    2
}

/// Null-key filler between ECDH key tokens.
pub(crate) fn make_nullkey(buf: &mut [u8], off: usize) -> usize {
    buf[off] = 0x00;
    buf[off + 1] = 0x44;
    2
}

/// ECC null token terminating a key-generation key block.
pub(crate) fn make_ecc_null_token(buf: &mut [u8], off: usize) -> usize {
    put_u16(buf, off, 0x0005);
    put_u16(buf, off + 2, 0x0010);
    put_u8(buf, off + 4, 0x00);
    5
}

fn token_hdr(buf: &mut [u8], off: usize, token_len: usize) {
    put_u8(buf, off, TOKEN_HDR_ID);
    // Header length excludes the two 2-byte prefix fields.
    put_u16(buf, off + 2, (token_len - 4) as u16);
}

fn priv_section(
    buf: &mut [u8],
    off: usize,
    curve_type: u8,
    bitlen: u16,
    usage: u8,
    formatted_len: usize,
) {
    put_u8(buf, off, PRIV_SECTION_ID);
    put_u8(buf, off + 1, 0x00);
    put_u16(
        buf,
        off + 2,
        (PRIV_SECTION_SIZE + ADATA_SIZE + formatted_len) as u16,
    );
    put_u8(buf, off + 8, usage);
    put_u8(buf, off + 9, curve_type);
    put_u8(buf, off + 10, KEY_FORMAT_UNENCRYPTED);
    put_u16(buf, off + 12, bitlen);
    put_u16(buf, off + 14, ADATA_SIZE as u16);
    put_u16(buf, off + 16, ADATA_SIZE as u16);
    put_u16(buf, off + 18, formatted_len as u16);
}

// The associated data mirrors the private section: same curve type, bit
// length, usage and format flags.
fn adata(buf: &mut [u8], off: usize, curve_type: u8, bitlen: u16, usage: u8) {
    put_u8(buf, off, ADATA_SIZE as u8);
    put_u8(buf, off + 2, curve_type);
    put_u16(buf, off + 4, bitlen);
    put_u8(buf, off + 6, usage);
    put_u8(buf, off + 7, KEY_FORMAT_UNENCRYPTED);
}

fn pub_section(buf: &mut [u8], off: usize, curve_type: u8, bitlen: u16, x: &[u8], y: &[u8]) -> usize {
    let privlen = x.len();
    put_u8(buf, off, PUB_SECTION_ID);
    put_u8(buf, off + 1, 0x00);
    put_u16(buf, off + 2, (PUB_SECTION_SIZE + 1 + 2 * privlen) as u16);
    put_u8(buf, off + 6, curve_type);
    put_u16(buf, off + 8, bitlen);
    // Point length includes the compression flag byte.
    put_u16(buf, off + 10, (2 * privlen + 1) as u16);
    put_u8(buf, off + 12, COMPRESS_UNCOMPRESSED);
    buf[off + 13..off + 13 + privlen].copy_from_slice(x);
    buf[off + 13 + privlen..off + 13 + 2 * privlen].copy_from_slice(y);
    PUB_SECTION_SIZE + 1 + 2 * privlen
}

/// Combined key token: private scalar `d` plus public point `(x, y)`.
///
/// In an ECDH request the point belongs to the peer; in a signing request it
/// is the signer's own, materialized by the caller when the record lacks it.
pub(crate) fn make_private_key_token(
    buf: &mut [u8],
    off: usize,
    curve: CurveId,
    curve_type: u8,
    usage: u8,
    flags: u16,
    d: &[u8],
    x: &[u8],
    y: &[u8],
) -> usize {
    let privlen = curve.privlen();
    let bitlen = curve.priv_bitlen();
    let total = key_token_len(privlen);

    put_u16(buf, off, total as u16);
    put_u16(buf, off + 2, flags);
    token_hdr(buf, off + 4, total);

    let privsec = off + 4 + TOKEN_HDR_SIZE;
    priv_section(buf, privsec, curve_type, bitlen, usage, privlen);
    adata(buf, privsec + PRIV_SECTION_SIZE, curve_type, bitlen, usage);

    let key = privsec + PRIV_SECTION_SIZE + ADATA_SIZE;
    buf[key..key + privlen].copy_from_slice(d);

    pub_section(buf, key + privlen, curve_type, bitlen, x, y);
    total
}

/// Standalone public-key block, used by verification requests.
pub(crate) fn make_public_key_block(
    buf: &mut [u8],
    off: usize,
    curve: CurveId,
    curve_type: u8,
    x: &[u8],
    y: &[u8],
) -> usize {
    let privlen = curve.privlen();
    let total = public_key_block_len(privlen);

    put_u16(buf, off, total as u16);
    token_hdr(buf, off + 4, total);
    pub_section(
        buf,
        off + 4 + TOKEN_HDR_SIZE,
        curve_type,
        curve.priv_bitlen(),
        x,
        y,
    );
    total
}

/// Skeleton token for key generation: sections are present but carry no
/// scalar and no point; the card fills both in its reply.
pub(crate) fn make_keygen_key_token(
    buf: &mut [u8],
    off: usize,
    curve: CurveId,
    curve_type: u8,
) -> usize {
    let bitlen = curve.priv_bitlen();

    put_u16(buf, off, KEYGEN_TOKEN_LEN as u16);
    put_u16(buf, off + 2, 0x0020);
    token_hdr(buf, off + 4, KEYGEN_TOKEN_LEN);

    let privsec = off + 4 + TOKEN_HDR_SIZE;
    priv_section(buf, privsec, curve_type, bitlen, USAGE_SIGNATURE, 0);
    adata(
        buf,
        privsec + PRIV_SECTION_SIZE,
        curve_type,
        bitlen,
        USAGE_SIGNATURE,
    );

    let pubsec = privsec + PRIV_SECTION_SIZE + ADATA_SIZE;
    put_u8(buf, pubsec, PUB_SECTION_ID);
    put_u16(buf, pubsec + 2, PUB_SECTION_SIZE as u16);
    put_u8(buf, pubsec + 6, curve_type);
    put_u16(buf, pubsec + 8, bitlen);
    put_u16(buf, pubsec + 10, 0);

    KEYGEN_TOKEN_LEN
}
