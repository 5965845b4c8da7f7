//! CCA coprocessor backend
//!
//! Requests to the card are nested binary control blocks: an outer CPRBX
//! envelope, an operation parameter block (subfunction code, rule array,
//! vendor-unique data), a key-block length field and one or more key tokens.
//! The whole exchange lives in a single allocation — request CPRBX and
//! parameter block in the first half, pre-sized reply space in the second —
//! described to the zcrypt driver by an `ica_xcRB` ioctl argument pointing
//! into it.
//!
//! Every multi-byte field on the wire is big-endian and written explicitly
//! at its fixed offset; only the ioctl descriptor itself, which is kernel
//! ABI rather than wire data, is a `#[repr(C, packed)]` struct. The buffer
//! is scrubbed on drop since key tokens carry clear private scalars.

use api::{EcKey, Error, Result};
use common::SecretBytes;
use params::CurveId;
use zeroize::Zeroize;

pub(crate) mod token;

#[cfg(test)]
mod tests;

/// Size of the CPRBX envelope.
pub const CPRBX_SIZE: usize = 220;
/// Space reserved for a parameter block, request and reply alike.
pub const PARMB_SIZE: usize = 2048;
/// One allocation holds request and reply halves.
pub const BUFFER_SIZE: usize = 2 * (CPRBX_SIZE + PARMB_SIZE);

/// Offset of the reply CPRBX within the buffer.
pub const REPLY_BASE: usize = CPRBX_SIZE + PARMB_SIZE;
const REPLY_PARM: usize = REPLY_BASE + CPRBX_SIZE;

/// CCA reason code: the digital signature failed verification.
pub const RS_SIGNATURE_INVALID: u16 = 429;

// CPRBX field offsets.
const CPRB_LEN: usize = 0;
const CPRB_VER_ID: usize = 2;
const FUNC_ID: usize = 6;
const REQ_PARML: usize = 12;
const RPL_MSGBL: usize = 20;
const REQ_PARMB: usize = 56;
const RPL_PARMB: usize = 88;
const CCP_RTCODE: usize = 144;
const CCP_RSCODE: usize = 146;
const DOMAIN: usize = 170;

const CPRB_VERSION: u8 = 0x02;
const CPRB_FUNC_ID: &[u8; 2] = b"T2";

// Subfunction codes, ASCII pairs.
const SUBFUNC_ECDH: u16 = 0x4448; // "DH"
const SUBFUNC_ECDSA_SIGN: u16 = 0x5347; // "SG"
const SUBFUNC_ECDSA_VERIFY: u16 = 0x5356; // "SV"
const SUBFUNC_ECKEYGEN: u16 = 0x5047; // "PG"

// Rule-array length field covers itself plus the 8-byte command.
const RULE_ARRAY_LEN: u16 = 0x000A;
const RULE_ARRAY_SIZE: usize = 10;

/// Fixed vendor-unique data of an ECDH request.
const ECDH_VUD: [u8; 20] = [
    0x00, 0x14, // total length
    0x00, 0x04, 0x00, 0x91, //
    0x00, 0x06, 0x00, 0x93, 0x00, 0x00, //
    0x00, 0x04, 0x00, 0x90, //
    0x00, 0x04, 0x00, 0x92, //
];

const AGENT_ID: u16 = 0x4341;
const AUTOSELECT: u32 = 0xFFFF_FFFF;

pub(crate) fn put_u8(buf: &mut [u8], off: usize, v: u8) {
    buf[off] = v;
}

pub(crate) fn put_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_u64(buf: &mut [u8], off: usize, v: u64) {
    buf[off..off + 8].copy_from_slice(&v.to_be_bytes());
}

pub(crate) fn get_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([buf[off], buf[off + 1]])
}

pub(crate) fn get_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

/// Request/reply buffer for one coprocessor exchange. Scrubbed on drop.
pub struct CprbBuffer {
    buf: Vec<u8>,
}

impl CprbBuffer {
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; BUFFER_SIZE],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Default for CprbBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CprbBuffer {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

/// Channel to a CCA coprocessor. The production implementation is
/// [`ZcryptAdapter`]; tests substitute their own card.
pub trait Coprocessor {
    /// Submit the request in `buf` and fill in its reply half.
    fn transfer(&self, buf: &mut CprbBuffer) -> Result<()>;
}

/// `ica_xcRB`: the ioctl argument describing one request/reply exchange.
/// Kernel ABI layout, hence a packed C struct rather than wire packing.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct IcaXcrb {
    pub agent_id: u16,
    pub user_defined: u32,
    pub request_id: u16,
    pub request_control_blk_length: u32,
    _padding1: [u8; 12],
    pub request_control_blk_addr: u64,
    pub request_data_length: u32,
    _padding2: [u8; 12],
    pub request_data_address: u64,
    pub reply_control_blk_length: u32,
    _padding3: [u8; 12],
    pub reply_control_blk_addr: u64,
    pub reply_data_length: u32,
    _padding4: [u8; 12],
    pub reply_data_addr: u64,
    pub priority_window: u16,
    pub status: u32,
}

/// Describe `buf` to the driver: lengths from the request CPRBX, addresses
/// of the two halves, any online card.
pub(crate) fn finalize_xcrb(buf: &CprbBuffer) -> IcaXcrb {
    let base = buf.bytes().as_ptr() as u64;
    IcaXcrb {
        agent_id: AGENT_ID,
        user_defined: AUTOSELECT,
        request_id: 0,
        request_control_blk_length: get_u16(buf.bytes(), CPRB_LEN) as u32
            + get_u32(buf.bytes(), REQ_PARML),
        _padding1: [0; 12],
        request_control_blk_addr: base,
        request_data_length: 0,
        _padding2: [0; 12],
        request_data_address: 0,
        reply_control_blk_length: get_u32(buf.bytes(), RPL_MSGBL),
        _padding3: [0; 12],
        reply_control_blk_addr: base + REPLY_BASE as u64,
        reply_data_length: 0,
        _padding4: [0; 12],
        reply_data_addr: 0,
        priority_window: 0,
        status: 0,
    }
}

/// Default AP domain, read from sysfs once. −1 when the file is absent or
/// unparsable; requests then carry −1 and the card may reject them, which
/// is not treated as fatal here.
fn default_domain() -> i16 {
    use std::sync::OnceLock;
    static DOMAIN: OnceLock<i16> = OnceLock::new();
    *DOMAIN.get_or_init(|| {
        std::fs::read_to_string("/sys/bus/ap/ap_domain")
            .ok()
            .and_then(|s| s.trim().parse::<i16>().ok())
            .unwrap_or(-1)
    })
}

/// Write the request CPRBX for a parameter block of `parml` bytes.
fn make_cprbx(buf: &mut CprbBuffer, parml: usize) -> usize {
    let base = buf.bytes().as_ptr() as u64;
    let b = buf.bytes_mut();
    put_u16(b, CPRB_LEN, CPRBX_SIZE as u16);
    put_u8(b, CPRB_VER_ID, CPRB_VERSION);
    b[FUNC_ID..FUNC_ID + 2].copy_from_slice(CPRB_FUNC_ID);
    put_u32(b, REQ_PARML, parml as u32);
    put_u16(b, DOMAIN, default_domain() as u16);
    put_u32(b, RPL_MSGBL, (CPRBX_SIZE + PARMB_SIZE) as u32);
    put_u64(b, REQ_PARMB, base + CPRBX_SIZE as u64);
    put_u64(b, RPL_PARMB, base + REPLY_PARM as u64);
    CPRBX_SIZE
}

fn rule_array(buf: &mut [u8], off: usize, cmd: &[u8; 8]) -> usize {
    put_u16(buf, off, RULE_ARRAY_LEN);
    buf[off + 2..off + 10].copy_from_slice(cmd);
    RULE_ARRAY_SIZE
}

fn ecdh_parmblock(buf: &mut [u8], off: usize) -> usize {
    put_u16(buf, off, SUBFUNC_ECDH);
    rule_array(buf, off + 2, b"PASSTHRU");
    buf[off + 12..off + 32].copy_from_slice(&ECDH_VUD);
    32
}

fn ecdsa_sign_parmblock(buf: &mut [u8], off: usize, hash: &[u8]) -> usize {
    put_u16(buf, off, SUBFUNC_ECDSA_SIGN);
    rule_array(buf, off + 2, b"ECDSA   ");
    put_u16(buf, off + 12, (hash.len() + 4) as u16);
    put_u16(buf, off + 14, (hash.len() + 2) as u16);
    buf[off + 16..off + 16 + hash.len()].copy_from_slice(hash);
    16 + hash.len()
}

fn ecdsa_verify_parmblock(buf: &mut [u8], off: usize, hash: &[u8], sig: &[u8]) -> usize {
    put_u16(buf, off, SUBFUNC_ECDSA_VERIFY);
    rule_array(buf, off + 2, b"ECDSA   ");
    put_u16(buf, off + 12, (2 + (2 + hash.len()) + (2 + sig.len())) as u16);
    put_u16(buf, off + 14, (2 + hash.len()) as u16);
    buf[off + 16..off + 16 + hash.len()].copy_from_slice(hash);
    let tail = off + 16 + hash.len();
    put_u16(buf, tail, (2 + sig.len()) as u16);
    buf[tail + 2..tail + 2 + sig.len()].copy_from_slice(sig);
    16 + hash.len() + 2 + sig.len()
}

fn eckeygen_parmblock(buf: &mut [u8], off: usize) -> usize {
    put_u16(buf, off, SUBFUNC_ECKEYGEN);
    rule_array(buf, off + 2, b"CLEAR   ");
    put_u16(buf, off + 12, 0x0002);
    14
}

fn routable_curve_type(curve: CurveId) -> Result<u8> {
    curve.cca_curve_type().ok_or(Error::Hardware {
        context: "curve not routable to the coprocessor",
    })
}

/// ECDH request: parameter block, key-block length, then the same key token
/// twice — own private key with the peer's public point — separated and
/// terminated by four null keys. The firmware demands the duplication.
pub(crate) fn build_ecdh_request(
    buf: &mut CprbBuffer,
    priv_a: &EcKey,
    pub_b: &EcKey,
) -> Result<()> {
    let curve = priv_a.curve();
    let curve_type = routable_curve_type(curve)?;
    let privlen = curve.privlen();
    let d = priv_a.d().ok_or(Error::InvalidKey {
        context: "ECDH requires the private scalar",
    })?;
    let (bx, by) = pub_b.public().ok_or(Error::InvalidKey {
        context: "ECDH requires the peer public point",
    })?;

    let token_len = token::key_token_len(privlen);
    let keyblock_len = 2 + 2 * token_len + 4 * 2;
    let parml = 32 + keyblock_len;

    let mut off = make_cprbx(buf, parml);
    let b = buf.bytes_mut();
    off += ecdh_parmblock(b, off);
    off += token::make_keyblock_length(b, off, keyblock_len);
    for _ in 0..2 {
        off += token::make_private_key_token(
            b,
            off,
            curve,
            curve_type,
            token::USAGE_KEY_AGREEMENT,
            0,
            d,
            bx,
            by,
        );
        off += token::make_nullkey(b, off);
    }
    off += token::make_nullkey(b, off);
    off += token::make_nullkey(b, off);
    debug_assert_eq!(off, CPRBX_SIZE + parml);
    Ok(())
}

/// ECDSA signing request. The card insists on a complete token, so the
/// caller passes the public point even though only `d` signs.
pub(crate) fn build_ecdsa_sign_request(
    buf: &mut CprbBuffer,
    key: &EcKey,
    x: &[u8],
    y: &[u8],
    hash: &[u8],
) -> Result<()> {
    let curve = key.curve();
    let curve_type = routable_curve_type(curve)?;
    let d = key.d().ok_or(Error::InvalidKey {
        context: "signing requires the private scalar",
    })?;

    let token_len = token::key_token_len(curve.privlen());
    let keyblock_len = 2 + token_len;
    let parml = 16 + hash.len() + keyblock_len;

    let mut off = make_cprbx(buf, parml);
    let b = buf.bytes_mut();
    off += ecdsa_sign_parmblock(b, off, hash);
    off += token::make_keyblock_length(b, off, keyblock_len);
    off += token::make_private_key_token(
        b,
        off,
        curve,
        curve_type,
        token::USAGE_SIGNATURE,
        0x0020,
        d,
        x,
        y,
    );
    debug_assert_eq!(off, CPRBX_SIZE + parml);
    Ok(())
}

/// ECDSA verification request.
pub(crate) fn build_ecdsa_verify_request(
    buf: &mut CprbBuffer,
    key: &EcKey,
    hash: &[u8],
    sig: &[u8],
) -> Result<()> {
    let curve = key.curve();
    let curve_type = routable_curve_type(curve)?;
    let (x, y) = key.public().ok_or(Error::InvalidKey {
        context: "verification requires the public point",
    })?;

    let keyblock_len = 2 + token::public_key_block_len(curve.privlen());
    let parml = 16 + hash.len() + 2 + sig.len() + keyblock_len;

    let mut off = make_cprbx(buf, parml);
    let b = buf.bytes_mut();
    off += ecdsa_verify_parmblock(b, off, hash, sig);
    off += token::make_keyblock_length(b, off, keyblock_len);
    off += token::make_public_key_block(b, off, curve, curve_type, x, y);
    debug_assert_eq!(off, CPRBX_SIZE + parml);
    Ok(())
}

/// Key-generation request: a skeleton token plus one ECC null token.
pub(crate) fn build_eckeygen_request(buf: &mut CprbBuffer, curve: CurveId) -> Result<()> {
    let curve_type = routable_curve_type(curve)?;

    let keyblock_len = 2 + token::KEYGEN_TOKEN_LEN + 5;
    let parml = 14 + keyblock_len;

    let mut off = make_cprbx(buf, parml);
    let b = buf.bytes_mut();
    off += eckeygen_parmblock(b, off);
    off += token::make_keyblock_length(b, off, keyblock_len);
    off += token::make_keygen_key_token(b, off, curve, curve_type);
    off += token::make_ecc_null_token(b, off);
    debug_assert_eq!(off, CPRBX_SIZE + parml);
    Ok(())
}

/// ECDH reply: a key-length field whose value less its 4-byte prefix must
/// equal `privlen`, followed by the raw shared secret.
pub(crate) fn parse_ecdh_reply(buf: &CprbBuffer, privlen: usize) -> Result<SecretBytes> {
    let b = buf.bytes();
    let key_len = get_u16(b, REPLY_PARM + 6) as usize;
    let actual = key_len.wrapping_sub(4);
    if actual != privlen {
        return Err(Error::ReplyFormat {
            context: "ECDH reply key length",
            expected: privlen,
            actual,
        });
    }
    let z = REPLY_PARM + 8;
    Ok(SecretBytes::from_slice(&b[z..z + privlen]))
}

/// ECDSA signing reply: the VUD length less its 8-byte header must equal
/// `2 × privlen`; the signature follows.
pub(crate) fn parse_ecdsa_sign_reply(buf: &CprbBuffer, privlen: usize, sig: &mut [u8]) -> Result<()> {
    let b = buf.bytes();
    let vud_len = get_u16(b, REPLY_PARM + 4) as usize;
    let actual = vud_len.wrapping_sub(8);
    if actual != 2 * privlen {
        return Err(Error::ReplyFormat {
            context: "ECDSA sign reply signature length",
            expected: 2 * privlen,
            actual,
        });
    }
    let s = REPLY_PARM + 8;
    sig.copy_from_slice(&b[s..s + 2 * privlen]);
    Ok(())
}

/// ECDSA verification reply: the verdict is in the reply CPRBX return and
/// reason codes; the specific pair (4, RS_SIGNATURE_INVALID) means the
/// signature was cryptographically rejected.
pub(crate) fn parse_ecdsa_verify_reply(buf: &CprbBuffer) -> Result<()> {
    let b = buf.bytes();
    let rtcode = get_u16(b, REPLY_BASE + CCP_RTCODE);
    let rscode = get_u16(b, REPLY_BASE + CCP_RSCODE);
    if rtcode == 4 && rscode == RS_SIGNATURE_INVALID {
        return Err(Error::SignatureInvalid);
    }
    if rtcode != 0 || rscode != 0 {
        return Err(Error::Hardware {
            context: "coprocessor ECDSA verify",
        });
    }
    Ok(())
}

/// Key-generation reply: the private section's formatted-data length must
/// equal `privlen`; the public section follows `section_len` bytes after the
/// private section start and must carry an uncompressed point.
pub(crate) fn parse_eckeygen_reply(buf: &CprbBuffer, key: &mut EcKey) -> Result<()> {
    let b = buf.bytes();
    let privlen = key.curve().privlen();

    let privsec = REPLY_PARM + 20;
    let formatted = get_u16(b, privsec + 18) as usize;
    if formatted != privlen {
        return Err(Error::ReplyFormat {
            context: "key-generation reply scalar length",
            expected: privlen,
            actual: formatted,
        });
    }

    let section_len = get_u16(b, privsec + 2) as usize;
    let pubsec = privsec + section_len;
    if pubsec + 13 + 2 * privlen > BUFFER_SIZE {
        return Err(Error::ReplyFormat {
            context: "key-generation reply section length",
            expected: token::PRIV_SECTION_SIZE + token::ADATA_SIZE + privlen,
            actual: section_len,
        });
    }

    let d = privsec + token::PRIV_SECTION_SIZE + token::ADATA_SIZE;
    key.set_private(&b[d..d + privlen])?;

    if b[pubsec + 12] != token::COMPRESS_UNCOMPRESSED {
        return Err(Error::Hardware {
            context: "key-generation reply point compression",
        });
    }
    let xy = pubsec + 13;
    key.set_public(&b[xy..xy + privlen], &b[xy + privlen..xy + 2 * privlen])?;
    Ok(())
}

const _: () = assert!(BUFFER_SIZE == 4536);

/// The zcrypt character device.
#[cfg(target_os = "linux")]
pub struct ZcryptAdapter {
    device: std::fs::File,
}

#[cfg(target_os = "linux")]
impl ZcryptAdapter {
    const DEVICE_PATH: &'static str = "/dev/z90crypt";

    /// ioctl number: direction read|write, magic 'z', number 0x81, size 0.
    const ZSECSENDCPRB: u64 = (3u64 << 30) | ((b'z' as u64) << 8) | 0x81;

    pub fn open() -> Result<Self> {
        let device = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(Self::DEVICE_PATH)
            .map_err(|_| Error::NoDevice)?;
        Ok(Self { device })
    }
}

#[cfg(target_os = "linux")]
impl Coprocessor for ZcryptAdapter {
    fn transfer(&self, buf: &mut CprbBuffer) -> Result<()> {
        use std::os::fd::AsRawFd;

        let mut xcrb = finalize_xcrb(buf);
        let rc = unsafe {
            libc::ioctl(
                self.device.as_raw_fd(),
                Self::ZSECSENDCPRB as _,
                &mut xcrb as *mut IcaXcrb,
            )
        };
        if rc != 0 {
            return Err(Error::Hardware {
                context: "ZSECSENDCPRB ioctl",
            });
        }
        Ok(())
    }
}
