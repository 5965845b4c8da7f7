use super::*;
use params::CurveId;

fn p256_priv() -> EcKey {
    EcKey::from_private(CurveId::P256, &[0xAA; 32]).unwrap()
}

fn p256_pub() -> EcKey {
    EcKey::from_public(CurveId::P256, &[0xBB; 32], &[0xCC; 32]).unwrap()
}

/// Every offset below is computed by hand from the wire layout so the
/// builders are checked against the format, not against themselves.
#[test]
fn ecdh_request_layout_p256() {
    let mut buf = CprbBuffer::new();
    build_ecdh_request(&mut buf, &p256_priv(), &p256_pub()).unwrap();
    let b = buf.bytes();

    // CPRBX envelope.
    assert_eq!(get_u16(b, 0), 220);
    assert_eq!(b[2], 0x02);
    assert_eq!(&b[6..8], b"T2");
    assert_eq!(get_u32(b, 12), 340); // parameter block length
    assert_eq!(get_u32(b, 20), 2268); // reply message block limit
    assert_eq!(get_u16(b, 170), default_domain() as u16);

    // Parameter block: subfunction, rule array, fixed VUD.
    assert_eq!(get_u16(b, 220), 0x4448);
    assert_eq!(get_u16(b, 222), 0x000A);
    assert_eq!(&b[224..232], b"PASSTHRU");
    assert_eq!(
        &b[232..252],
        &[
            0x00, 0x14, 0x00, 0x04, 0x00, 0x91, 0x00, 0x06, 0x00, 0x93, 0x00, 0x00, 0x00, 0x04,
            0x00, 0x90, 0x00, 0x04, 0x00, 0x92
        ]
    );

    // Key block: length, token, null key, token, three null keys.
    assert_eq!(get_u16(b, 252), 308);

    for token in [254usize, 405] {
        assert_eq!(get_u16(b, token), 149);
        assert_eq!(b[token + 4], 0x1E);
        assert_eq!(get_u16(b, token + 6), 145);

        let privsec = token + 12;
        assert_eq!(b[privsec], 0x20);
        assert_eq!(get_u16(b, privsec + 2), 60);
        assert_eq!(b[privsec + 8], 0xC0); // key agreement
        assert_eq!(b[privsec + 9], 0x00); // prime curve
        assert_eq!(b[privsec + 10], 0x40); // clear key
        assert_eq!(get_u16(b, privsec + 12), 256);
        assert_eq!(get_u16(b, privsec + 14), 8);
        assert_eq!(get_u16(b, privsec + 16), 8);
        assert_eq!(get_u16(b, privsec + 18), 32);

        let adata = privsec + 20;
        assert_eq!(b[adata], 8);
        assert_eq!(get_u16(b, adata + 4), 256);
        assert_eq!(b[adata + 6], 0xC0);
        assert_eq!(b[adata + 7], 0x40);

        // Own scalar, then the peer's point.
        assert_eq!(&b[adata + 8..adata + 40], &[0xAA; 32]);

        let pubsec = adata + 40;
        assert_eq!(b[pubsec], 0x21);
        assert_eq!(get_u16(b, pubsec + 2), 77);
        assert_eq!(get_u16(b, pubsec + 8), 256);
        assert_eq!(get_u16(b, pubsec + 10), 65);
        assert_eq!(b[pubsec + 12], 0x04);
        assert_eq!(&b[pubsec + 13..pubsec + 45], &[0xBB; 32]);
        assert_eq!(&b[pubsec + 45..pubsec + 77], &[0xCC; 32]);
    }

    assert_eq!(&b[403..405], &[0x00, 0x44]);
    assert_eq!(&b[554..560], &[0x00, 0x44, 0x00, 0x44, 0x00, 0x44]);
    // Nothing past the request.
    assert!(b[560..REPLY_BASE].iter().all(|&v| v == 0));
}

#[test]
fn ecdsa_sign_request_layout_p256() {
    let hash = [0x5A; 32];
    let mut buf = CprbBuffer::new();
    build_ecdsa_sign_request(&mut buf, &p256_priv(), &[0xBB; 32], &[0xCC; 32], &hash).unwrap();
    let b = buf.bytes();

    assert_eq!(get_u32(b, 12), 199);
    assert_eq!(get_u16(b, 220), 0x5347);
    assert_eq!(&b[224..232], b"ECDSA   ");
    assert_eq!(get_u16(b, 232), 36); // hash + 4
    assert_eq!(get_u16(b, 234), 34); // hash + 2
    assert_eq!(&b[236..268], &hash);
    assert_eq!(get_u16(b, 268), 151);

    let token = 270;
    assert_eq!(get_u16(b, token), 149);
    assert_eq!(get_u16(b, token + 2), 0x0020);
    assert_eq!(b[token + 12 + 8], 0x80); // signature usage
    assert_eq!(&b[token + 40..token + 72], &[0xAA; 32]);
}

#[test]
fn ecdsa_verify_request_layout_p256() {
    let hash = [0x5A; 32];
    let sig = [0x77; 64];
    let mut buf = CprbBuffer::new();
    build_ecdsa_verify_request(&mut buf, &p256_pub(), &hash, &sig).unwrap();
    let b = buf.bytes();

    assert_eq!(get_u32(b, 12), 205);
    assert_eq!(get_u16(b, 220), 0x5356);
    assert_eq!(&b[224..232], b"ECDSA   ");
    assert_eq!(get_u16(b, 232), 102); // 2 + (2 + hash) + (2 + sig)
    assert_eq!(get_u16(b, 234), 34);
    assert_eq!(&b[236..268], &hash);
    assert_eq!(get_u16(b, 268), 66);
    assert_eq!(&b[270..334], &sig);
    assert_eq!(get_u16(b, 334), 91);

    let block = 336;
    assert_eq!(get_u16(b, block), 89);
    assert_eq!(b[block + 4], 0x1E);
    let pubsec = block + 12;
    assert_eq!(b[pubsec], 0x21);
    assert_eq!(get_u16(b, pubsec + 10), 65);
    assert_eq!(b[pubsec + 12], 0x04);
    assert_eq!(&b[pubsec + 13..pubsec + 45], &[0xBB; 32]);
}

#[test]
fn eckeygen_request_layout_p521() {
    let mut buf = CprbBuffer::new();
    build_eckeygen_request(&mut buf, CurveId::P521).unwrap();
    let b = buf.bytes();

    assert_eq!(get_u32(b, 12), 73);
    assert_eq!(get_u16(b, 220), 0x5047);
    assert_eq!(&b[224..232], b"CLEAR   ");
    assert_eq!(get_u16(b, 232), 0x0002);
    assert_eq!(get_u16(b, 234), 59);

    let token = 236;
    assert_eq!(get_u16(b, token), 52);
    assert_eq!(get_u16(b, token + 2), 0x0020);
    let privsec = token + 12;
    assert_eq!(b[privsec], 0x20);
    assert_eq!(get_u16(b, privsec + 2), 28); // no key material
    assert_eq!(get_u16(b, privsec + 12), 521);
    assert_eq!(get_u16(b, privsec + 18), 0);
    let pubsec = privsec + 28;
    assert_eq!(b[pubsec], 0x21);
    assert_eq!(get_u16(b, pubsec + 8), 521);
    assert_eq!(get_u16(b, pubsec + 10), 0); // no point yet
    assert_eq!(&b[pubsec + 12..pubsec + 17], &[0x00, 0x05, 0x00, 0x10, 0x00]);
}

#[test]
fn montgomery_curves_are_not_routable() {
    let key = EcKey::from_private(CurveId::X25519, &[0x01; 32]).unwrap();
    let peer = EcKey::from_public(CurveId::X25519, &[0x02; 32], &[0x03; 32]).unwrap();
    let mut buf = CprbBuffer::new();
    assert!(matches!(
        build_ecdh_request(&mut buf, &key, &peer),
        Err(Error::Hardware { .. })
    ));
}

#[test]
fn ecdh_reply_roundtrip_and_length_check() {
    let mut buf = CprbBuffer::new();
    let p = REPLY_PARM;
    put_u16(buf.bytes_mut(), p + 6, 36); // privlen + 4
    buf.bytes_mut()[p + 8..p + 40].copy_from_slice(&[0xEE; 32]);
    let z = parse_ecdh_reply(&buf, 32).unwrap();
    assert_eq!(z.as_slice(), &[0xEE; 32]);

    put_u16(buf.bytes_mut(), p + 6, 35);
    let err = parse_ecdh_reply(&buf, 32).unwrap_err();
    assert!(matches!(
        err,
        Error::ReplyFormat {
            expected: 32,
            actual: 31,
            ..
        }
    ));
    assert_eq!(err.errno(), api::error::errno::EIO);
}

#[test]
fn ecdsa_sign_reply_roundtrip_and_length_check() {
    let mut buf = CprbBuffer::new();
    let p = REPLY_PARM;
    put_u16(buf.bytes_mut(), p + 4, 72); // 2 * privlen + 8
    buf.bytes_mut()[p + 8..p + 72].copy_from_slice(&[0x99; 64]);
    let mut sig = vec![0u8; 64];
    parse_ecdsa_sign_reply(&buf, 32, &mut sig).unwrap();
    assert_eq!(sig, vec![0x99; 64]);

    put_u16(buf.bytes_mut(), p + 4, 70);
    assert!(matches!(
        parse_ecdsa_sign_reply(&buf, 32, &mut sig),
        Err(Error::ReplyFormat { .. })
    ));
}

#[test]
fn ecdsa_verify_reply_distinguishes_rejection_from_failure() {
    let mut buf = CprbBuffer::new();
    assert!(parse_ecdsa_verify_reply(&buf).is_ok());

    put_u16(buf.bytes_mut(), REPLY_BASE + 144, 4);
    put_u16(buf.bytes_mut(), REPLY_BASE + 146, RS_SIGNATURE_INVALID);
    assert_eq!(parse_ecdsa_verify_reply(&buf), Err(Error::SignatureInvalid));

    put_u16(buf.bytes_mut(), REPLY_BASE + 144, 8);
    put_u16(buf.bytes_mut(), REPLY_BASE + 146, 0);
    assert!(matches!(
        parse_ecdsa_verify_reply(&buf),
        Err(Error::Hardware { .. })
    ));
}

fn write_keygen_reply(buf: &mut CprbBuffer, privlen: usize, compress: u8) {
    let p = REPLY_PARM;
    let privsec = p + 20;
    let b = buf.bytes_mut();
    put_u16(b, privsec + 2, (28 + privlen) as u16);
    put_u16(b, privsec + 18, privlen as u16);
    let d = privsec + 28;
    b[d..d + privlen].fill(0x21);
    let pubsec = privsec + 28 + privlen;
    put_u8(b, pubsec + 12, compress);
    b[pubsec + 13..pubsec + 13 + 2 * privlen].fill(0x42);
}

#[test]
fn eckeygen_reply_parses_scalar_and_point() {
    let mut buf = CprbBuffer::new();
    write_keygen_reply(&mut buf, 66, 0x04);
    let mut key = EcKey::new(CurveId::P521);
    parse_eckeygen_reply(&buf, &mut key).unwrap();
    assert_eq!(key.d().unwrap(), &[0x21; 66][..]);
    assert_eq!(key.x().unwrap(), &[0x42; 66][..]);
    assert_eq!(key.y().unwrap(), &[0x42; 66][..]);
}

#[test]
fn eckeygen_reply_rejects_bad_lengths_and_compression() {
    let mut buf = CprbBuffer::new();
    write_keygen_reply(&mut buf, 48, 0x04);
    let mut key = EcKey::new(CurveId::P521);
    assert!(matches!(
        parse_eckeygen_reply(&buf, &mut key),
        Err(Error::ReplyFormat { .. })
    ));

    let mut buf = CprbBuffer::new();
    write_keygen_reply(&mut buf, 66, 0x00);
    assert!(matches!(
        parse_eckeygen_reply(&buf, &mut key),
        Err(Error::Hardware { .. })
    ));
}

#[test]
fn xcrb_describes_both_buffer_halves() {
    let mut buf = CprbBuffer::new();
    build_ecdh_request(&mut buf, &p256_priv(), &p256_pub()).unwrap();
    let xcrb = finalize_xcrb(&buf);

    let agent_id = xcrb.agent_id;
    let user_defined = xcrb.user_defined;
    let req_len = xcrb.request_control_blk_length;
    let rpl_len = xcrb.reply_control_blk_length;
    let req_addr = xcrb.request_control_blk_addr;
    let rpl_addr = xcrb.reply_control_blk_addr;

    assert_eq!(agent_id, 0x4341);
    assert_eq!(user_defined, 0xFFFF_FFFF);
    assert_eq!(req_len, 560);
    assert_eq!(rpl_len, 2268);
    assert_eq!(req_addr, buf.bytes().as_ptr() as u64);
    assert_eq!(rpl_addr, req_addr + REPLY_BASE as u64);
}
