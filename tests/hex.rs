use {
    ::beautify::{
        hex::{decode_hex_nibbles, MaskedBytes},
        testing::assert_debug_eq,
        Error,
    },
    expect_test::expect,
};

#[test]
fn hex() {
    assert_debug_eq(
        expect![["MaskedBytes { bytes: [250, 224], mask: [255, 240] }"]],
        decode_hex_nibbles("fae").unwrap(),
    );
    assert_debug_eq(
        expect![["MaskedBytes { bytes: [18, 52, 86, 120], mask: [255, 255, 255, 255] }"]],
        decode_hex_nibbles("12345678").unwrap(),
    );
    assert_debug_eq(
        expect![["MaskedBytes { bytes: [], mask: [] }"]],
        decode_hex_nibbles("").unwrap(),
    );
    assert_debug_eq(
        expect![["MaskedBytes { bytes: [0, 1, 160], mask: [255, 255, 240] }"]],
        decode_hex_nibbles("0001a").unwrap(),
    );
}

#[test]
fn hex_rejects() {
    assert_debug_eq(
        expect![[r#"InvalidPrefix { prefix: "0x12", character: 'x' }"#]],
        decode_hex_nibbles("0x12").unwrap_err(),
    );
    assert_debug_eq(
        expect![[r#"InvalidPrefix { prefix: "FAE", character: 'F' }"#]],
        decode_hex_nibbles("FAE").unwrap_err(),
    );
    assert_debug_eq(
        expect![[r#"InvalidPrefix { prefix: "dead beef", character: ' ' }"#]],
        decode_hex_nibbles("dead beef").unwrap_err(),
    );
    assert!(matches!(
        decode_hex_nibbles("f".repeat(41)),
        Err(Error::PrefixTooLong { len: 41, .. })
    ));
    assert!(decode_hex_nibbles("f".repeat(40)).is_ok());
}

#[test]
fn masked_matches() {
    let target = decode_hex_nibbles("0001a").unwrap();
    assert_eq!(target.nibbles(), 5);
    assert!(target.matches(&[0x00, 0x01, 0xaf, 0xff]));
    assert!(target.matches(&[0x00, 0x01, 0xa0]));
    assert!(!target.matches(&[0x00, 0x01, 0xbf]));
    assert!(!target.matches(&[0x10, 0x01, 0xa0]));
    assert!(!target.matches(&[0x00, 0x01]));

    assert!(MaskedBytes::default().matches(&[]));
    assert!(MaskedBytes::default().matches(&[0x12, 0x34]));
}
