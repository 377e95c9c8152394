use minifloat_codec::{
    FloatFormat, SpecialValueMode, decompose, interpretation, parse_binary_literal,
    parse_hex_literal, to_binary_string, to_hex_string,
};

#[test]
fn decompose_fields() {
    let d = decompose(0b1_10101_01, &FloatFormat::F8E5M2).unwrap();
    assert!(d.is_negative());
    assert_eq!((d.sign.value, d.exponent.value, d.mantissa.value), (1, 0b10101, 0b01));
    assert_eq!(d.exponent.to_binary_string(), "10101");
    assert_eq!(d.mantissa.to_binary_string(), "01");
    assert_eq!(d.to_string(), "1 10101 01");

    let d = decompose(0b0_00_1, &FloatFormat::F4E2M1).unwrap();
    assert_eq!(d.to_string(), "0 00 1");
    assert!(decompose(0x40, &FloatFormat::F6E3M2).is_err());
}

#[test]
fn binary_strings_are_zero_padded() {
    assert_eq!(to_binary_string(0x3C, &FloatFormat::F8E5M2).unwrap(), "00111100");
    assert_eq!(to_binary_string(0x5, &FloatFormat::F4E2M1).unwrap(), "0101");
    assert_eq!(to_binary_string(0x1, &FloatFormat::F6E2M3).unwrap(), "000001");
    assert!(to_binary_string(0x100, &FloatFormat::F8E5M2).is_err());
}

#[test]
fn hex_strings_use_whole_nibbles() {
    assert_eq!(to_hex_string(0x3C, &FloatFormat::F8E5M2).unwrap(), "0x3C");
    assert_eq!(to_hex_string(0xA, &FloatFormat::F4E2M1).unwrap(), "0xA");
    assert_eq!(to_hex_string(0x05, &FloatFormat::F6E3M2).unwrap(), "0x05");
    assert_eq!(to_hex_string(0x2A, &FloatFormat::F6E3M2).unwrap(), "0x2A");
    assert_eq!(to_hex_string(0x3C00, &FloatFormat::F16).unwrap(), "0x3C00");
    assert_eq!(to_hex_string(0x3F80_0000, &FloatFormat::F32).unwrap(), "0x3F800000");
    assert!(to_hex_string(0x10, &FloatFormat::F4E2M1).is_err());
}

#[test]
fn interpretation_follows_decode_branch() {
    let f = FloatFormat::F8E5M2;
    assert_eq!(interpretation(0x00, &f).unwrap(), "+0");
    assert_eq!(interpretation(0x80, &f).unwrap(), "-0");
    assert_eq!(interpretation(0x7C, &f).unwrap(), "+Infinity");
    assert_eq!(interpretation(0xFC, &f).unwrap(), "-Infinity");
    assert_eq!(interpretation(0x7D, &f).unwrap(), "NaN");
    assert_eq!(interpretation(0x3C, &f).unwrap(), "(-1)^0 × 2^(15-15) × 1.00 = 1");
    assert_eq!(
        interpretation(0x81, &f).unwrap(),
        "(-1)^1 × 2^(1-15) × 0.01 = -0.0000152587890625"
    );
    assert_eq!(
        interpretation(0x7E, &FloatFormat::F8E4M3FN).unwrap(),
        "(-1)^0 × 2^(15-7) × 1.110 = 448"
    );

    let negative_bias = FloatFormat::new(2, 1, -2, SpecialValueMode::None).unwrap();
    assert_eq!(interpretation(0b0_01_0, &negative_bias).unwrap(), "(-1)^0 × 2^(1-(-2)) × 1.0 = 8");
    assert!(interpretation(0x100, &f).is_err());
}

#[test]
fn binary_literals() {
    let f = FloatFormat::F8E5M2;
    assert_eq!(parse_binary_literal("00111100", &f), Some(0x3C));
    assert_eq!(parse_binary_literal("0 01111 00", &f), Some(0x3C));
    assert_eq!(parse_binary_literal(" 0011_1100\n", &f), Some(0x3C));
    assert_eq!(parse_binary_literal("0011110", &f), None);
    assert_eq!(parse_binary_literal("001111000", &f), None);
    assert_eq!(parse_binary_literal("00111102", &f), None);
    assert_eq!(parse_binary_literal("0b111100", &f), None);
    assert_eq!(parse_binary_literal("", &f), None);
    assert_eq!(parse_binary_literal("1010", &FloatFormat::F4E2M1), Some(0xA));
}

#[test]
fn hex_literals() {
    let f = FloatFormat::F8E5M2;
    assert_eq!(parse_hex_literal("0x3C", &f), Some(0x3C));
    assert_eq!(parse_hex_literal("3c", &f), Some(0x3C));
    assert_eq!(parse_hex_literal("0X3c", &f), Some(0x3C));
    assert_eq!(parse_hex_literal("0x3C0", &f), None);
    assert_eq!(parse_hex_literal("0xZZ", &f), None);
    // Six bits take two digits, but only values below 0x40 fit.
    assert_eq!(parse_hex_literal("0x3F", &FloatFormat::F6E3M2), Some(0x3F));
    assert_eq!(parse_hex_literal("0x40", &FloatFormat::F6E3M2), None);
    assert_eq!(parse_hex_literal("0xA", &FloatFormat::F4E2M1), Some(0xA));
    assert_eq!(parse_hex_literal("0x3C_00", &FloatFormat::F16), Some(0x3C00));
    assert_eq!(parse_hex_literal("7F80 0000", &FloatFormat::F32), Some(0x7F80_0000));
}

#[test]
fn renderings_agree_with_parsers() {
    let f = FloatFormat::F6E2M3;
    for bits in 0..f.pattern_count() as u32 {
        let binary = to_binary_string(bits, &f).unwrap();
        let hex = to_hex_string(bits, &f).unwrap();
        assert_eq!(parse_binary_literal(&binary, &f), Some(bits));
        assert_eq!(parse_hex_literal(&hex, &f), Some(bits));
    }
}
