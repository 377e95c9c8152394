use minifloat_codec::{
    DecodedValue, FloatFormat, SpecialValueMode, decode, encode, encode_decoded,
};

#[test]
fn e5m2_basics() {
    let f = FloatFormat::F8E5M2;
    assert_eq!(encode(1.0, &f), 0b0_01111_00);
    assert_eq!(encode(-1.0, &f), 0b1_01111_00);
    assert_eq!(encode(2f64.powi(-16), &f), 0b0_00000_01);
    assert_eq!(encode(57344.0, &f), 0x7B);
}

#[test]
fn signed_zero() {
    let f = FloatFormat::F8E5M2;
    assert_eq!(encode(0.0, &f), 0x00);
    assert_eq!(encode(-0.0, &f), 0x80);
}

#[test]
fn canonical_nan_per_mode() {
    // ieee: max exponent, mantissa 1
    assert_eq!(encode(f64::NAN, &FloatFormat::F8E5M2), 0b0_11111_01);
    // fn: max exponent, mantissa all ones
    assert_eq!(encode(f64::NAN, &FloatFormat::F8E4M3FN), 0x7F);
    let all_nan = FloatFormat::new(4, 3, 7, SpecialValueMode::AllNan).unwrap();
    assert_eq!(encode(f64::NAN, &all_nan), 0x7F);
    // A negative NaN still encodes to the positive canonical pattern.
    assert_eq!(encode(-f64::NAN, &FloatFormat::F8E5M2), 0b0_11111_01);
}

#[test]
fn nan_without_representation_becomes_positive_max_finite() {
    // `none` cannot hold NaN. The substitute is always positive because the
    // sign test is `value < 0`, which NaN fails, even with its sign bit set.
    let f = FloatFormat::F4E2M1;
    assert_eq!(encode(f64::NAN, &f), 0b0_11_1);
    assert_eq!(encode(-f64::NAN, &f), 0b0_11_1);
    assert_eq!(encode(f64::NAN, &FloatFormat::F6E3M2), FloatFormat::F6E3M2.max_finite_bits());
}

#[test]
fn infinity_clamps_without_representation() {
    assert_eq!(encode(f64::INFINITY, &FloatFormat::F8E5M2), 0b0_11111_00);
    assert_eq!(encode(f64::NEG_INFINITY, &FloatFormat::F8E5M2), 0b1_11111_00);
    assert_eq!(encode(f64::INFINITY, &FloatFormat::F8E4M3FN), 0x7E);
    assert_eq!(encode(f64::NEG_INFINITY, &FloatFormat::F8E4M3FN), 0xFE);
    assert_eq!(encode(f64::INFINITY, &FloatFormat::F4E2M1), 0x7);
    assert_eq!(encode(f64::NEG_INFINITY, &FloatFormat::F4E2M1), 0xF);
}

#[test]
fn overflow_clamps() {
    assert_eq!(encode(1e6, &FloatFormat::F8E5M2), 0b0_11111_00);
    assert_eq!(encode(-1e6, &FloatFormat::F8E5M2), 0b1_11111_00);
    assert_eq!(encode(500.0, &FloatFormat::F8E4M3FN), 0x7E);
    assert_eq!(encode(-449.0, &FloatFormat::F8E4M3FN), 0xFE);
    assert_eq!(encode(7.0, &FloatFormat::F4E2M1), 0x7);
    let all_nan = FloatFormat::new(4, 3, 7, SpecialValueMode::AllNan).unwrap();
    assert_eq!(encode(1e9, &all_nan), 0x77);
}

#[test]
fn ties_round_away_from_zero() {
    let f = FloatFormat::F8E5M2;
    // 1.125 sits halfway between 1.00 (m=0) and 1.25 (m=1); half-to-even
    // would pick m=0.
    assert_eq!(encode(1.125, &f), 0b0_01111_01);
    assert_eq!(encode(-1.125, &f), 0b1_01111_01);
    // Below and above the tie.
    assert_eq!(encode(1.12, &f), 0b0_01111_00);
    assert_eq!(encode(1.13, &f), 0b0_01111_01);
}

#[test]
fn mantissa_carry_bumps_exponent() {
    let f = FloatFormat::F8E5M2;
    // 1.9 => m = 0.9 * 4 = 3.6 rounds to 4, which ripples into 2.0
    assert_eq!(encode(1.9, &f), 0b0_10000_00);
    assert_eq!(decode(encode(1.9, &f), &f).unwrap(), DecodedValue::Finite(2.0));
}

#[test]
fn tiny_values_flush_to_signed_zero() {
    let f = FloatFormat::F8E5M2;
    // A quarter of the smallest subnormal rounds to mantissa 0.
    assert_eq!(encode(2f64.powi(-18), &f), 0x00);
    assert_eq!(encode(-(2f64.powi(-18)), &f), 0x80);
    // Half of it is a tie and rounds up.
    assert_eq!(encode(2f64.powi(-17), &f), 0x01);
}

#[test]
fn subnormal_rounding_saturates_at_largest_subnormal() {
    let f = FloatFormat::F8E5M2;
    // 3.75 * 2^-16 rounds to mantissa 4, which the subnormal path clamps to 3.
    assert_eq!(encode(3.75 * 2f64.powi(-16), &f), 0b0_00000_11);
    // The smallest normal itself takes the normal path.
    assert_eq!(encode(2f64.powi(-14), &f), 0b0_00001_00);
}

#[test]
fn wide_formats_agree_with_native_floats() {
    let values = [1.0f32, -2.5, 0.1, f32::MIN_POSITIVE, f32::MAX, -f32::MAX, 1e-45, 3.0e-39];
    for v in values {
        assert_eq!(encode(v as f64, &FloatFormat::F32), v.to_bits(), "{v}");
    }
    assert_eq!(encode(1.0, &FloatFormat::F16), 0x3C00);
    assert_eq!(encode(65504.0, &FloatFormat::F16), 0x7BFF);
    assert_eq!(encode(1e6, &FloatFormat::F16), 0x7C00);
    assert_eq!(encode(1.0, &FloatFormat::BF16), 0x3F80);
}

#[test]
fn round_trip_every_small_pattern() {
    let mut formats = vec![
        FloatFormat::F8E5M2,
        FloatFormat::F8E4M3FN,
        FloatFormat::F6E3M2,
        FloatFormat::F6E2M3,
        FloatFormat::F4E2M1,
        FloatFormat::new(4, 3, 7, SpecialValueMode::AllNan).unwrap(),
        FloatFormat::new(4, 3, 11, SpecialValueMode::Ieee).unwrap(),
    ];
    formats.push(FloatFormat::new(5, 10, 15, SpecialValueMode::Fn).unwrap());

    for f in &formats {
        for bits in 0..f.pattern_count() as u32 {
            let value = decode(bits, f).unwrap();
            let back = encode_decoded(value, f);
            if value.is_nan() {
                assert!(decode(back, f).unwrap().is_nan(), "{f}: 0x{bits:X}");
            } else {
                assert_eq!(back, bits, "{f}: 0x{bits:X} decoded to {value}");
            }
        }
    }
}
