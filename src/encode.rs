use crate::{DecodedValue, FloatFormat, decode::exp2i};

/// Encodes a double into `format`. Never fails: magnitudes beyond the
/// largest finite value become ±Infinity where the format has it and the
/// signed maximum finite pattern otherwise, and NaN becomes the canonical
/// NaN pattern.
///
/// Formats without NaN (`none`) encode NaN as the *positive* maximum finite
/// value, whatever the NaN's sign bit: the sign is taken from `value < 0`,
/// which NaN never satisfies.
///
/// Mantissas round half away from zero.
pub fn encode(value: f64, format: &FloatFormat) -> u32 {
    let negative = value < 0.0 || (value == 0.0 && value.is_sign_negative());
    let sign = if negative { format.sign_mask() } else { 0 };
    let clamped = format
        .infinity_bits(negative)
        .unwrap_or(sign | format.max_finite_bits());

    if value.is_nan() {
        return format.canonical_nan_bits().unwrap_or(clamped);
    }
    if value.is_infinite() {
        return clamped;
    }

    let magnitude = value.abs();
    if magnitude == 0.0 {
        return sign;
    }
    if magnitude > format.max_finite_value() {
        return clamped;
    }

    let bias = format.bias() as i64;
    let mantissa_bits = format.mantissa_bits() as i64;
    let max_mantissa = format.max_mantissa() as u64;

    let mut exp = magnitude.log2().floor() as i64;
    let mut frac = magnitude / exp2i(exp);
    while frac >= 2.0 {
        frac /= 2.0;
        exp += 1;
    }
    while frac < 1.0 {
        frac *= 2.0;
        exp -= 1;
    }

    if exp + bias <= 0 {
        // magnitude / 2^(1 - bias) * 2^M
        let scaled = scale2(magnitude, bias - 1 + mantissa_bits);
        let mantissa = (scaled.round() as u64).min(max_mantissa);
        return sign | mantissa as u32;
    }

    let (max_exponent, max_finite_mantissa) = format.max_finite_fields();
    let mut biased = (exp + bias).min(max_exponent as i64);
    let mut mantissa = scale2(frac - 1.0, mantissa_bits).round() as u64;
    if mantissa > max_mantissa {
        mantissa = 0;
        biased += 1;
    }
    if biased > max_exponent as i64
        || (biased == max_exponent as i64 && mantissa > max_finite_mantissa as u64)
    {
        return clamped;
    }

    sign | ((biased as u32) << format.mantissa_bits()) | mantissa as u32
}

/// `encode` for an already-tagged value.
pub fn encode_decoded(value: DecodedValue, format: &FloatFormat) -> u32 {
    encode(value.to_f64(), format)
}

/// `x * 2^k`, applied in two steps so neither factor leaves the double range
/// early.
fn scale2(x: f64, k: i64) -> f64 {
    x * exp2i(k / 2) * exp2i(k - k / 2)
}
