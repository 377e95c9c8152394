use core::fmt;
use core::ops::Neg;

use crate::{FloatFormat, Result, SpecialValueMode, decompose};

/// The value a bit pattern stands for. Exactly one variant per pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedValue {
    Finite(f64),
    NaN,
    PositiveInfinity,
    NegativeInfinity,
}

impl DecodedValue {
    /// Classifies a native double.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::NaN
        } else if value == f64::INFINITY {
            Self::PositiveInfinity
        } else if value == f64::NEG_INFINITY {
            Self::NegativeInfinity
        } else {
            Self::Finite(value)
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Self::Finite(v) => v,
            Self::NaN => f64::NAN,
            Self::PositiveInfinity => f64::INFINITY,
            Self::NegativeInfinity => f64::NEG_INFINITY,
        }
    }

    pub fn is_nan(self) -> bool { matches!(self, Self::NaN) }

    pub fn is_finite(self) -> bool { matches!(self, Self::Finite(_)) }

    pub fn is_infinite(self) -> bool {
        matches!(self, Self::PositiveInfinity | Self::NegativeInfinity)
    }

    /// Same tag and, for finite values, the same double including the sign
    /// of zero. NaN is identical to NaN.
    pub fn is_identical(self, other: Self) -> bool {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl Neg for DecodedValue {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Finite(v) => Self::Finite(-v),
            Self::NaN => Self::NaN,
            Self::PositiveInfinity => Self::NegativeInfinity,
            Self::NegativeInfinity => Self::PositiveInfinity,
        }
    }
}

impl From<f64> for DecodedValue {
    fn from(value: f64) -> Self { Self::from_f64(value) }
}

impl From<DecodedValue> for f64 {
    fn from(value: DecodedValue) -> Self { value.to_f64() }
}

/// Uses the reference tables' tokens: `NaN`, `Infinity`, `-Infinity`, and
/// `-0` for negative zero.
impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) if *v == 0.0 && v.is_sign_negative() => f.write_str("-0"),
            Self::Finite(v) => write!(f, "{v}"),
            Self::NaN => f.write_str("NaN"),
            Self::PositiveInfinity => f.write_str("Infinity"),
            Self::NegativeInfinity => f.write_str("-Infinity"),
        }
    }
}

/// Decodes a bit pattern. Total over `[0, 2^total_bits)`; anything larger is
/// `InvalidInput`.
pub fn decode(bits: u32, format: &FloatFormat) -> Result<DecodedValue> {
    let fields = decompose(bits, format)?;
    let negative = fields.is_negative();
    let exponent = fields.exponent.value;
    let mantissa = fields.mantissa.value;

    if exponent == format.max_exponent() {
        match format.special_value_mode() {
            SpecialValueMode::Ieee if mantissa == 0 => {
                return Ok(if negative {
                    DecodedValue::NegativeInfinity
                } else {
                    DecodedValue::PositiveInfinity
                });
            }
            SpecialValueMode::Ieee | SpecialValueMode::AllNan => {
                return Ok(DecodedValue::NaN);
            }
            SpecialValueMode::Fn if mantissa == format.max_mantissa() => {
                return Ok(DecodedValue::NaN);
            }
            SpecialValueMode::Fn | SpecialValueMode::None => {}
        }
    }

    Ok(DecodedValue::Finite(finite_value(format, negative, exponent, mantissa)))
}

/// Value of an ordinary (zero, subnormal or normal) field combination.
///
///   subnormal: m * 2^(1 - bias - M)
///   normal:    (2^M + m) * 2^(e - bias - M)
pub(crate) fn finite_value(
    format: &FloatFormat,
    negative: bool,
    exponent: u32,
    mantissa: u32,
) -> f64 {
    let bias = format.bias() as i64;
    let mantissa_bits = format.mantissa_bits() as i64;
    let (significand, scale) = if exponent == 0 {
        (mantissa as f64, 1 - bias - mantissa_bits)
    } else {
        (
            ((1u64 << mantissa_bits) + mantissa as u64) as f64,
            exponent as i64 - bias - mantissa_bits,
        )
    };
    // Two halves so an extreme bias does not underflow before the multiply.
    let magnitude = significand * exp2i(scale / 2) * exp2i(scale - scale / 2);
    if negative { -magnitude } else { magnitude }
}

/// Exact `2^k` as a double, saturating to infinity or zero outside the
/// double's range.
#[inline]
pub(crate) fn exp2i(k: i64) -> f64 {
    if k > 1023 {
        f64::INFINITY
    } else if k >= -1022 {
        f64::from_bits(((k + 1023) as u64) << 52)
    } else if k >= -1074 {
        f64::from_bits(1u64 << (k + 1074))
    } else {
        0.0
    }
}
