use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, decode::exp2i, decode::finite_value};

/// Widest layout whose bit patterns fit the `u32` carrier.
pub const MAX_TOTAL_BITS: u32 = 32;

/// How the maximum exponent field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialValueMode {
    /// Max exponent with zero mantissa is ±Infinity, anything else is NaN.
    #[serde(rename = "ieee")]
    Ieee,
    /// Every max-exponent pattern is NaN; no Infinity.
    #[serde(rename = "all-nan")]
    AllNan,
    /// Only the all-ones mantissa at the max exponent is NaN ("finite, NaN").
    #[serde(rename = "fn")]
    Fn,
    /// No special values at all.
    #[serde(rename = "none")]
    None,
}

impl SpecialValueMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ieee => "ieee",
            Self::AllNan => "all-nan",
            Self::Fn => "fn",
            Self::None => "none",
        }
    }

    pub fn has_infinity(self) -> bool { self == Self::Ieee }

    pub fn has_nan(self) -> bool { self != Self::None }
}

impl fmt::Display for SpecialValueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecialValueMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ieee" => Ok(Self::Ieee),
            "all-nan" => Ok(Self::AllNan),
            "fn" => Ok(Self::Fn),
            "none" => Ok(Self::None),
            _ => Err(Error::InvalidFormat(format!(
                "unknown special value mode {s:?}"
            ))),
        }
    }
}

/// The wire shape of a format descriptor, as found in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    pub total_bits: u32,
    pub exponent_bits: u32,
    pub mantissa_bits: u32,
    pub bias: i32,
    pub special_value_mode: SpecialValueMode,
}

/// An immutable minifloat layout: sign, exponent and mantissa fields packed
/// most-significant-first into `total_bits` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FormatDescriptor", into = "FormatDescriptor")]
pub struct FloatFormat {
    exponent_bits: u32,
    mantissa_bits: u32,
    bias: i32,
    mode: SpecialValueMode,
}

impl FloatFormat {
    // ─────────────────────────────── Registry ───────────────────────────────

    pub const F32: Self = Self::builtin(8, 23, 127, SpecialValueMode::Ieee);
    pub const F16: Self = Self::builtin(5, 10, 15, SpecialValueMode::Ieee);
    pub const BF16: Self = Self::builtin(8, 7, 127, SpecialValueMode::Ieee);
    pub const F8E5M2: Self = Self::builtin(5, 2, 15, SpecialValueMode::Ieee);
    pub const F8E4M3FN: Self = Self::builtin(4, 3, 7, SpecialValueMode::Fn);
    pub const F6E3M2: Self = Self::builtin(3, 2, 3, SpecialValueMode::None);
    pub const F6E2M3: Self = Self::builtin(2, 3, 1, SpecialValueMode::None);
    pub const F4E2M1: Self = Self::builtin(2, 1, 1, SpecialValueMode::None);

    const fn builtin(
        exponent_bits: u32,
        mantissa_bits: u32,
        bias: i32,
        mode: SpecialValueMode,
    ) -> Self {
        Self { exponent_bits, mantissa_bits, bias, mode }
    }

    // ───────────────────────────── Constructors ─────────────────────────────

    /// Builds a layout, checking that both fields are present, that the
    /// whole pattern fits in 32 bits, and that its range from smallest
    /// subnormal to largest finite value is representable as a double.
    pub fn new(
        exponent_bits: u32,
        mantissa_bits: u32,
        bias: i32,
        mode: SpecialValueMode,
    ) -> Result<Self> {
        if exponent_bits == 0 {
            return Err(Error::InvalidFormat(
                "exponent field must be at least 1 bit wide".into(),
            ));
        }
        if mantissa_bits == 0 {
            return Err(Error::InvalidFormat(
                "mantissa field must be at least 1 bit wide".into(),
            ));
        }
        let total_bits = 1u64 + exponent_bits as u64 + mantissa_bits as u64;
        if total_bits > MAX_TOTAL_BITS as u64 {
            return Err(Error::InvalidFormat(format!(
                "{total_bits} bits exceeds the {MAX_TOTAL_BITS}-bit limit"
            )));
        }
        let format = Self { exponent_bits, mantissa_bits, bias, mode };
        if !format.max_finite_value().is_finite() {
            return Err(Error::InvalidFormat(format!(
                "largest finite value of {format} overflows a double"
            )));
        }
        if format.min_positive_subnormal() == 0.0 {
            return Err(Error::InvalidFormat(format!(
                "smallest subnormal of {format} underflows a double"
            )));
        }
        Ok(format)
    }

    // ───────────────────────────── Accessors ────────────────────────────────

    pub fn total_bits(&self) -> u32 { 1 + self.exponent_bits + self.mantissa_bits }

    pub fn exponent_bits(&self) -> u32 { self.exponent_bits }

    pub fn mantissa_bits(&self) -> u32 { self.mantissa_bits }

    pub fn bias(&self) -> i32 { self.bias }

    pub fn special_value_mode(&self) -> SpecialValueMode { self.mode }

    /// All-ones exponent field.
    pub fn max_exponent(&self) -> u32 { (1u32 << self.exponent_bits) - 1 }

    /// All-ones mantissa field.
    pub fn max_mantissa(&self) -> u32 { (1u32 << self.mantissa_bits) - 1 }

    pub fn sign_mask(&self) -> u32 { 1u32 << (self.exponent_bits + self.mantissa_bits) }

    /// Number of distinct bit patterns, `2^total_bits`.
    pub fn pattern_count(&self) -> u64 { 1u64 << self.total_bits() }

    pub fn contains(&self, bits: u32) -> bool {
        (bits as u64) < self.pattern_count()
    }

    /// Returns `bits` unchanged, or `InvalidInput` if it does not fit.
    pub fn check_bits(&self, bits: u32) -> Result<u32> {
        if self.contains(bits) {
            Ok(bits)
        } else {
            Err(Error::InvalidInput { bits, total_bits: self.total_bits() })
        }
    }

    pub(crate) fn pack(&self, negative: bool, exponent: u32, mantissa: u32) -> u32 {
        let sign = if negative { self.sign_mask() } else { 0 };
        sign | (exponent << self.mantissa_bits) | mantissa
    }

    /// Exponent and mantissa fields of the largest finite magnitude.
    pub fn max_finite_fields(&self) -> (u32, u32) {
        match self.mode {
            SpecialValueMode::Ieee | SpecialValueMode::AllNan => {
                (self.max_exponent() - 1, self.max_mantissa())
            }
            SpecialValueMode::Fn => (self.max_exponent(), self.max_mantissa() - 1),
            SpecialValueMode::None => (self.max_exponent(), self.max_mantissa()),
        }
    }

    /// Positive bit pattern of the largest finite magnitude.
    pub fn max_finite_bits(&self) -> u32 {
        let (exponent, mantissa) = self.max_finite_fields();
        self.pack(false, exponent, mantissa)
    }

    pub fn max_finite_value(&self) -> f64 {
        let (exponent, mantissa) = self.max_finite_fields();
        finite_value(self, false, exponent, mantissa)
    }

    pub fn min_positive_normal(&self) -> f64 { exp2i(1 - self.bias as i64) }

    pub fn min_positive_subnormal(&self) -> f64 {
        exp2i(1 - self.bias as i64 - self.mantissa_bits as i64)
    }

    /// The pattern every NaN input encodes to; `None` when NaN is not
    /// representable.
    pub fn canonical_nan_bits(&self) -> Option<u32> {
        match self.mode {
            SpecialValueMode::Ieee => Some(self.pack(false, self.max_exponent(), 1)),
            SpecialValueMode::AllNan | SpecialValueMode::Fn => {
                Some(self.pack(false, self.max_exponent(), self.max_mantissa()))
            }
            SpecialValueMode::None => None,
        }
    }

    pub fn infinity_bits(&self, negative: bool) -> Option<u32> {
        self.mode
            .has_infinity()
            .then(|| self.pack(negative, self.max_exponent(), 0))
    }
}

impl TryFrom<FormatDescriptor> for FloatFormat {
    type Error = Error;

    fn try_from(d: FormatDescriptor) -> Result<Self> {
        let format =
            Self::new(d.exponent_bits, d.mantissa_bits, d.bias, d.special_value_mode)?;
        if format.total_bits() != d.total_bits {
            return Err(Error::InvalidFormat(format!(
                "totalBits is {} but 1 + {} + {} = {}",
                d.total_bits,
                d.exponent_bits,
                d.mantissa_bits,
                format.total_bits()
            )));
        }
        Ok(format)
    }
}

impl From<FloatFormat> for FormatDescriptor {
    fn from(f: FloatFormat) -> Self {
        Self {
            total_bits: f.total_bits(),
            exponent_bits: f.exponent_bits,
            mantissa_bits: f.mantissa_bits,
            bias: f.bias,
            special_value_mode: f.mode,
        }
    }
}

impl fmt::Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "e{}m{} bias={} {}",
            self.exponent_bits, self.mantissa_bits, self.bias, self.mode
        )
    }
}

/// Named, immutable set of formats. Built once and handed to whoever needs
/// to look formats up; there is no process-global table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRegistry {
    formats: BTreeMap<String, FloatFormat>,
}

impl FormatRegistry {
    pub fn builtin() -> Self {
        Self::from_formats([
            ("f32", FloatFormat::F32),
            ("f16", FloatFormat::F16),
            ("bf16", FloatFormat::BF16),
            ("f8e5m2", FloatFormat::F8E5M2),
            ("f8e4m3fn", FloatFormat::F8E4M3FN),
            ("f6e3m2", FloatFormat::F6E3M2),
            ("f6e2m3", FloatFormat::F6E2M3),
            ("f4e2m1", FloatFormat::F4E2M1),
        ])
    }

    pub fn from_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = (S, FloatFormat)>,
        S: Into<String>,
    {
        Self {
            formats: formats
                .into_iter()
                .map(|(name, format)| (name.into(), format))
                .collect(),
        }
    }

    /// Parses a JSON object mapping names to format descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let formats: BTreeMap<String, FloatFormat> = serde_json::from_str(json)?;
        Ok(Self { formats })
    }

    pub fn lookup(&self, name: &str) -> Result<FloatFormat> {
        self.formats
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    /// Formats in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FloatFormat)> + '_ {
        self.formats.iter().map(|(name, format)| (name.as_str(), *format))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.formats.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize { self.formats.len() }

    pub fn is_empty(&self) -> bool { self.formats.is_empty() }
}

impl Default for FormatRegistry {
    fn default() -> Self { Self::builtin() }
}
