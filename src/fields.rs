use core::fmt;

use crate::{FloatFormat, Result};

/// One unsigned sub-field of a bit pattern together with its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub value: u32,
    pub width: u32,
}

impl Field {
    /// Zero-padded binary rendering, exactly `width` digits.
    pub fn to_binary_string(self) -> String {
        format!("{:0width$b}", self.value, width = self.width as usize)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_binary_string())
    }
}

/// The sign, exponent and mantissa fields of a bit pattern, in that order
/// from the most significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decomposed {
    pub sign: Field,
    pub exponent: Field,
    pub mantissa: Field,
}

impl Decomposed {
    pub fn is_negative(&self) -> bool { self.sign.value == 1 }
}

impl fmt::Display for Decomposed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.sign, self.exponent, self.mantissa)
    }
}

/// Splits `bits` into its fields. Fails with `InvalidInput` when `bits` has
/// set bits above `total_bits`.
pub fn decompose(bits: u32, format: &FloatFormat) -> Result<Decomposed> {
    let bits = format.check_bits(bits)?;
    let m = format.mantissa_bits();
    let e = format.exponent_bits();
    Ok(Decomposed {
        sign: Field { value: (bits >> (e + m)) & 1, width: 1 },
        exponent: Field { value: (bits >> m) & format.max_exponent(), width: e },
        mantissa: Field { value: bits & format.max_mantissa(), width: m },
    })
}
