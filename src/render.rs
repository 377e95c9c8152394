use crate::{DecodedValue, FloatFormat, Result, decode, decompose};

/// `total_bits` binary digits, zero-padded.
pub fn to_binary_string(bits: u32, format: &FloatFormat) -> Result<String> {
    let bits = format.check_bits(bits)?;
    Ok(format!("{:0width$b}", bits, width = format.total_bits() as usize))
}

/// `0x` followed by `ceil(total_bits / 4)` uppercase hex digits.
pub fn to_hex_string(bits: u32, format: &FloatFormat) -> Result<String> {
    let bits = format.check_bits(bits)?;
    let encoded = hex::encode_upper(bits.to_be_bytes());
    let digits = hex_digits(format);
    Ok(format!("0x{}", &encoded[encoded.len() - digits..]))
}

/// Algebraic reading of a bit pattern, following the decode branch:
///
/// ```text
/// +0 / -0 / +Infinity / -Infinity / NaN
/// (-1)^0 × 2^(15-15) × 1.00 = 1
/// (-1)^1 × 2^(1-15) × 0.01 = -0.0000152587890625
/// ```
pub fn interpretation(bits: u32, format: &FloatFormat) -> Result<String> {
    let fields = decompose(bits, format)?;
    let value = decode(bits, format)?;
    let negative = fields.is_negative();

    let text = match value {
        DecodedValue::NaN => "NaN".to_owned(),
        DecodedValue::PositiveInfinity => "+Infinity".to_owned(),
        DecodedValue::NegativeInfinity => "-Infinity".to_owned(),
        DecodedValue::Finite(v) if v == 0.0 => (if negative { "-0" } else { "+0" }).to_owned(),
        DecodedValue::Finite(_) => {
            let (exponent, lead) = match fields.exponent.value {
                0 => (1, '0'),
                e => (e, '1'),
            };
            let bias = format.bias();
            let bias = if bias < 0 { format!("({bias})") } else { bias.to_string() };
            format!(
                "(-1)^{} × 2^({exponent}-{bias}) × {lead}.{} = {value}",
                fields.sign.value, fields.mantissa,
            )
        }
    };
    Ok(text)
}

/// Parses exactly `total_bits` binary digits. Whitespace and `_` may be used
/// as separators; anything else rejects the input.
pub fn parse_binary_literal(input: &str, format: &FloatFormat) -> Option<u32> {
    let digits = strip_separators(input);
    if digits.len() != format.total_bits() as usize
        || !digits.bytes().all(|b| b == b'0' || b == b'1')
    {
        return None;
    }
    u32::from_str_radix(&digits, 2).ok()
}

/// Parses exactly `ceil(total_bits / 4)` hex digits with an optional `0x`
/// prefix. The value must fit in `total_bits`.
pub fn parse_hex_literal(input: &str, format: &FloatFormat) -> Option<u32> {
    let trimmed = input.trim_start();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits = strip_separators(body);
    if digits.len() != hex_digits(format) {
        return None;
    }
    let bytes: [u8; 4] = hex::decode(format!("{digits:0>8}")).ok()?.try_into().ok()?;
    let bits = u32::from_be_bytes(bytes);
    format.contains(bits).then_some(bits)
}

fn hex_digits(format: &FloatFormat) -> usize {
    format.total_bits().div_ceil(4) as usize
}

fn strip_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}
