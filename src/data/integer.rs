//! Arbitrary-precision signed integers.
//!
//! Stored as a sign and a big-endian magnitude without leading zero bytes.
//! Zero has an empty magnitude and is never negative, so derived equality is
//! numeric equality.
//!
//! # CBOR Layout
//!
//! - `0 <= n < 2^64`: major type 0
//! - `-2^64 <= n < 0`: major type 1 carrying `-1 - n`
//! - otherwise: tag 2 (positive) or tag 3 (negative, carrying `-1 - n`)
//!   wrapping the big-endian magnitude as a byte string

use crate::data::DataError;
use crate::types::encoding::{
    Decode, DecodeError, Encode, EncodeSink, Head, MAJOR_NEGATIVE, MAJOR_TAG, MAJOR_UNSIGNED,
    read_byte_string, read_head, write_byte_string, write_head,
};
use std::fmt;
use std::str::FromStr;

/// Bignum tag for non-negative integers.
pub const TAG_POSITIVE_BIGNUM: u64 = 2;
/// Bignum tag for negative integers.
pub const TAG_NEGATIVE_BIGNUM: u64 = 3;

/// Arbitrary-precision signed integer.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Integer {
    negative: bool,
    magnitude: Vec<u8>,
}

impl Integer {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds an integer from a sign and a big-endian magnitude.
    pub fn from_parts(negative: bool, magnitude: &[u8]) -> Self {
        let start = magnitude
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(magnitude.len());
        let magnitude = magnitude[start..].to_vec();
        let negative = negative && !magnitude.is_empty();
        Self {
            negative,
            magnitude,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Big-endian absolute value without leading zeros.
    pub fn magnitude(&self) -> &[u8] {
        &self.magnitude
    }

    /// Returns the value if it is non-negative and fits 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.negative {
            return None;
        }
        magnitude_to_u64(&self.magnitude)
    }

    /// Returns the value if it fits a signed 64-bit integer.
    pub fn to_i64(&self) -> Option<i64> {
        let abs = magnitude_to_u64(&self.magnitude)?;
        if self.negative {
            if abs <= i64::MAX as u64 + 1 {
                Some((abs as i64).wrapping_neg())
            } else {
                None
            }
        } else {
            i64::try_from(abs).ok()
        }
    }

    /// Encodes the CBOR argument `-1 - n` of a negative value, i.e. `|n| - 1`.
    fn negative_argument(&self) -> Vec<u8> {
        let mut arg = self.magnitude.clone();
        decrement(&mut arg);
        strip_leading_zeros(arg)
    }

    fn from_negative_argument(mut arg: Vec<u8>) -> Self {
        increment(&mut arg);
        Self::from_parts(true, &arg)
    }
}

fn magnitude_to_u64(magnitude: &[u8]) -> Option<u64> {
    if magnitude.len() > 8 {
        return None;
    }
    let mut buf = [0u8; 8];
    buf[8 - magnitude.len()..].copy_from_slice(magnitude);
    Some(u64::from_be_bytes(buf))
}

fn strip_leading_zeros(mut bytes: Vec<u8>) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes.drain(..start);
    bytes
}

/// Adds one to a big-endian magnitude in place.
fn increment(bytes: &mut Vec<u8>) {
    for byte in bytes.iter_mut().rev() {
        let (sum, carry) = byte.overflowing_add(1);
        *byte = sum;
        if !carry {
            return;
        }
    }
    bytes.insert(0, 1);
}

/// Subtracts one from a non-zero big-endian magnitude in place.
fn decrement(bytes: &mut [u8]) {
    for byte in bytes.iter_mut().rev() {
        let (diff, borrow) = byte.overflowing_sub(1);
        *byte = diff;
        if !borrow {
            return;
        }
    }
}

/// Divides a big-endian magnitude by a small divisor in place, returning the remainder.
fn div_rem_small(bytes: &mut [u8], divisor: u8) -> u8 {
    let mut rem: u16 = 0;
    for byte in bytes.iter_mut() {
        let acc = (rem << 8) | u16::from(*byte);
        *byte = (acc / u16::from(divisor)) as u8;
        rem = acc % u16::from(divisor);
    }
    rem as u8
}

/// Computes `bytes * factor + addend` in place on a big-endian magnitude.
fn mul_add_small(bytes: &mut Vec<u8>, factor: u8, addend: u8) {
    let mut carry = u16::from(addend);
    for byte in bytes.iter_mut().rev() {
        let acc = u16::from(*byte) * u16::from(factor) + carry;
        *byte = acc as u8;
        carry = acc >> 8;
    }
    if carry > 0 {
        bytes.insert(0, carry as u8);
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self::from_parts(false, &value.to_be_bytes())
    }
}

impl From<u32> for Integer {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::from_parts(value < 0, &value.unsigned_abs().to_be_bytes())
    }
}

impl From<u128> for Integer {
    fn from(value: u128) -> Self {
        Self::from_parts(false, &value.to_be_bytes())
    }
}

impl From<i128> for Integer {
    fn from(value: i128) -> Self {
        Self::from_parts(value < 0, &value.unsigned_abs().to_be_bytes())
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let mut digits = Vec::new();
        let mut rest = self.magnitude.clone();
        while !rest.is_empty() {
            digits.push(b'0' + div_rem_small(&mut rest, 10));
            rest = strip_leading_zeros(rest);
        }
        if self.negative {
            digits.push(b'-');
        }
        digits.reverse();

        f.write_str(&String::from_utf8_lossy(&digits))
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self)
    }
}

impl FromStr for Integer {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DataError::InvalidInteger(s.to_string()));
        }

        let mut magnitude = Vec::new();
        for digit in digits.bytes() {
            mul_add_small(&mut magnitude, 10, digit - b'0');
        }
        Ok(Self::from_parts(negative, &magnitude))
    }
}

impl Encode for Integer {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        if !self.negative {
            match magnitude_to_u64(&self.magnitude) {
                Some(value) => write_head(out, MAJOR_UNSIGNED, value),
                None => {
                    write_head(out, MAJOR_TAG, TAG_POSITIVE_BIGNUM);
                    write_byte_string(out, &self.magnitude);
                }
            }
            return;
        }

        let arg = self.negative_argument();
        match magnitude_to_u64(&arg) {
            Some(value) => write_head(out, MAJOR_NEGATIVE, value),
            None => {
                write_head(out, MAJOR_TAG, TAG_NEGATIVE_BIGNUM);
                write_byte_string(out, &arg);
            }
        }
    }
}

impl Decode for Integer {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        match read_head(input)? {
            Head::Definite {
                major: MAJOR_UNSIGNED,
                value,
            } => Ok(Self::from(value)),
            Head::Definite {
                major: MAJOR_NEGATIVE,
                value,
            } => Ok(Self::from_negative_argument(value.to_be_bytes().to_vec())),
            Head::Definite {
                major: MAJOR_TAG,
                value: TAG_POSITIVE_BIGNUM,
            } => Ok(Self::from_parts(false, &read_byte_string(input)?)),
            Head::Definite {
                major: MAJOR_TAG,
                value: TAG_NEGATIVE_BIGNUM,
            } => Ok(Self::from_negative_argument(read_byte_string(input)?)),
            _ => Err(DecodeError::InvalidValue("expected integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(value: &Integer) -> String {
        hex::encode(value.to_bytes())
    }

    fn pow2(exp: u32) -> Integer {
        let mut magnitude = vec![1u8];
        magnitude.extend(std::iter::repeat_n(0u8, (exp / 8) as usize));
        magnitude[0] = 1 << (exp % 8);
        Integer::from_parts(false, &magnitude)
    }

    fn negate(value: &Integer) -> Integer {
        Integer::from_parts(!value.is_negative(), value.magnitude())
    }

    #[test]
    fn small_values_use_major_types() {
        assert_eq!(hex_of(&Integer::from(0u64)), "00");
        assert_eq!(hex_of(&Integer::from(23u64)), "17");
        assert_eq!(hex_of(&Integer::from(24u64)), "1818");
        assert_eq!(hex_of(&Integer::from(255u64)), "18ff");
        assert_eq!(hex_of(&Integer::from(256u64)), "190100");
        assert_eq!(hex_of(&Integer::from(65_535u64)), "19ffff");
        assert_eq!(hex_of(&Integer::from(65_536u64)), "1a00010000");
        assert_eq!(hex_of(&pow2(32)), "1b0000000100000000");
        assert_eq!(hex_of(&Integer::from(u64::MAX)), "1bffffffffffffffff");
        assert_eq!(hex_of(&Integer::from(-1i64)), "20");
        assert_eq!(hex_of(&Integer::from(-24i64)), "37");
        assert_eq!(hex_of(&Integer::from(-25i64)), "3818");
    }

    #[test]
    fn values_beyond_64_bits_use_bignum_tags() {
        assert_eq!(hex_of(&pow2(64)), "c249010000000000000000");
        assert_eq!(hex_of(&negate(&pow2(64))), "3bffffffffffffffff");
        assert_eq!(
            hex_of(&Integer::from(-(1i128 << 64) - 1)),
            "c349010000000000000000"
        );
        assert_eq!(hex_of(&pow2(100)), "c24d10000000000000000000000000");
        assert_eq!(hex_of(&negate(&pow2(100))), "c34d0fffffffffffffffffffffffff");
    }

    #[test]
    fn decode_inverts_encode() {
        let values = [
            Integer::zero(),
            Integer::from(1u64),
            Integer::from(u64::MAX),
            Integer::from(i64::MIN),
            pow2(64),
            negate(&pow2(64)),
            negate(&pow2(100)),
            Integer::from(-(1i128 << 64) - 1),
        ];
        for value in values {
            let bytes = value.to_bytes();
            assert_eq!(Integer::from_bytes(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn decode_accepts_non_canonical_bignum() {
        // tag 2 around a magnitude that would fit 64 bits
        let value = Integer::from_bytes(&[0xc2, 0x42, 0x00, 0x05]).unwrap();
        assert_eq!(value, Integer::from(5u64));
    }

    #[test]
    fn negative_zero_normalizes() {
        let value = Integer::from_parts(true, &[0, 0]);
        assert!(!value.is_negative());
        assert_eq!(value, Integer::zero());
    }

    #[test]
    fn display_and_parse() {
        let big = pow2(100);
        assert_eq!(big.to_string(), "1267650600228229401496703205376");
        assert_eq!(
            "-1267650600228229401496703205376".parse::<Integer>().unwrap(),
            negate(&big)
        );
        assert_eq!("0".parse::<Integer>().unwrap().to_string(), "0");
        assert_eq!("-0".parse::<Integer>().unwrap(), Integer::zero());
        assert_eq!(Integer::from(-42i64).to_string(), "-42");
        assert!("12a".parse::<Integer>().is_err());
        assert!("".parse::<Integer>().is_err());
        assert!("-".parse::<Integer>().is_err());
    }

    #[test]
    fn narrowing_conversions() {
        assert_eq!(Integer::from(7u64).to_u64(), Some(7));
        assert_eq!(Integer::from(-7i64).to_u64(), None);
        assert_eq!(pow2(64).to_u64(), None);
        assert_eq!(Integer::from(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(Integer::from(u64::MAX).to_i64(), None);
    }

    #[test]
    fn decode_rejects_other_items() {
        assert!(matches!(
            Integer::from_bytes(&[0x40]),
            Err(DecodeError::InvalidValue(_))
        ));
    }
}
