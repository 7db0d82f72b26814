//! `0x`-prefixed hex for the text form.
//!
//! Two shapes are supported:
//!
//! - **quantities** (integers): `0x` followed by at least one digit and no
//!   leading zeros, so zero is `0x0` and `0x01` is rejected;
//! - **data** (byte strings): `0x` followed by an even number of digits,
//!   the empty string being `0x`.
//!
//! The wrapper types [`HexU64`], [`HexBig`] and [`HexBytes`] plug those
//! rules into serde.

use std::fmt;

use num_bigint::BigUint;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("hex string without 0x prefix")]
    MissingPrefix,

    #[error("hex string \"0x\" is not a number")]
    EmptyNumber,

    #[error("hex number with leading zero digits")]
    LeadingZero,

    #[error("invalid hex digit")]
    InvalidDigit,

    #[error("hex string of odd length")]
    OddLength,

    #[error("hex number wider than {0} bits")]
    Overflow(u64),
}

pub fn encode_u64(value: u64) -> String {
    format!("0x{:x}", value)
}

pub fn encode_big(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn decode_u64(s: &str) -> Result<u64, HexError> {
    let digits = quantity_digits(s)?;
    if digits.len() > 16 {
        return Err(HexError::Overflow(64));
    }
    u64::from_str_radix(digits, 16).map_err(|_| HexError::InvalidDigit)
}

/// Arbitrary-precision quantity. No width limit.
pub fn decode_big(s: &str) -> Result<BigUint, HexError> {
    let digits = quantity_digits(s)?;
    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or(HexError::InvalidDigit)
}

pub fn decode_bytes(s: &str) -> Result<Vec<u8>, HexError> {
    let body = strip_prefix(s)?;
    if body.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }
    hex::decode(body).map_err(|_| HexError::InvalidDigit)
}

fn strip_prefix(s: &str) -> Result<&str, HexError> {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or(HexError::MissingPrefix)
}

fn quantity_digits(s: &str) -> Result<&str, HexError> {
    let digits = strip_prefix(s)?;
    if digits.is_empty() {
        return Err(HexError::EmptyNumber);
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(HexError::LeadingZero);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigit);
    }
    Ok(digits)
}

// ---------------------------------------------------------------------------
// serde wrappers
// ---------------------------------------------------------------------------

/// A `u64` rendered as a hex quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexU64(pub u64);

/// A big unsigned integer rendered as a hex quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBig(pub BigUint);

/// A byte string rendered as hex data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl Serialize for HexU64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_u64(self.0))
    }
}

impl Serialize for HexBig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_big(&self.0))
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_bytes(&self.0))
    }
}

/// Accepts only JSON strings, then applies `parse`. Bare JSON numbers are
/// rejected: the text form has exactly one spelling per value.
struct HexVisitor<T> {
    expecting: &'static str,
    parse: fn(&str) -> Result<T, HexError>,
}

impl<'de, T> Visitor<'de> for HexVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        (self.parse)(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for HexU64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_str(HexVisitor {
                expecting: "a 0x-prefixed hex quantity",
                parse: decode_u64,
            })
            .map(HexU64)
    }
}

impl<'de> Deserialize<'de> for HexBig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_str(HexVisitor {
                expecting: "a 0x-prefixed hex quantity",
                parse: decode_big,
            })
            .map(HexBig)
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_str(HexVisitor {
                expecting: "0x-prefixed hex data",
                parse: decode_bytes,
            })
            .map(HexBytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_are_minimal() {
        assert_eq!(encode_u64(0), "0x0");
        assert_eq!(encode_u64(255), "0xff");
        assert_eq!(encode_big(&BigUint::from(0u8)), "0x0");
        assert_eq!(encode_big(&BigUint::from(4096u32)), "0x1000");
    }

    #[test]
    fn decode_rejects_non_canonical_quantities() {
        assert_eq!(decode_u64("0x0"), Ok(0));
        assert_eq!(decode_u64("0xFF"), Ok(255));
        assert_eq!(decode_u64("ff"), Err(HexError::MissingPrefix));
        assert_eq!(decode_u64("0x"), Err(HexError::EmptyNumber));
        assert_eq!(decode_u64("0x01"), Err(HexError::LeadingZero));
        assert_eq!(decode_u64("0xg1"), Err(HexError::InvalidDigit));
        assert_eq!(decode_u64("0x+1"), Err(HexError::InvalidDigit));
        assert_eq!(
            decode_u64("0x10000000000000000"),
            Err(HexError::Overflow(64))
        );
    }

    #[test]
    fn big_quantities_have_no_width_limit() {
        let wide = BigUint::from(1u8) << 300u32;
        let text = encode_big(&wide);
        assert_eq!(text.len(), 2 + 76);
        assert_eq!(decode_big(&text), Ok(wide));
        assert_eq!(decode_big("0x00"), Err(HexError::LeadingZero));
    }

    #[test]
    fn data_roundtrip_and_errors() {
        assert_eq!(encode_bytes(&[]), "0x");
        assert_eq!(decode_bytes("0x"), Ok(vec![]));
        assert_eq!(decode_bytes("0x00ab"), Ok(vec![0x00, 0xab]));
        assert_eq!(decode_bytes("0xabc"), Err(HexError::OddLength));
        assert_eq!(decode_bytes("abcd"), Err(HexError::MissingPrefix));
    }

    #[test]
    fn serde_wrappers_reject_json_numbers() {
        assert!(serde_json::from_str::<HexU64>("17").is_err());
        assert_eq!(
            serde_json::from_str::<HexU64>("\"0x11\"").unwrap(),
            HexU64(17)
        );
        assert_eq!(
            serde_json::to_string(&HexBytes(vec![1, 2])).unwrap(),
            "\"0x0102\""
        );
    }
}
