//! Fixed-width byte types shared by every module: [`Address`] and [`Hash`].
//!
//! Both are plain `Copy` arrays with hex text forms. Addresses additionally
//! accept the native `AOA` prefix on input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, ADDRESS_PREFIX, HASH_LENGTH, MAX_SUB_ADDRESS_LENGTH};
use crate::crypto::hash::keccak256;

/// Errors produced when parsing fixed-width values from text or bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing 0x or AOA prefix")]
    MissingPrefix,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid sub-address {0:?}: up to 32 ASCII letters or digits")]
    InvalidSubAddress(String),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address.
///
/// Derived from a public key by [`Address::from_public_key`]. The text form
/// is `0x` followed by 40 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice, which must be exactly 20 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, ParseError> {
        let bytes: [u8; ADDRESS_LENGTH] =
            slice.try_into().map_err(|_| ParseError::InvalidLength {
                expected: ADDRESS_LENGTH,
                actual: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Derives the address owning a 64-byte uncompressed public key (the
    /// SEC1 encoding without its leading `0x04` tag).
    pub fn from_public_key(uncompressed: &[u8; 64]) -> Self {
        let digest = keccak256(uncompressed);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest.as_bytes()[HASH_LENGTH - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Native display form, `AOA` followed by 40 hex digits.
    pub fn to_native(&self) -> String {
        format!("{}{}", ADDRESS_PREFIX, hex::encode(self.0))
    }

    /// Parses a recipient string: an address optionally followed by a
    /// sub-address of up to 32 ASCII letters or digits, as in
    /// `AOA<40 hex digits>savings`.
    pub fn parse_with_sub_address(s: &str) -> Result<(Self, Option<String>), ParseError> {
        let body = strip_address_prefix(s).ok_or(ParseError::MissingPrefix)?;
        let hex_len = ADDRESS_LENGTH * 2;
        let Some(digits) = body.get(..hex_len) else {
            return Err(ParseError::InvalidLength {
                expected: ADDRESS_LENGTH,
                actual: body.len() / 2,
            });
        };
        let suffix = &body[hex_len..];

        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let address = Self::from_slice(&bytes)?;

        if suffix.is_empty() {
            return Ok((address, None));
        }
        if suffix.len() > MAX_SUB_ADDRESS_LENGTH || !suffix.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ParseError::InvalidSubAddress(suffix.to_string()));
        }
        Ok((address, Some(suffix.to_string())))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    /// Parses `0x…` or `AOA…` (prefix matched case-insensitively).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = strip_address_prefix(s).ok_or(ParseError::MissingPrefix)?;
        let bytes = hex::decode(body).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

fn strip_address_prefix(s: &str) -> Option<&str> {
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return Some(rest);
    }
    let prefix_len = ADDRESS_PREFIX.len();
    match s.get(..prefix_len) {
        Some(head) if head.eq_ignore_ascii_case(ADDRESS_PREFIX) => Some(&s[prefix_len..]),
        _ => None,
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(ParseError::MissingPrefix)?;
        let bytes = hex::decode(body).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let arr: [u8; HASH_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| ParseError::InvalidLength {
                    expected: HASH_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = hex::encode(self.0);
        write!(f, "Hash(0x{}…{})", &hex_str[..8], &hex_str[56..])
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "60aac5adbb14ea09b3a01f04b56aa8b5db420f55";

    #[test]
    fn parses_0x_and_native_prefix() {
        let a: Address = format!("0x{SAMPLE}").parse().unwrap();
        let b: Address = format!("AOA{SAMPLE}").parse().unwrap();
        let c: Address = format!("aoa{SAMPLE}").parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_native(), format!("AOA{SAMPLE}"));
    }

    #[test]
    fn rejects_missing_prefix_and_bad_length() {
        assert_eq!(SAMPLE.parse::<Address>(), Err(ParseError::MissingPrefix));
        assert!(matches!(
            "0x60aa".parse::<Address>(),
            Err(ParseError::InvalidLength { expected: 20, actual: 2 })
        ));
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn sub_address_suffix_is_split_off() {
        let plain = "AOA60aac5adbb14ea09b3a01f04b56aa8b5db420f55";
        let (address, sub) = Address::parse_with_sub_address(plain).unwrap();
        assert_eq!(address, plain.parse().unwrap());
        assert_eq!(sub, None);

        let (with_sub, sub) = Address::parse_with_sub_address(&format!("{plain}Savings01")).unwrap();
        assert_eq!(with_sub, address);
        assert_eq!(sub.as_deref(), Some("Savings01"));

        let longest = format!("0x{}{}", "ab".repeat(20), "z".repeat(32));
        assert_eq!(
            Address::parse_with_sub_address(&longest).unwrap().1.map(|s| s.len()),
            Some(32)
        );
    }

    #[test]
    fn bad_sub_addresses_are_rejected() {
        let base = format!("0x{}", "ab".repeat(20));
        for suffix in ["x".repeat(33), "desk-2".to_string(), "caf\u{e9}".to_string()] {
            assert!(matches!(
                Address::parse_with_sub_address(&format!("{base}{suffix}")),
                Err(ParseError::InvalidSubAddress(_))
            ));
        }
        assert!(matches!(
            Address::parse_with_sub_address("0xabcd"),
            Err(ParseError::InvalidLength { .. })
        ));
        // The strict parser still wants exactly 20 bytes.
        assert!(format!("{base}desk").parse::<Address>().is_err());
    }

    #[test]
    fn display_roundtrip() {
        let addr = Address::new([0xab; 20]);
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn address_from_public_key_takes_hash_suffix() {
        let pubkey = [7u8; 64];
        let digest = keccak256(&pubkey);
        let addr = Address::from_public_key(&pubkey);
        assert_eq!(addr.as_bytes(), &digest.as_bytes()[12..]);
    }

    #[test]
    fn hash_serde_roundtrip() {
        let h = keccak256(b"aurora");
        let json = serde_json::to_string(&h).unwrap();
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
