//! # Key Management
//!
//! secp256k1 secret keys and the addresses they control.
//!
//! ## Security considerations
//!
//! - Key generation pulls from `OsRng`.
//! - Secret bytes never appear in `Debug` output. Keep it that way: key
//!   material in logs is a leak, not a diagnostic.

use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{PublicKey, SECP256K1};
use std::fmt;
use thiserror::Error;

use crate::config::SECRET_KEY_LENGTH;
use crate::primitives::Address;

/// Errors that can occur during key operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,
}

/// A secp256k1 signing key.
///
/// Deliberately not `Serialize`. Exporting key material should be a
/// conscious call to [`SecretKey::secret_bytes`], never a side effect of
/// dumping a struct to JSON.
///
/// # Examples
///
/// ```
/// use aurora_protocol::crypto::SecretKey;
///
/// let key = SecretKey::generate();
/// let again = SecretKey::from_bytes(&key.secret_bytes()).unwrap();
/// assert_eq!(key.address(), again.address());
/// ```
#[derive(Clone)]
pub struct SecretKey {
    inner: secp256k1::SecretKey,
}

impl SecretKey {
    /// Generates a fresh key from the OS RNG.
    pub fn generate() -> Self {
        loop {
            let mut bytes = [0u8; SECRET_KEY_LENGTH];
            OsRng.fill_bytes(&mut bytes);
            // Out-of-range scalars occur with probability ~2^-128; just draw again.
            if let Ok(inner) = secp256k1::SecretKey::from_slice(&bytes) {
                return Self { inner };
            }
        }
    }

    /// Reconstructs a key from its 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let inner =
            secp256k1::SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { inner })
    }

    /// Parses a hex-encoded scalar, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let body = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(body).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&bytes)
    }

    /// Exports the raw scalar. Handle with care.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.inner.secret_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &self.inner)
    }

    /// The address controlled by this key.
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key())
    }

    pub(crate) fn as_secp(&self) -> &secp256k1::SecretKey {
        &self.inner
    }
}

/// Derives the address of a public key from its uncompressed encoding.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let mut xy = [0u8; 64];
    xy.copy_from_slice(&uncompressed[1..]);
    Address::from_public_key(&xy)
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(address={})", self.address())
    }
}

impl PartialEq for SecretKey {
    /// Compares by address, never by secret material.
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for SecretKey {}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8";

    #[test]
    fn known_key_derives_known_address() {
        let key = SecretKey::from_hex(TEST_KEY).unwrap();
        assert_eq!(
            key.address().to_hex(),
            "0x71562b71999873db5b286df957af199ec94617f7"
        );
    }

    #[test]
    fn hex_prefix_is_optional() {
        let a = SecretKey::from_hex(TEST_KEY).unwrap();
        let b = SecretKey::from_hex(&format!("0x{TEST_KEY}")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_key_material() {
        assert_eq!(
            SecretKey::from_hex("deadbeef").unwrap_err(),
            KeyError::InvalidSecretKey
        );
        assert!(SecretKey::from_hex("not-hex").is_err());
        // Zero is not a valid scalar.
        assert!(SecretKey::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(SecretKey::generate(), SecretKey::generate());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = SecretKey::from_hex(TEST_KEY).unwrap();
        let debug_str = format!("{:?}", key);
        assert!(debug_str.starts_with("SecretKey(address=0x"));
        assert!(!debug_str.contains(TEST_KEY));
    }
}
