//! # Cryptographic Primitives
//!
//! Thin wrappers over audited implementations: keccak-256 from `sha3` and
//! secp256k1 from `secp256k1`. Signature recovery for transactions lives in
//! [`crate::transaction::signing`], which builds on these.

pub mod hash;
pub mod keys;

pub use hash::keccak256;
pub use keys::{public_key_to_address, KeyError, SecretKey};
