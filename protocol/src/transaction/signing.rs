//! Recoverable secp256k1 signatures and sender recovery.
//!
//! A [`Signer`] is a chain scope: either unscoped, or bound to one chain id.
//! A scoped signer folds its chain id into the recovery indicator,
//! `v = 2 * chain_id + 35 + parity`, and commits to the chain id in the
//! signing digest, so a signature made for one chain does not verify on
//! another.
//!
//! Recovery validates `r` and `s` before touching the curve: both must be
//! non-zero and below the group order, and `s` must lie in the lower half.
//! The recovered sender is cached on the record together with the scope it
//! was recovered under.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SECP256K1};
use thiserror::Error;
use tracing::debug;

use super::builder::{CachedSender, Transaction};
use super::encoding::{push_value, Field};
use crate::codec::rlp::RlpList;
use crate::config::{CHAIN_ID_V_OFFSET, LEGACY_V_OFFSET, SECP256K1_HALF_N, SECP256K1_N};
use crate::crypto::hash::keccak256;
use crate::crypto::keys::{public_key_to_address, KeyError, SecretKey};
use crate::primitives::{Address, Hash};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature values out of range: r and s must be in [1, n) with s <= n/2")]
    NonCanonical,

    #[error("invalid recovery indicator for this signer")]
    InvalidRecoveryIndicator,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("invalid secret key")]
    InvalidSecretKey,
}

impl From<KeyError> for SignatureError {
    fn from(_: KeyError) -> Self {
        SignatureError::InvalidSecretKey
    }
}

/// Signs transactions and recovers their senders under one chain scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signer {
    chain_id: Option<u64>,
}

impl Signer {
    pub fn new(chain_id: Option<u64>) -> Self {
        Self { chain_id }
    }

    /// A signer whose signatures are valid on any chain.
    pub fn unprotected() -> Self {
        Self { chain_id: None }
    }

    pub fn with_chain_id(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// The digest that gets signed: keccak-256 over the RLP list of every
    /// field value except `v`, `r`, `s`, followed by `chain_id, 0, 0` when
    /// the signer is scoped.
    pub fn signature_hash(&self, tx: &Transaction) -> Hash {
        let mut list = RlpList::new();
        for field in Field::ALL.into_iter().filter(|f| !f.is_signature()) {
            push_value(&mut list, tx.data(), field);
        }
        if let Some(chain_id) = self.chain_id {
            list.u64(chain_id).u64(0).u64(0);
        }
        keccak256(&list.finish())
    }

    /// Signs `tx`, returning a new record carrying `v`, `r`, `s`.
    ///
    /// Signatures are deterministic (RFC 6979) and always low-s.
    pub fn sign(&self, tx: &Transaction, key: &SecretKey) -> Result<Transaction, SignatureError> {
        let digest = self.signature_hash(tx);
        let message = Message::from_digest(*digest.as_bytes());
        let signature = SECP256K1.sign_ecdsa_recoverable(&message, key.as_secp());
        let (recovery_id, compact) = signature.serialize_compact();

        let parity = u64::try_from(recovery_id.to_i32())
            .map_err(|_| SignatureError::InvalidRecoveryIndicator)?;
        let v = match self.chain_id {
            Some(chain_id) => {
                BigUint::from(chain_id) * 2u32 + CHAIN_ID_V_OFFSET + parity
            }
            None => BigUint::from(parity),
        };
        let r = BigUint::from_bytes_be(&compact[..32]);
        let s = BigUint::from_bytes_be(&compact[32..]);

        Ok(tx.with_signature(v, r, s))
    }

    /// Signs with a raw 32-byte scalar.
    pub fn sign_with_bytes(
        &self,
        tx: &Transaction,
        key: &[u8],
    ) -> Result<Transaction, SignatureError> {
        let key = SecretKey::from_bytes(key)?;
        self.sign(tx, &key)
    }

    /// Recovers the address that signed `tx`.
    ///
    /// The result is cached on the record. A record whose cache was filled
    /// under a different scope is recovered afresh and its cache left alone.
    pub fn sender(&self, tx: &Transaction) -> Result<Address, SignatureError> {
        if let Some(cached) = tx.cached_sender() {
            if cached.chain_id == self.chain_id {
                return Ok(cached.address);
            }
            return self.recover(tx);
        }

        let address = self.recover(tx)?;
        let stored = tx.cache_sender(CachedSender {
            chain_id: self.chain_id,
            address,
        });
        // Another scope may have won the race to fill the cache.
        if stored.chain_id == self.chain_id {
            Ok(stored.address)
        } else {
            Ok(address)
        }
    }

    fn recover(&self, tx: &Transaction) -> Result<Address, SignatureError> {
        let (v, r, s) = tx.signature_values();

        let r_bytes = scalar_bytes(r)?;
        let s_bytes = scalar_bytes(s)?;
        if r_bytes >= SECP256K1_N || s_bytes > SECP256K1_HALF_N {
            return Err(SignatureError::NonCanonical);
        }

        let parity = self.recovery_parity(v)?;
        let recovery_id =
            RecoveryId::from_i32(parity).map_err(|_| SignatureError::InvalidRecoveryIndicator)?;

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&r_bytes);
        compact[32..].copy_from_slice(&s_bytes);
        let signature = RecoverableSignature::from_compact(&compact, recovery_id)
            .map_err(|_| SignatureError::RecoveryFailed)?;

        let digest = self.signature_hash(tx);
        let message = Message::from_digest(*digest.as_bytes());
        let public_key = SECP256K1
            .recover_ecdsa(&message, &signature)
            .map_err(|e| {
                debug!(error = %e, chain_id = ?self.chain_id, "sender recovery failed");
                SignatureError::RecoveryFailed
            })?;

        Ok(public_key_to_address(&public_key))
    }

    /// Maps `v` to the curve point parity. Unscoped signers accept
    /// `0, 1, 27, 28`; scoped signers accept only their own fold.
    fn recovery_parity(&self, v: &BigUint) -> Result<i32, SignatureError> {
        let v = v.to_u128().ok_or(SignatureError::InvalidRecoveryIndicator)?;
        let base = match self.chain_id {
            Some(chain_id) => u128::from(chain_id) * 2 + u128::from(CHAIN_ID_V_OFFSET),
            None if v >= u128::from(LEGACY_V_OFFSET) => u128::from(LEGACY_V_OFFSET),
            None => 0,
        };
        match v.checked_sub(base) {
            Some(0) => Ok(0),
            Some(1) => Ok(1),
            _ => Err(SignatureError::InvalidRecoveryIndicator),
        }
    }
}

/// Left-pads a signature scalar to 32 bytes, rejecting zero and anything
/// wider than 256 bits.
fn scalar_bytes(value: &BigUint) -> Result<[u8; 32], SignatureError> {
    if value.is_zero() {
        return Err(SignatureError::NonCanonical);
    }
    let be = value.to_bytes_be();
    if be.len() > 32 {
        return Err(SignatureError::NonCanonical);
    }
    let mut out = [0u8; 32];
    out[32 - be.len()..].copy_from_slice(&be);
    Ok(out)
}
