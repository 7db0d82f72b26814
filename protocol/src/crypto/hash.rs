//! # Hashing Utilities
//!
//! keccak-256 is the only hash function the transaction core needs. It
//! produces transaction hashes, signing digests, and derives addresses from
//! public keys.
//!
//! This is the original Keccak padding (as deployed by Ethereum-family
//! chains), not the finalized NIST SHA3-256. The two differ in a single
//! domain byte and produce unrelated digests.

use sha3::{Digest, Keccak256};

use crate::primitives::Hash;

/// Compute the keccak-256 hash of the input data.
///
/// # Example
///
/// ```
/// use aurora_protocol::crypto::keccak256;
///
/// let hash = keccak256(b"aurora");
/// assert_eq!(hash.as_bytes().len(), 32);
/// ```
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    to_hash(hasher)
}

fn to_hash(hasher: Keccak256) -> Hash {
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    Hash::new(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_empty_vector() {
        // keccak-256 of the empty string. If this ever matches
        // a7ffc6f8bf1ed766..., someone swapped in NIST SHA3.
        let hash = keccak256(b"");
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn keccak256_abc_vector() {
        let hash = keccak256(b"abc");
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn keccak256_deterministic() {
        assert_eq!(keccak256(b"aurora"), keccak256(b"aurora"));
        assert_ne!(keccak256(b"aurora"), keccak256(b"Aurora"));
    }
}
