//! # Protocol Configuration & Constants
//!
//! Every magic number in the transaction core lives here. If you're
//! hardcoding a curve constant or a field width somewhere else, move it.
//!
//! Nothing in this module is mutable. Chain scoping is passed into the
//! [`Signer`](crate::transaction::Signer) explicitly; the well-known chain
//! ids below are conveniences for tooling, not global state.

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Chain id of the public Aurora network.
pub const CHAIN_ID_MAINNET: u64 = 1;

/// Chain id of the public test network.
pub const CHAIN_ID_TESTNET: u64 = 3;

/// Chain id used by local development chains.
pub const CHAIN_ID_DEVNET: u64 = 1337;

/// Native textual prefix for addresses. Accepted (case-insensitively) in
/// place of `0x` when parsing.
pub const ADDRESS_PREFIX: &str = "AOA";

// ---------------------------------------------------------------------------
// Field Widths
// ---------------------------------------------------------------------------

/// Address length in bytes: the trailing 20 bytes of the keccak-256 of the
/// uncompressed public key.
pub const ADDRESS_LENGTH: usize = 20;

/// Hash output length in bytes. keccak-256 produces 32-byte digests.
pub const HASH_LENGTH: usize = 32;

/// Longest sub-address that may trail a textual address, in characters.
pub const MAX_SUB_ADDRESS_LENGTH: usize = 32;

/// Length of a secp256k1 secret scalar in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Signature Parameters
// ---------------------------------------------------------------------------

/// Order `n` of the secp256k1 group, big-endian.
pub const SECP256K1_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// `n / 2`, the largest `s` accepted in canonical (low-s) form.
pub const SECP256K1_HALF_N: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Base added to the recovery parity when a signature is folded with a
/// chain id: `v = 2 * chain_id + CHAIN_ID_V_OFFSET + parity`.
pub const CHAIN_ID_V_OFFSET: u64 = 35;

/// Legacy unscoped recovery indicators are `27 + parity`.
pub const LEGACY_V_OFFSET: u64 = 27;

// ---------------------------------------------------------------------------
// Pool Defaults
// ---------------------------------------------------------------------------

/// Default upper bound on transactions held by the pending pool.
pub const DEFAULT_POOL_CAPACITY: usize = 4_096;

/// Default per-sender cap in the pending pool.
pub const DEFAULT_MAX_PER_SENDER: usize = 64;

/// Default gas budget for a block assembled by `fill_block`.
pub const DEFAULT_BLOCK_GAS_LIMIT: u64 = 8_000_000;
