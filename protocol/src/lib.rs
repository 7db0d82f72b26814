// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Aurora Protocol: Transaction Core
//!
//! The part of an account-based ledger client that every other part leans
//! on: what a transaction is, how it travels, who sent it, and which ones go
//! into the next block.
//!
//! Signatures are recoverable secp256k1 ECDSA over keccak-256 digests, with
//! an optional chain id folded into the recovery indicator so that a
//! transaction signed for one network is not replayable on another.
//!
//! ## Architecture
//!
//! - **config**: protocol constants such as chain ids, curve order, pool limits.
//! - **primitives**: `Address` and `Hash`, with their text forms.
//! - **crypto**: keccak-256 and secp256k1 secret keys.
//! - **codec**: Strict RLP and canonical `0x` hex building blocks.
//! - **transaction**: The record, its binary and text forms, the signer.
//! - **txpool**: Pending pool, price/nonce selection and block filling.
//!
//! ## Ground Rules
//!
//! 1. Records are immutable once built. Signing returns a new record.
//! 2. Decoders reject every non-canonical input; each value has one encoding.
//! 3. Nothing in this crate panics on untrusted bytes.
//! 4. Selection order is total and never depends on hash-map iteration.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod primitives;
pub mod transaction;
pub mod txpool;
