//! # Transaction Module
//!
//! The ledger transaction record, its two wire forms, and the signer that
//! binds a record to its sender.
//!
//! ## Architecture
//!
//! ```text
//! types.rs     Action tag and the typed TxKind view
//! builder.rs   Transaction record, write-once caches, fluent TransactionBuilder
//! encoding.rs  binary form: tagged RLP entries, required vs nilable fields
//! json.rs      text form: JSON with 0x hex, serde impls for Transaction
//! signing.rs   recoverable secp256k1 signatures, chain-id folding, sender cache
//! asset.rs     AssetInfo descriptor carried by PublishAsset transactions
//! inner.rs     InnerTx records produced by contract execution
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** with [`TransactionBuilder`]; the record is unsigned.
//! 2. **Sign** with [`Signer::sign`], which returns a new record with `v, r, s`.
//! 3. **Recover** the sender with [`Signer::sender`]; the result is cached.
//! 4. **Select** for a block through [`crate::txpool`].
//!
//! Records never change after construction. The hash and sender caches are
//! pure functions of the signed fields and are filled at most once.

pub mod asset;
pub mod builder;
pub mod encoding;
pub mod inner;
pub mod json;
pub mod signing;
pub mod types;

pub use asset::{AssetInfo, AssetInfoError};
pub use builder::{Transaction, TransactionBuilder, TxData};
pub use encoding::{decode, encode, DecodeError, Field};
pub use inner::{InnerTx, InnerTxError};
pub use json::{decode_text, encode_text};
pub use signing::{SignatureError, Signer};
pub use types::{Action, TxKind};
