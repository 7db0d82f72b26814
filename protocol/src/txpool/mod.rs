//! # Transaction Pool
//!
//! Everything between "signed transaction received" and "transaction list
//! of a block":
//!
//! ```text
//! pending.rs   PendingPool: signature-checked staging area grouped by sender
//! selection.rs TransactionsByPriceAndNonce: heap of per-account queue heads
//! producer.rs  fill_block: drain a selector under a gas budget
//! ```
//!
//! ## Flow
//!
//! 1. **Admit**: [`PendingPool::add`] recovers the sender and queues the
//!    transaction by nonce.
//! 2. **Snapshot**: [`PendingPool::selection`] copies the queues into a
//!    [`TransactionsByPriceAndNonce`].
//! 3. **Fill**: [`fill_block`] takes the best head while it fits, popping
//!    accounts whose head cannot be included.
//! 4. **Prune**: [`PendingPool::remove_included`] forgets what was mined.

pub mod pending;
pub mod producer;
pub mod selection;

pub use pending::{PendingPool, PoolConfig, PoolError};
pub use producer::{fill_block, BlockSelection};
pub use selection::TransactionsByPriceAndNonce;
