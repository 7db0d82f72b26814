//! Pending transaction pool.
//!
//! Thread-safe staging area for signature-checked transactions waiting for
//! block inclusion. Transactions are grouped by recovered sender and kept in
//! nonce order, which is exactly the shape a
//! [`TransactionsByPriceAndNonce`] consumes.
//!
//! ## Design
//!
//! - `DashMap<Address, BTreeMap<nonce, tx>>` holds the per-sender queues;
//!   concurrent `add`s from different senders rarely contend.
//! - `parking_lot::RwLock<Vec<Address>>` records the order in which senders
//!   first appeared. Snapshots list accounts in that order so that selection
//!   tie-breaks do not depend on hash-map iteration.
//! - A sender's queue is created and removed only while the sender list is
//!   write-locked, so the list and the map never disagree. Lock order is
//!   sender list first, then queue shard.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use super::selection::TransactionsByPriceAndNonce;
use crate::config::{DEFAULT_MAX_PER_SENDER, DEFAULT_POOL_CAPACITY};
use crate::primitives::Address;
use crate::transaction::{SignatureError, Signer, Transaction};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable limits for the pending pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of transactions held across all senders.
    pub capacity: usize,

    /// Maximum pending transactions per sender.
    pub max_per_sender: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
            max_per_sender: DEFAULT_MAX_PER_SENDER,
        }
    }
}

// ---------------------------------------------------------------------------
// PoolError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("invalid sender: {0}")]
    InvalidSender(#[from] SignatureError),

    /// Same sender and nonce already pending at an equal or higher price.
    #[error("replacement transaction underpriced (sender {sender}, nonce {nonce})")]
    Underpriced { sender: Address, nonce: u64 },

    #[error("sender {sender} exceeded per-sender limit of {limit}")]
    SenderLimitExceeded { sender: Address, limit: usize },

    #[error("pool is full ({capacity} transactions)")]
    PoolFull { capacity: usize },
}

// ---------------------------------------------------------------------------
// PendingPool
// ---------------------------------------------------------------------------

pub struct PendingPool {
    signer: Signer,
    config: PoolConfig,
    queues: DashMap<Address, BTreeMap<u64, Transaction>>,
    /// Senders in first-seen order.
    senders: RwLock<Vec<Address>>,
    size: AtomicUsize,
}

impl fmt::Debug for PendingPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPool")
            .field("signer", &self.signer)
            .field("size", &self.len())
            .field("senders", &self.queues.len())
            .field("config", &self.config)
            .finish()
    }
}

impl PendingPool {
    pub fn new(signer: Signer, config: PoolConfig) -> Self {
        Self {
            signer,
            config,
            queues: DashMap::new(),
            senders: RwLock::new(Vec::new()),
            size: AtomicUsize::new(0),
        }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Admits a transaction, returning its recovered sender.
    ///
    /// A transaction with the nonce of one already pending replaces it only
    /// if its gas price is strictly higher.
    pub fn add(&self, tx: Transaction) -> Result<Address, PoolError> {
        let sender = self.signer.sender(&tx)?;

        if let Some(mut queue) = self.queues.get_mut(&sender) {
            self.insert(&mut *queue, sender, tx)?;
            return Ok(sender);
        }

        let mut senders = self.senders.write();
        match self.queues.entry(sender) {
            Entry::Occupied(mut occupied) => self.insert(occupied.get_mut(), sender, tx)?,
            Entry::Vacant(vacant) => {
                // Nothing is stored for a sender whose first transaction is rejected.
                let mut queue = BTreeMap::new();
                self.insert(&mut queue, sender, tx)?;
                vacant.insert(queue);
                senders.push(sender);
            }
        }
        Ok(sender)
    }

    fn insert(
        &self,
        queue: &mut BTreeMap<u64, Transaction>,
        sender: Address,
        tx: Transaction,
    ) -> Result<(), PoolError> {
        let nonce = tx.nonce();

        if let Some(existing) = queue.get(&nonce) {
            if tx.gas_price() <= existing.gas_price() {
                return Err(PoolError::Underpriced { sender, nonce });
            }
            debug!(sender = %sender, nonce = nonce, "replacing pending transaction");
            queue.insert(nonce, tx);
            return Ok(());
        }

        if queue.len() >= self.config.max_per_sender {
            return Err(PoolError::SenderLimitExceeded {
                sender,
                limit: self.config.max_per_sender,
            });
        }
        let reserved = self
            .size
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.config.capacity).then_some(n + 1)
            });
        if reserved.is_err() {
            return Err(PoolError::PoolFull {
                capacity: self.config.capacity,
            });
        }

        debug!(sender = %sender, nonce = nonce, tx_hash = %tx.hash(), "transaction added to pool");
        queue.insert(nonce, tx);
        Ok(())
    }

    /// Copies the pending queues, accounts in first-seen order and each
    /// queue in nonce order. Later pool mutations do not affect the copy.
    pub fn snapshot(&self) -> Vec<(Address, Vec<Transaction>)> {
        let senders = self.senders.read().clone();
        senders
            .into_iter()
            .filter_map(|sender| {
                let queue = self.queues.get(&sender)?;
                if queue.is_empty() {
                    return None;
                }
                Some((sender, queue.values().cloned().collect()))
            })
            .collect()
    }

    /// A selector over the current snapshot.
    pub fn selection(&self) -> TransactionsByPriceAndNonce {
        TransactionsByPriceAndNonce::new(self.snapshot())
    }

    /// Drops transactions that made it into a block, along with any
    /// lower-nonce transactions of the same sender, which are now stale.
    pub fn remove_included(&self, included: &[Transaction]) {
        let mut removed = 0usize;
        for tx in included {
            let Ok(sender) = self.signer.sender(tx) else {
                continue;
            };
            if let Some(mut queue) = self.queues.get_mut(&sender) {
                let keep = match tx.nonce().checked_add(1) {
                    Some(next) => queue.split_off(&next),
                    None => BTreeMap::new(),
                };
                removed += queue.len();
                *queue = keep;
            }
            let mut senders = self.senders.write();
            if self
                .queues
                .remove_if(&sender, |_, queue| queue.is_empty())
                .is_some()
            {
                senders.retain(|s| *s != sender);
            }
        }

        self.size.fetch_sub(removed, Ordering::AcqRel);
        debug!(removed = removed, remaining = self.len(), "pruned included transactions");
    }

    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
