//! # Block Filling
//!
//! Drains a [`TransactionsByPriceAndNonce`] into the transaction list of one
//! block under a gas budget.
//!
//! ```text
//! loop:
//!   peek best head
//!   gas > remaining budget  → pop   (account skipped for this block)
//!   check(tx) fails         → pop   (account skipped for this block)
//!   otherwise               → include, shift
//! ```
//!
//! Skipping pops the whole account: its later transactions depend on the
//! skipped one through the nonce.

use std::fmt;

use tracing::{debug, info};

use super::selection::TransactionsByPriceAndNonce;
use crate::primitives::Address;
use crate::transaction::Transaction;

/// Outcome of one [`fill_block`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSelection {
    /// Chosen transactions in inclusion order.
    pub included: Vec<Transaction>,
    /// Accounts whose remaining transactions were dropped from this block,
    /// in the order they were skipped.
    pub skipped_accounts: Vec<Address>,
    /// Sum of `gas` over `included`.
    pub gas_used: u64,
}

/// Fills one block from `queue`.
///
/// `check` is consulted for every candidate that fits in the remaining
/// budget, e.g. to execute it against pending state; an `Err` skips the
/// candidate's account. The queue is fully drained on return.
pub fn fill_block<F, E>(
    queue: &mut TransactionsByPriceAndNonce,
    gas_budget: u64,
    mut check: F,
) -> BlockSelection
where
    F: FnMut(&Transaction) -> Result<(), E>,
    E: fmt::Display,
{
    info!(
        candidates = queue.len(),
        accounts = queue.accounts().len(),
        gas_budget = gas_budget,
        "starting block selection"
    );

    let mut selection = BlockSelection::default();
    let mut remaining = gas_budget;

    while let Some(tx) = queue.peek() {
        let account = queue.peek_account().unwrap_or_default();

        if tx.gas() > remaining {
            debug!(
                account = %account,
                nonce = tx.nonce(),
                gas = tx.gas(),
                remaining = remaining,
                "transaction exceeds remaining gas, skipping account"
            );
            selection.skipped_accounts.push(account);
            queue.pop();
            continue;
        }

        if let Err(e) = check(tx) {
            debug!(
                account = %account,
                nonce = tx.nonce(),
                error = %e,
                "transaction rejected, skipping account"
            );
            selection.skipped_accounts.push(account);
            queue.pop();
            continue;
        }

        debug!(
            account = %account,
            nonce = tx.nonce(),
            gas_price = %tx.gas_price(),
            "transaction included"
        );
        remaining -= tx.gas();
        selection.gas_used += tx.gas();
        selection.included.push(tx.clone());
        queue.shift();
    }

    info!(
        tx_count = selection.included.len(),
        gas_used = selection.gas_used,
        skipped = selection.skipped_accounts.len(),
        "block selection finished"
    );

    selection
}
