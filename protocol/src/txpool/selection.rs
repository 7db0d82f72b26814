//! Price-and-nonce ordered selection of pending transactions.
//!
//! Each account contributes a queue of transactions sorted by nonce. Only the
//! head of each queue competes; the heads sit in a max-heap keyed by gas
//! price. Taking the best head exposes that account's next transaction,
//! which may be cheaper than heads of other accounts. Consecutive picks are
//! therefore not monotonic in price, but no account's transactions ever
//! leave out of nonce order.
//!
//! ```text
//!   A: [n0 @5, n1 @7]     heap: B#0(6), A#0(5)
//!   B: [n0 @6]            order: B#0(6) → A#0(5) → A#1(7)
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use num_bigint::BigUint;
use tracing::debug;

use crate::primitives::Address;
use crate::transaction::{SignatureError, Signer, Transaction};

// ---------------------------------------------------------------------------
// Head: heap entry
// ---------------------------------------------------------------------------

/// The current head of one account's queue.
///
/// Ordered by gas price, highest first. Equal prices fall back to the
/// account's first-seen position, earlier accounts winning, so the order is
/// total and independent of hashing.
#[derive(Debug)]
struct Head {
    price: BigUint,
    account: usize,
    tx: Transaction,
}

impl Head {
    fn new(account: usize, tx: Transaction) -> Self {
        Self {
            price: tx.gas_price().clone(),
            account,
            tx,
        }
    }
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        self.price
            .cmp(&other.price)
            .then_with(|| other.account.cmp(&self.account))
    }
}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Head {}

// ---------------------------------------------------------------------------
// TransactionsByPriceAndNonce
// ---------------------------------------------------------------------------

/// Single-pass selector over per-account transaction queues.
///
/// Typical use by a block builder:
///
/// ```
/// # use aurora_protocol::primitives::Address;
/// # use aurora_protocol::transaction::{Action, TransactionBuilder};
/// # use aurora_protocol::txpool::TransactionsByPriceAndNonce;
/// # let tx = |nonce, price: u64| TransactionBuilder::new(Action::Transfer).nonce(nonce).gas_price(price).build();
/// let a = Address::new([0xa; 20]);
/// let b = Address::new([0xb; 20]);
/// let mut queue = TransactionsByPriceAndNonce::new(vec![
///     (a, vec![tx(0, 5), tx(1, 7)]),
///     (b, vec![tx(0, 6)]),
/// ]);
///
/// let mut order = Vec::new();
/// while let Some(next) = queue.peek() {
///     order.push((queue.peek_account().unwrap(), next.nonce()));
///     queue.shift();
/// }
/// assert_eq!(order, [(b, 0), (a, 0), (a, 1)]);
/// ```
#[derive(Debug, Default)]
pub struct TransactionsByPriceAndNonce {
    /// Accounts in first-seen order with the not-yet-exposed rest of their
    /// queue. The head of each queue lives in `heads`.
    accounts: Vec<(Address, VecDeque<Transaction>)>,
    heads: BinaryHeap<Head>,
    /// Transactions still selectable, heads included.
    remaining: usize,
}

impl TransactionsByPriceAndNonce {
    /// Builds the selector from `(account, queue)` pairs.
    ///
    /// Each queue must already be sorted by ascending nonce. Empty queues
    /// are ignored. Pairs are indexed in iteration order, which decides
    /// ties between equal prices.
    pub fn new<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (Address, Vec<Transaction>)>,
    {
        let mut accounts = Vec::new();
        let mut heads = BinaryHeap::new();
        let mut remaining = 0;

        for (address, txs) in groups {
            let mut queue = VecDeque::from(txs);
            let Some(head) = queue.pop_front() else {
                continue;
            };
            remaining += 1 + queue.len();
            heads.push(Head::new(accounts.len(), head));
            accounts.push((address, queue));
        }

        Self {
            accounts,
            heads,
            remaining,
        }
    }

    /// Groups signed transactions by recovered sender, sorts each group by
    /// nonce and builds the selector.
    ///
    /// Accounts keep the order in which their first transaction appears in
    /// `txs`. Transactions whose sender cannot be recovered are returned
    /// alongside the selector instead of being selected.
    pub fn from_signed<I>(signer: &Signer, txs: I) -> (Self, Vec<(Transaction, SignatureError)>)
    where
        I: IntoIterator<Item = Transaction>,
    {
        let mut index: HashMap<Address, usize> = HashMap::new();
        let mut groups: Vec<(Address, Vec<Transaction>)> = Vec::new();
        let mut rejected = Vec::new();

        for tx in txs {
            match signer.sender(&tx) {
                Ok(sender) => {
                    let slot = *index.entry(sender).or_insert_with(|| {
                        groups.push((sender, Vec::new()));
                        groups.len() - 1
                    });
                    groups[slot].1.push(tx);
                }
                Err(e) => {
                    debug!(tx_hash = %tx.hash(), error = %e, "dropping transaction with unrecoverable sender");
                    rejected.push((tx, e));
                }
            }
        }

        for (_, queue) in groups.iter_mut() {
            queue.sort_by_key(Transaction::nonce);
        }

        (Self::new(groups), rejected)
    }

    /// The best transaction currently on offer. Does not advance.
    pub fn peek(&self) -> Option<&Transaction> {
        self.heads.peek().map(|head| &head.tx)
    }

    /// The account owning [`peek`](Self::peek)'s transaction.
    pub fn peek_account(&self) -> Option<Address> {
        self.heads.peek().map(|head| self.accounts[head.account].0)
    }

    /// Accepts the current best transaction and exposes its account's next
    /// one, dropping the account when its queue is exhausted.
    pub fn shift(&mut self) {
        let Some(head) = self.heads.pop() else {
            return;
        };
        self.remaining -= 1;
        if let Some(next) = self.accounts[head.account].1.pop_front() {
            self.heads.push(Head::new(head.account, next));
        }
    }

    /// Discards the current best transaction together with every later
    /// transaction of the same account.
    ///
    /// Used when the head cannot be included: its successors depend on it
    /// through the nonce and cannot be included either.
    pub fn pop(&mut self) {
        let Some(head) = self.heads.pop() else {
            return;
        };
        let rest = &mut self.accounts[head.account].1;
        self.remaining -= 1 + rest.len();
        rest.clear();
    }

    /// Transactions still selectable.
    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Accounts still competing, in first-seen order.
    pub fn accounts(&self) -> Vec<Address> {
        let mut live: Vec<usize> = self.heads.iter().map(|head| head.account).collect();
        live.sort_unstable();
        live.into_iter().map(|i| self.accounts[i].0).collect()
    }
}
