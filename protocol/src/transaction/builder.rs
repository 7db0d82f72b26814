//! The transaction record and its builder.
//!
//! A [`Transaction`] wraps the signed fields ([`TxData`]) together with two
//! write-once caches: the transaction hash and the recovered sender. The
//! fields are private and never change after construction; signing produces
//! a new record via [`Transaction::with_signature`].
//!
//! The caches use `OnceCell`, so concurrent readers may race to fill them:
//! exactly one value is stored and every later read returns it.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use once_cell::sync::OnceCell;

use super::asset::{AssetInfo, AssetInfoError};
use super::encoding;
use super::types::{Action, TxKind};
use crate::config::CHAIN_ID_V_OFFSET;
use crate::crypto::hash::keccak256;
use crate::primitives::{Address, Hash, ParseError};

// ---------------------------------------------------------------------------
// TxData
// ---------------------------------------------------------------------------

/// The signed fields of a transaction, in wire order.
///
/// Optional fields are `None` when absent, which is distinct from
/// `Some(empty)` on both wire forms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxData {
    /// Per-sender sequence number.
    pub nonce: u64,
    /// Price paid per unit of gas. Drives block selection priority.
    pub gas_price: BigUint,
    /// Maximum gas the sender authorises.
    pub gas: u64,
    /// Recipient; `None` creates a contract or an asset.
    pub to: Option<Address>,
    pub value: BigUint,
    pub input: Vec<u8>,
    pub action: Action,
    pub vote: Option<Vec<u8>>,
    pub nickname: Option<Vec<u8>>,
    pub asset: Option<Address>,
    pub asset_info: Option<Vec<u8>>,
    pub sub_address: Option<String>,
    pub abi: Option<String>,
    /// Recovery indicator, possibly folded with a chain id.
    pub v: BigUint,
    pub r: BigUint,
    pub s: BigUint,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Recovered sender together with the chain scope it was recovered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CachedSender {
    pub(crate) chain_id: Option<u64>,
    pub(crate) address: Address,
}

/// A ledger transaction.
///
/// Equality compares the signed fields only; whether the caches have been
/// filled is irrelevant.
#[derive(Clone)]
pub struct Transaction {
    data: TxData,
    hash: OnceCell<Hash>,
    sender: OnceCell<CachedSender>,
}

impl Transaction {
    /// Wraps `data`, folding an [`Action::Other`] that carries a known tag
    /// into its named variant.
    pub fn new(mut data: TxData) -> Self {
        data.action = data.action.canonical();
        Self {
            data,
            hash: OnceCell::new(),
            sender: OnceCell::new(),
        }
    }

    /// A plain value transfer to `to`.
    pub fn transfer(
        nonce: u64,
        to: Address,
        value: impl Into<BigUint>,
        gas: u64,
        gas_price: impl Into<BigUint>,
        input: Vec<u8>,
    ) -> Self {
        TransactionBuilder::new(Action::Transfer)
            .nonce(nonce)
            .to(to)
            .value(value)
            .gas(gas)
            .gas_price(gas_price)
            .input(input)
            .build()
    }

    /// A contract creation: no recipient, `code` as input, optional ABI.
    pub fn contract_creation(
        nonce: u64,
        value: impl Into<BigUint>,
        gas: u64,
        gas_price: impl Into<BigUint>,
        code: Vec<u8>,
        abi: Option<String>,
    ) -> Self {
        let mut builder = TransactionBuilder::new(Action::Transfer)
            .nonce(nonce)
            .value(value)
            .gas(gas)
            .gas_price(gas_price)
            .input(code);
        if let Some(abi) = abi {
            builder = builder.abi(abi);
        }
        builder.build()
    }

    /// Returns a copy carrying the given signature values, with empty caches.
    pub fn with_signature(&self, v: BigUint, r: BigUint, s: BigUint) -> Self {
        let mut data = self.data.clone();
        data.v = v;
        data.r = r;
        data.s = s;
        Self::new(data)
    }

    pub fn data(&self) -> &TxData {
        &self.data
    }

    pub fn into_data(self) -> TxData {
        self.data
    }

    pub fn nonce(&self) -> u64 {
        self.data.nonce
    }

    pub fn gas_price(&self) -> &BigUint {
        &self.data.gas_price
    }

    pub fn gas(&self) -> u64 {
        self.data.gas
    }

    pub fn to(&self) -> Option<Address> {
        self.data.to
    }

    pub fn value(&self) -> &BigUint {
        &self.data.value
    }

    pub fn input(&self) -> &[u8] {
        &self.data.input
    }

    pub fn action(&self) -> Action {
        self.data.action
    }

    /// Raw `(v, r, s)`.
    pub fn signature_values(&self) -> (&BigUint, &BigUint, &BigUint) {
        (&self.data.v, &self.data.r, &self.data.s)
    }

    /// `true` once `r` and `s` are set.
    pub fn is_signed(&self) -> bool {
        !self.data.r.is_zero() && !self.data.s.is_zero()
    }

    /// Maximum amount the sender can be charged: `gas * gas_price + value`.
    pub fn cost(&self) -> BigUint {
        BigUint::from(self.data.gas) * &self.data.gas_price + &self.data.value
    }

    /// The chain id folded into `v`, or `None` when `v` does not encode
    /// one (unscoped signatures, and values no `u64` chain id folds to).
    pub fn chain_id(&self) -> Option<u64> {
        let v = self.data.v.to_u128()?;
        let folded = v.checked_sub(u128::from(CHAIN_ID_V_OFFSET))?;
        u64::try_from(folded / 2).ok()
    }

    /// `true` when the signature is bound to a chain id.
    pub fn is_protected(&self) -> bool {
        self.chain_id().is_some()
    }

    /// keccak-256 of the binary encoding. Computed once, then cached.
    pub fn hash(&self) -> Hash {
        *self.hash.get_or_init(|| keccak256(&encoding::encode(self)))
    }

    /// Typed view of the fields this transaction's action uses.
    pub fn kind(&self) -> TxKind<'_> {
        let d = &self.data;
        match d.action {
            Action::Transfer => match d.to {
                Some(to) => TxKind::Transfer {
                    to,
                    asset: d.asset,
                    sub_address: d.sub_address.as_deref(),
                },
                None => TxKind::CreateContract {
                    code: &d.input,
                    abi: d.abi.as_deref(),
                },
            },
            Action::RegisterDelegate => TxKind::RegisterDelegate {
                nickname: d.nickname.as_deref().unwrap_or_default(),
            },
            Action::Vote => TxKind::Vote {
                ballot: d.vote.as_deref().unwrap_or_default(),
            },
            Action::PublishAsset => TxKind::PublishAsset {
                info: d.asset_info.as_deref().unwrap_or_default(),
            },
            Action::Other(tag) => TxKind::Other(tag),
        }
    }

    /// Decodes the asset descriptor of a `PublishAsset` transaction.
    pub fn asset_info(&self) -> Option<Result<AssetInfo, AssetInfoError>> {
        match (self.data.action, &self.data.asset_info) {
            (Action::PublishAsset, Some(bytes)) => Some(AssetInfo::from_bytes(bytes)),
            _ => None,
        }
    }

    pub(crate) fn cached_sender(&self) -> Option<CachedSender> {
        self.sender.get().copied()
    }

    /// Stores the sender unless another thread got there first; returns
    /// whichever value ended up in the cell.
    pub(crate) fn cache_sender(&self, entry: CachedSender) -> CachedSender {
        *self.sender.get_or_init(|| entry)
    }
}

impl From<TxData> for Transaction {
    fn from(data: TxData) -> Self {
        Self::new(data)
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Transaction {}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("nonce", &self.data.nonce)
            .field("gas_price", &self.data.gas_price)
            .field("gas", &self.data.gas)
            .field("to", &self.data.to)
            .field("value", &self.data.value)
            .field("action", &self.data.action)
            .field("input_len", &self.data.input.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// ```
/// use aurora_protocol::primitives::Address;
/// use aurora_protocol::transaction::{Action, TransactionBuilder};
///
/// let tx = TransactionBuilder::new(Action::Transfer)
///     .nonce(7)
///     .to(Address::new([0x11; 20]))
///     .value(1_000u64)
///     .gas(21_000)
///     .gas_price(5u64)
///     .build();
/// assert!(!tx.is_signed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    data: TxData,
}

impl TransactionBuilder {
    pub fn new(action: Action) -> Self {
        Self {
            data: TxData {
                action: action.canonical(),
                ..TxData::default()
            },
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.data.nonce = nonce;
        self
    }

    pub fn gas_price(mut self, price: impl Into<BigUint>) -> Self {
        self.data.gas_price = price.into();
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.data.gas = gas;
        self
    }

    /// Sets `to` and `sub_address` from a recipient string that may carry
    /// a sub-address suffix. See [`Address::parse_with_sub_address`].
    pub fn recipient(mut self, recipient: &str) -> Result<Self, ParseError> {
        let (to, sub_address) = Address::parse_with_sub_address(recipient)?;
        self.data.to = Some(to);
        self.data.sub_address = sub_address;
        Ok(self)
    }

    pub fn to(mut self, to: Address) -> Self {
        self.data.to = Some(to);
        self
    }

    pub fn value(mut self, value: impl Into<BigUint>) -> Self {
        self.data.value = value.into();
        self
    }

    pub fn input(mut self, input: Vec<u8>) -> Self {
        self.data.input = input;
        self
    }

    pub fn vote(mut self, vote: Vec<u8>) -> Self {
        self.data.vote = Some(vote);
        self
    }

    pub fn nickname(mut self, nickname: Vec<u8>) -> Self {
        self.data.nickname = Some(nickname);
        self
    }

    pub fn asset(mut self, asset: Address) -> Self {
        self.data.asset = Some(asset);
        self
    }

    pub fn asset_info(mut self, info: Vec<u8>) -> Self {
        self.data.asset_info = Some(info);
        self
    }

    pub fn sub_address(mut self, sub_address: impl Into<String>) -> Self {
        self.data.sub_address = Some(sub_address.into());
        self
    }

    pub fn abi(mut self, abi: impl Into<String>) -> Self {
        self.data.abi = Some(abi.into());
        self
    }

    pub fn build(self) -> Transaction {
        Transaction::new(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        TransactionBuilder::new(Action::Transfer)
            .nonce(3)
            .to(Address::new([1; 20]))
            .value(10u64)
            .gas(21_000)
            .gas_price(2u64)
            .build()
    }

    #[test]
    fn builder_sets_fields() {
        let tx = sample();
        assert_eq!(tx.nonce(), 3);
        assert_eq!(tx.gas(), 21_000);
        assert_eq!(tx.gas_price(), &BigUint::from(2u8));
        assert_eq!(tx.to(), Some(Address::new([1; 20])));
        assert!(tx.data().vote.is_none());
        assert!(!tx.is_signed());
    }

    #[test]
    fn recipient_splits_sub_address() {
        let tx = TransactionBuilder::new(Action::Transfer)
            .recipient(&format!("AOA{}desk7", "01".repeat(20)))
            .unwrap()
            .build();
        assert_eq!(tx.to(), Some(Address::new([1; 20])));
        assert_eq!(tx.data().sub_address.as_deref(), Some("desk7"));
        assert!(matches!(
            tx.kind(),
            TxKind::Transfer { sub_address: Some("desk7"), .. }
        ));

        assert!(TransactionBuilder::new(Action::Transfer).recipient("AOA12").is_err());
    }

    #[test]
    fn cost_is_gas_times_price_plus_value() {
        assert_eq!(sample().cost(), BigUint::from(42_010u32));
    }

    #[test]
    fn hash_is_cached_and_stable() {
        let tx = sample();
        let h1 = tx.hash();
        let h2 = tx.hash();
        assert_eq!(h1, h2);
        assert_eq!(tx.hash.get(), Some(&h1));
    }

    #[test]
    fn equality_ignores_caches() {
        let a = sample();
        let b = sample();
        let _ = a.hash();
        assert_eq!(a, b);
    }

    #[test]
    fn with_signature_resets_caches() {
        let tx = sample();
        let _ = tx.hash();
        let signed = tx.with_signature(BigUint::from(27u8), BigUint::from(1u8), BigUint::from(1u8));
        assert!(signed.hash.get().is_none());
        assert_ne!(signed.hash(), tx.hash());
    }

    #[test]
    fn chain_id_from_v() {
        let tx = sample();
        let with_v = |v: u64| tx.with_signature(BigUint::from(v), BigUint::from(1u8), BigUint::from(1u8));

        assert_eq!(with_v(0).chain_id(), None);
        assert_eq!(with_v(28).chain_id(), None);
        assert!(!with_v(27).is_protected());
        // 2 * 1 + 35 + parity
        assert_eq!(with_v(37).chain_id(), Some(1));
        assert_eq!(with_v(38).chain_id(), Some(1));
        assert!(with_v(38).is_protected());
        assert_eq!(with_v(2 * 1337 + 36).chain_id(), Some(1337));
    }

    #[test]
    fn is_protected_agrees_with_chain_id() {
        let tx = sample();
        let with_v = |v: BigUint| tx.with_signature(v, BigUint::from(1u8), BigUint::from(1u8));

        for v in 0..=40u64 {
            let signed = with_v(BigUint::from(v));
            assert_eq!(signed.is_protected(), signed.chain_id().is_some(), "v = {v}");
            assert_eq!(signed.is_protected(), v >= 35, "v = {v}");
        }

        let top = with_v(BigUint::from(u64::MAX) * 2u8 + 36u8);
        assert_eq!(top.chain_id(), Some(u64::MAX));
        assert!(top.is_protected());

        let beyond = with_v(BigUint::from(1u8) << 200u32);
        assert_eq!(beyond.chain_id(), None);
        assert!(!beyond.is_protected());
    }

    #[test]
    fn hash_cache_is_shared_across_threads() {
        let tx = sample();
        let expected = keccak256(&encoding::encode(&tx));
        assert!(tx.hash.get().is_none());

        let seen: Vec<Hash> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| tx.hash())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(seen.iter().all(|h| *h == expected));
        assert_eq!(tx.hash.get(), Some(&expected));
    }

    #[test]
    fn kind_views_follow_action() {
        assert!(matches!(sample().kind(), TxKind::Transfer { .. }));

        let create = Transaction::contract_creation(0, 0u8, 100_000, 1u8, vec![0x60, 0x00], Some("[]".into()));
        assert_eq!(
            create.kind(),
            TxKind::CreateContract { code: &[0x60, 0x00], abi: Some("[]") }
        );

        let vote = TransactionBuilder::new(Action::Vote).vote(vec![9, 9]).build();
        assert_eq!(vote.kind(), TxKind::Vote { ballot: &[9, 9] });

        let unknown = TransactionBuilder::new(Action::Other(42)).build();
        assert_eq!(unknown.kind(), TxKind::Other(42));

        let spelled_out = TransactionBuilder::new(Action::Other(2)).vote(vec![9, 9]).build();
        assert!(matches!(spelled_out.action(), Action::Vote));
        assert_eq!(spelled_out.kind(), TxKind::Vote { ballot: &[9, 9] });
    }

    #[test]
    fn asset_info_only_for_publish_asset() {
        let info = AssetInfo {
            symbol: "GLD".into(),
            name: "Gold".into(),
            description: "backed by vibes".into(),
            issuer: Address::new([2; 20]),
            total_supply: BigUint::from(1_000_000u32),
        };
        let tx = TransactionBuilder::new(Action::PublishAsset)
            .asset_info(info.to_bytes().unwrap())
            .build();
        assert_eq!(tx.asset_info().unwrap().unwrap(), info);
        assert!(sample().asset_info().is_none());
    }
}
