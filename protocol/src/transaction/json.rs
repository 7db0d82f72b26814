//! Text form of a transaction: a JSON object with `0x` hex values.
//!
//! ```json
//! {
//!   "nonce": "0x9", "gasPrice": "0x4a817c800", "gas": "0x15f90",
//!   "to": "0xaaaa…", "value": "0x0", "input": "0x", "action": "0x0",
//!   "v": "0x25", "r": "0x…", "s": "0x…", "hash": "0x…"
//! }
//! ```
//!
//! Absent nilable fields are omitted when encoding; on input both `null` and
//! a missing key read as `None`. `hash` is emitted for convenience and
//! ignored when decoding, as are keys this module does not know.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::builder::{Transaction, TxData};
use super::encoding::{DecodeError, Field};
use super::types::Action;
use crate::codec::hexutil::{HexBig, HexBytes, HexU64};
use crate::primitives::{Address, Hash};

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TxJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<HexU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_price: Option<HexBig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas: Option<HexU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<HexBig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<HexBytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<HexU64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vote: Option<HexBytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nickname: Option<HexBytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_info: Option<HexBytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    abi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    v: Option<HexBig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    r: Option<HexBig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    s: Option<HexBig>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    hash: Option<Hash>,
}

impl From<&Transaction> for TxJson {
    fn from(tx: &Transaction) -> Self {
        let d = tx.data();
        Self {
            nonce: Some(HexU64(d.nonce)),
            gas_price: Some(HexBig(d.gas_price.clone())),
            gas: Some(HexU64(d.gas)),
            to: d.to,
            value: Some(HexBig(d.value.clone())),
            input: Some(HexBytes(d.input.clone())),
            action: Some(HexU64(d.action.tag())),
            vote: d.vote.clone().map(HexBytes),
            nickname: d.nickname.clone().map(HexBytes),
            asset: d.asset,
            asset_info: d.asset_info.clone().map(HexBytes),
            sub_address: d.sub_address.clone(),
            abi: d.abi.clone(),
            v: Some(HexBig(d.v.clone())),
            r: Some(HexBig(d.r.clone())),
            s: Some(HexBig(d.s.clone())),
            hash: Some(tx.hash()),
        }
    }
}

fn require<T>(value: Option<T>, field: Field) -> Result<T, DecodeError> {
    value.ok_or(DecodeError::MissingField(field.name()))
}

impl TryFrom<TxJson> for Transaction {
    type Error = DecodeError;

    fn try_from(j: TxJson) -> Result<Self, DecodeError> {
        let data = TxData {
            nonce: require(j.nonce, Field::Nonce)?.0,
            gas_price: require(j.gas_price, Field::GasPrice)?.0,
            gas: require(j.gas, Field::Gas)?.0,
            to: j.to,
            value: require(j.value, Field::Value)?.0,
            input: require(j.input, Field::Input)?.0,
            action: Action::from(require(j.action, Field::Action)?.0),
            vote: j.vote.map(|b| b.0),
            nickname: j.nickname.map(|b| b.0),
            asset: j.asset,
            asset_info: j.asset_info.map(|b| b.0),
            sub_address: j.sub_address,
            abi: j.abi,
            v: require(j.v, Field::V)?.0,
            r: require(j.r, Field::R)?.0,
            s: require(j.s, Field::S)?.0,
        };
        Ok(Transaction::new(data))
    }
}

/// Encodes a transaction to its text form.
pub fn encode_text(tx: &Transaction) -> String {
    // Every value serializes to a JSON string, so this cannot fail.
    serde_json::to_string(&TxJson::from(tx)).unwrap_or_default()
}

/// Decodes a transaction from its text form.
pub fn decode_text(bytes: &[u8]) -> Result<Transaction, DecodeError> {
    let json: TxJson =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    Transaction::try_from(json)
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TxJson::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = TxJson::deserialize(deserializer)?;
        Transaction::try_from(json).map_err(serde::de::Error::custom)
    }
}
