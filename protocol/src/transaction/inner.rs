//! Internal value movements produced by contract execution.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::codec::hexutil::HexBig;
use crate::codec::rlp::{self, Item, ListIter, RlpError, RlpList};
use crate::primitives::Address;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InnerTxError {
    #[error("missing required field '{0}' for InnerTx")]
    MissingField(&'static str),

    #[error("malformed inner transaction: {0}")]
    Malformed(String),
}

impl From<RlpError> for InnerTxError {
    fn from(e: RlpError) -> Self {
        InnerTxError::Malformed(e.to_string())
    }
}

/// A transfer performed by a contract on behalf of a transaction.
///
/// `asset_id` is `None` for the native coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerTx {
    pub from: Address,
    pub to: Address,
    pub asset_id: Option<Address>,
    pub value: BigUint,
}

#[derive(Serialize, Deserialize)]
struct InnerTxJson {
    from: Option<Address>,
    to: Option<Address>,
    #[serde(rename = "assetid", skip_serializing_if = "Option::is_none")]
    asset_id: Option<Address>,
    value: Option<HexBig>,
}

impl InnerTx {
    /// Binary form: the positional RLP list `[from, to, assetid | 0xc0, value]`.
    pub fn encode(&self) -> Vec<u8> {
        let mut list = RlpList::new();
        list.bytes(self.from.as_bytes()).bytes(self.to.as_bytes());
        match &self.asset_id {
            Some(asset) => list.bytes(asset.as_bytes()),
            None => list.nil(),
        };
        list.big(&self.value);
        list.finish()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, InnerTxError> {
        let record = rlp::decode_exact(bytes)?;
        let mut items = record.as_list()?;

        let from = address(next_item(&mut items, "from")?)?;
        let to = address(next_item(&mut items, "to")?)?;
        let asset_item = next_item(&mut items, "assetid")?;
        let asset_id = if asset_item.is_nil() {
            None
        } else {
            Some(address(asset_item)?)
        };
        let value = next_item(&mut items, "value")?.as_biguint()?;

        if items.next().is_some() {
            return Err(InnerTxError::Malformed("unexpected extra items".into()));
        }
        Ok(Self {
            from,
            to,
            asset_id,
            value,
        })
    }
}

fn next_item<'a>(items: &mut ListIter<'a>, name: &'static str) -> Result<Item<'a>, InnerTxError> {
    Ok(items.next().ok_or(InnerTxError::MissingField(name))??)
}

fn address(item: Item<'_>) -> Result<Address, InnerTxError> {
    Address::from_slice(item.as_bytes()?).map_err(|e| InnerTxError::Malformed(e.to_string()))
}

impl Serialize for InnerTx {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        InnerTxJson {
            from: Some(self.from),
            to: Some(self.to),
            asset_id: self.asset_id,
            value: Some(HexBig(self.value.clone())),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InnerTx {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let json = InnerTxJson::deserialize(deserializer)?;
        let missing = |name| D::Error::custom(InnerTxError::MissingField(name));
        Ok(Self {
            from: json.from.ok_or_else(|| missing("from"))?,
            to: json.to.ok_or_else(|| missing("to"))?,
            asset_id: json.asset_id,
            value: json.value.ok_or_else(|| missing("value"))?.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InnerTx {
        InnerTx {
            from: Address::new([1; 20]),
            to: Address::new([2; 20]),
            asset_id: Some(Address::new([3; 20])),
            value: BigUint::from(1_000u32),
        }
    }

    #[test]
    fn binary_roundtrip_with_and_without_asset() {
        let with_asset = sample();
        assert_eq!(InnerTx::decode(&with_asset.encode()).unwrap(), with_asset);

        let native = InnerTx {
            asset_id: None,
            ..sample()
        };
        let encoded = native.encode();
        assert_eq!(InnerTx::decode(&encoded).unwrap(), native);
    }

    #[test]
    fn binary_rejects_truncated_record() {
        let short = RlpList::new()
            .bytes(&[1; 20])
            .bytes(&[2; 20])
            .finish();
        assert_eq!(
            InnerTx::decode(&short),
            Err(InnerTxError::MissingField("assetid"))
        );
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["value"], "0x3e8");
        assert_eq!(json["assetid"], format!("0x{}", "03".repeat(20)));

        let native = InnerTx {
            asset_id: None,
            ..sample()
        };
        let json = serde_json::to_value(native).unwrap();
        assert!(json.get("assetid").is_none());
    }

    #[test]
    fn json_missing_required_field() {
        let err = serde_json::from_str::<InnerTx>(
            r#"{"to":"0x0202020202020202020202020202020202020202","value":"0x1"}"#,
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("missing required field 'from' for InnerTx"));

        let err = serde_json::from_str::<InnerTx>(
            r#"{"from":"0x0101010101010101010101010101010101010101","to":"0x0202020202020202020202020202020202020202"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'value'"));
    }
}
