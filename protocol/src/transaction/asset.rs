//! Asset descriptors carried by `PublishAsset` transactions.
//!
//! The descriptor travels as opaque bytes in the transaction's `assetInfo`
//! field: a JSON object with the supply as a hex quantity. Once those bytes
//! are inside a signed transaction they are covered by the signature and
//! cannot change.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::hexutil::HexBig;
use crate::primitives::Address;

#[derive(Debug, Error)]
pub enum AssetInfoError {
    #[error("malformed asset descriptor: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Description of an asset created by a `PublishAsset` transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub issuer: Address,
    pub total_supply: BigUint,
}

#[derive(Serialize, Deserialize)]
struct AssetInfoJson {
    symbol: String,
    name: String,
    desc: String,
    issuer: Address,
    supply: HexBig,
}

impl AssetInfo {
    /// Encodes the descriptor for the transaction's `assetInfo` field.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AssetInfoError> {
        let json = AssetInfoJson {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            desc: self.description.clone(),
            issuer: self.issuer,
            supply: HexBig(self.total_supply.clone()),
        };
        Ok(serde_json::to_vec(&json)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetInfoError> {
        let json: AssetInfoJson = serde_json::from_slice(bytes)?;
        Ok(Self {
            symbol: json.symbol,
            name: json.name,
            description: json.desc,
            issuer: json.issuer,
            total_supply: json.supply.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AssetInfo {
        AssetInfo {
            symbol: "A".into(),
            name: "AOA".into(),
            description: "aa".into(),
            issuer: Address::ZERO,
            total_supply: BigUint::from(1111u32),
        }
    }

    #[test]
    fn descriptor_roundtrip() {
        let info = sample();
        let bytes = info.to_bytes().unwrap();
        assert_eq!(AssetInfo::from_bytes(&bytes).unwrap(), info);
    }

    #[test]
    fn supply_is_hex_on_the_wire() {
        let bytes = sample().to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"supply\":\"0x457\""));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(AssetInfo::from_bytes(b"not json").is_err());
        assert!(AssetInfo::from_bytes(br#"{"symbol":"A"}"#).is_err());
    }
}
