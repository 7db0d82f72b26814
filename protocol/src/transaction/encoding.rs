//! Binary form of a transaction.
//!
//! The record is an RLP list of field entries in fixed order. Each entry is
//! itself a two-item list `[tag, value]`, the tag being the field's position
//! in [`Field::ALL`]. Carrying the tag lets the decoder tell which field is
//! absent, so a missing required field is reported by name.
//!
//! Nilable fields are always written; absence is the empty list `0xc0`,
//! never the empty string `0x80`, so `None` and `Some(vec![])` stay distinct.
//!
//! ```text
//! [ [0, nonce], [1, gasPrice], [2, gas], [3, to | 0xc0], ... , [15, s] ]
//! ```

use num_bigint::BigUint;
use thiserror::Error;

use super::builder::{Transaction, TxData};
use super::types::Action;
use crate::codec::rlp::{self, Item, RlpError, RlpList};
use crate::primitives::Address;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing required field '{0}' for txdata")]
    MissingField(&'static str),

    #[error("malformed transaction: {0}")]
    Malformed(String),
}

impl From<RlpError> for DecodeError {
    fn from(e: RlpError) -> Self {
        DecodeError::Malformed(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Field table
// ---------------------------------------------------------------------------

/// Transaction fields in wire order. The discriminant is the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Nonce,
    GasPrice,
    Gas,
    To,
    Value,
    Input,
    Action,
    Vote,
    Nickname,
    Asset,
    AssetInfo,
    SubAddress,
    Abi,
    V,
    R,
    S,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Nonce,
        Field::GasPrice,
        Field::Gas,
        Field::To,
        Field::Value,
        Field::Input,
        Field::Action,
        Field::Vote,
        Field::Nickname,
        Field::Asset,
        Field::AssetInfo,
        Field::SubAddress,
        Field::Abi,
        Field::V,
        Field::R,
        Field::S,
    ];

    pub fn tag(self) -> u64 {
        self as u64
    }

    /// Name used in error messages and as the text-form key.
    pub fn name(self) -> &'static str {
        match self {
            Field::Nonce => "nonce",
            Field::GasPrice => "gasPrice",
            Field::Gas => "gas",
            Field::To => "to",
            Field::Value => "value",
            Field::Input => "input",
            Field::Action => "action",
            Field::Vote => "vote",
            Field::Nickname => "nickname",
            Field::Asset => "asset",
            Field::AssetInfo => "assetInfo",
            Field::SubAddress => "subAddress",
            Field::Abi => "abi",
            Field::V => "v",
            Field::R => "r",
            Field::S => "s",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(
            self,
            Field::To
                | Field::Vote
                | Field::Nickname
                | Field::Asset
                | Field::AssetInfo
                | Field::SubAddress
                | Field::Abi
        )
    }

    /// `v`, `r` and `s` are not covered by the signing digest.
    pub fn is_signature(self) -> bool {
        matches!(self, Field::V | Field::R | Field::S)
    }
}

/// Appends the value of `field` (without a tag) to `list`.
pub(crate) fn push_value(list: &mut RlpList, data: &TxData, field: Field) {
    fn opt<'l>(list: &'l mut RlpList, value: Option<&[u8]>) -> &'l mut RlpList {
        match value {
            Some(bytes) => list.bytes(bytes),
            None => list.nil(),
        }
    }

    fn addr(address: &Option<Address>) -> Option<&[u8]> {
        address.as_ref().map(|a| &a.as_bytes()[..])
    }

    match field {
        Field::Nonce => list.u64(data.nonce),
        Field::GasPrice => list.big(&data.gas_price),
        Field::Gas => list.u64(data.gas),
        Field::To => opt(list, addr(&data.to)),
        Field::Value => list.big(&data.value),
        Field::Input => list.bytes(&data.input),
        Field::Action => list.u64(data.action.tag()),
        Field::Vote => opt(list, data.vote.as_deref()),
        Field::Nickname => opt(list, data.nickname.as_deref()),
        Field::Asset => opt(list, addr(&data.asset)),
        Field::AssetInfo => opt(list, data.asset_info.as_deref()),
        Field::SubAddress => opt(list, data.sub_address.as_deref().map(str::as_bytes)),
        Field::Abi => opt(list, data.abi.as_deref().map(str::as_bytes)),
        Field::V => list.big(&data.v),
        Field::R => list.big(&data.r),
        Field::S => list.big(&data.s),
    };
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes a transaction to its binary form. Never fails.
pub fn encode(tx: &Transaction) -> Vec<u8> {
    encode_fields(tx.data(), |_| true)
}

fn encode_fields(data: &TxData, keep: impl Fn(Field) -> bool) -> Vec<u8> {
    let mut outer = RlpList::new();
    for field in Field::ALL.into_iter().filter(|f| keep(*f)) {
        let mut entry = RlpList::new();
        entry.u64(field.tag());
        push_value(&mut entry, data, field);
        outer.raw(&entry.finish());
    }
    outer.finish()
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a transaction from its binary form.
///
/// The whole input must be consumed. Decoding does not look at `action`;
/// every field present is read regardless of the transaction's kind.
pub fn decode(bytes: &[u8]) -> Result<Transaction, DecodeError> {
    let mut entries = Entries::parse(bytes)?;

    let data = TxData {
        nonce: entries.required(Field::Nonce)?.as_u64()?,
        gas_price: big(entries.required(Field::GasPrice)?)?,
        gas: entries.required(Field::Gas)?.as_u64()?,
        to: entries.nilable(Field::To).map(address).transpose()?,
        value: big(entries.required(Field::Value)?)?,
        input: entries.required(Field::Input)?.as_bytes()?.to_vec(),
        action: Action::from(entries.required(Field::Action)?.as_u64()?),
        vote: entries.nilable(Field::Vote).map(bytes_of).transpose()?,
        nickname: entries.nilable(Field::Nickname).map(bytes_of).transpose()?,
        asset: entries.nilable(Field::Asset).map(address).transpose()?,
        asset_info: entries.nilable(Field::AssetInfo).map(bytes_of).transpose()?,
        sub_address: entries.nilable(Field::SubAddress).map(string).transpose()?,
        abi: entries.nilable(Field::Abi).map(string).transpose()?,
        v: big(entries.required(Field::V)?)?,
        r: big(entries.required(Field::R)?)?,
        s: big(entries.required(Field::S)?)?,
    };

    Ok(Transaction::new(data))
}

/// The tagged entries of a record, validated to have strictly increasing
/// known tags, consumed front to back.
struct Entries<'a> {
    items: Vec<(u64, Item<'a>)>,
    pos: usize,
}

impl<'a> Entries<'a> {
    fn parse(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let record = rlp::decode_exact(bytes)?;
        let mut items = Vec::with_capacity(Field::ALL.len());
        let mut last: Option<u64> = None;

        for entry in record.as_list()? {
            let mut parts = entry?.as_list()?;
            let tag = parts
                .next()
                .ok_or_else(|| malformed("empty field entry"))??
                .as_u64()?;
            let value = parts
                .next()
                .ok_or_else(|| malformed(format!("field entry {} without a value", tag)))??;
            if parts.next().is_some() {
                return Err(malformed(format!("field entry {} has extra items", tag)));
            }

            if tag >= Field::ALL.len() as u64 {
                return Err(malformed(format!("unknown field tag {}", tag)));
            }
            if last.is_some_and(|prev| tag <= prev) {
                return Err(malformed(format!("field tag {} out of order", tag)));
            }
            last = Some(tag);
            items.push((tag, value));
        }

        Ok(Self { items, pos: 0 })
    }

    fn take(&mut self, field: Field) -> Option<Item<'a>> {
        match self.items.get(self.pos) {
            Some((tag, item)) if *tag == field.tag() => {
                self.pos += 1;
                Some(*item)
            }
            _ => None,
        }
    }

    fn required(&mut self, field: Field) -> Result<Item<'a>, DecodeError> {
        self.take(field).ok_or(DecodeError::MissingField(field.name()))
    }

    /// Absent entries and the nil marker both read as `None`.
    fn nilable(&mut self, field: Field) -> Option<Item<'a>> {
        self.take(field).filter(|item| !item.is_nil())
    }
}

fn malformed(msg: impl Into<String>) -> DecodeError {
    DecodeError::Malformed(msg.into())
}

fn big(item: Item<'_>) -> Result<BigUint, DecodeError> {
    Ok(item.as_biguint()?)
}

fn bytes_of(item: Item<'_>) -> Result<Vec<u8>, DecodeError> {
    Ok(item.as_bytes()?.to_vec())
}

fn address(item: Item<'_>) -> Result<Address, DecodeError> {
    Address::from_slice(item.as_bytes()?).map_err(|e| malformed(e.to_string()))
}

fn string(item: Item<'_>) -> Result<String, DecodeError> {
    String::from_utf8(item.as_bytes()?.to_vec()).map_err(|_| malformed("field is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionBuilder;

    fn full() -> Transaction {
        TransactionBuilder::new(Action::PublishAsset)
            .nonce(9)
            .gas_price(20_000_000_000u64)
            .gas(90_000)
            .to(Address::new([0xaa; 20]))
            .value(BigUint::from(10u8).pow(18))
            .input(vec![1, 2, 3])
            .vote(vec![0xff])
            .nickname(b"alice".to_vec())
            .asset(Address::new([0xbb; 20]))
            .asset_info(b"{}".to_vec())
            .sub_address("savings")
            .abi("[{\"type\":\"function\"}]")
            .build()
            .with_signature(BigUint::from(37u8), BigUint::from(7u8), BigUint::from(8u8))
    }

    fn minimal() -> Transaction {
        TransactionBuilder::new(Action::Transfer).build()
    }

    #[test]
    fn roundtrip_full_and_minimal() {
        for tx in [full(), minimal()] {
            let decoded = decode(&encode(&tx)).unwrap();
            assert_eq!(decoded, tx);
        }
    }

    #[test]
    fn minimal_record_layout() {
        let encoded = encode(&minimal());
        let record = rlp::decode_exact(&encoded).unwrap();
        let entries: Vec<Item<'_>> = record.as_list().unwrap().map(Result::unwrap).collect();
        assert_eq!(entries.len(), 16);
        // [3, nil] for the absent recipient.
        assert_eq!(
            rlp::decode_exact(&[0xc2, 0x03, 0xc0]).unwrap(),
            entries[3]
        );
    }

    #[test]
    fn none_and_empty_are_distinct() {
        let none = minimal();
        let empty = TransactionBuilder::new(Action::Transfer)
            .vote(Vec::new())
            .sub_address("")
            .build();

        assert_ne!(encode(&none), encode(&empty));
        assert_eq!(decode(&encode(&none)).unwrap().data().vote, None);
        let back = decode(&encode(&empty)).unwrap();
        assert_eq!(back.data().vote, Some(Vec::new()));
        assert_eq!(back.data().sub_address.as_deref(), Some(""));
    }

    #[test]
    fn missing_required_field_is_named() {
        let tx = full();
        for field in Field::ALL.into_iter().filter(|f| f.is_required()) {
            let blob = encode_fields(tx.data(), |f| f != field);
            assert_eq!(
                decode(&blob),
                Err(DecodeError::MissingField(field.name())),
                "dropping {}",
                field.name()
            );
        }
    }

    #[test]
    fn missing_nilable_field_defaults_to_none() {
        let tx = full();
        for field in Field::ALL.into_iter().filter(|f| !f.is_required()) {
            let blob = encode_fields(tx.data(), |f| f != field);
            assert!(decode(&blob).is_ok(), "dropping {}", field.name());
        }
        let blob = encode_fields(tx.data(), |f| f != Field::To);
        assert_eq!(decode(&blob).unwrap().to(), None);
    }

    #[test]
    fn error_message_names_field() {
        let blob = encode_fields(full().data(), |f| f != Field::GasPrice);
        let err = decode(&blob).unwrap_err();
        assert_eq!(err.to_string(), "missing required field 'gasPrice' for txdata");
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut blob = encode(&full());
        blob.push(0x00);
        assert!(matches!(decode(&blob), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn out_of_order_entries_are_malformed() {
        let entry = |tag: u64, value: u64| RlpList::new().u64(tag).u64(value).finish();
        let blob = RlpList::new()
            .raw(&entry(1, 5))
            .raw(&entry(0, 1))
            .finish();
        assert!(matches!(decode(&blob), Err(DecodeError::Malformed(_))));

        let duplicate = RlpList::new()
            .raw(&entry(0, 1))
            .raw(&entry(0, 2))
            .finish();
        assert!(matches!(decode(&duplicate), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn unknown_tag_is_malformed() {
        let mut outer = RlpList::new();
        for field in Field::ALL {
            let mut entry = RlpList::new();
            entry.u64(field.tag());
            push_value(&mut entry, minimal().data(), field);
            outer.raw(&entry.finish());
        }
        outer.raw(&RlpList::new().u64(16).u64(0).finish());
        assert!(matches!(decode(&outer.finish()), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn wrong_item_kind_is_malformed() {
        // nonce given as a list
        let blob = RlpList::new()
            .raw(&RlpList::new().u64(0).raw(&[0xc1, 0x01]).finish())
            .finish();
        assert!(matches!(decode(&blob), Err(DecodeError::Malformed(_))));

        // whole record is a string
        assert!(matches!(decode(&[0x83, 1, 2, 3]), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn bad_address_length_is_malformed() {
        let mut outer = RlpList::new();
        for field in Field::ALL {
            let mut entry = RlpList::new();
            entry.u64(field.tag());
            if field == Field::To {
                entry.bytes(&[0x11; 19]);
            } else {
                push_value(&mut entry, minimal().data(), field);
            }
            outer.raw(&entry.finish());
        }
        assert!(matches!(decode(&outer.finish()), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn oversized_nonce_is_malformed() {
        let mut outer = RlpList::new();
        for field in Field::ALL {
            let mut entry = RlpList::new();
            entry.u64(field.tag());
            if field == Field::Nonce {
                entry.bytes(&[0x01; 9]);
            } else {
                push_value(&mut entry, minimal().data(), field);
            }
            outer.raw(&entry.finish());
        }
        assert!(matches!(decode(&outer.finish()), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn wide_price_and_value_roundtrip() {
        let wide = BigUint::from(1u8) << 300u32;
        let tx = TransactionBuilder::new(Action::Transfer)
            .gas_price(wide.clone() + 1u8)
            .value(wide.clone())
            .build();
        let decoded = decode(&encode(&tx)).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.value(), &wide);
    }

    #[test]
    fn known_tag_built_as_other_roundtrips() {
        let tx = TransactionBuilder::new(Action::Other(2)).vote(vec![1]).build();
        let decoded = decode(&encode(&tx)).unwrap();
        assert_eq!(decoded.action(), Action::Vote);
        assert_eq!(decoded, tx);
        assert_eq!(decoded.hash(), tx.hash());
    }

    #[test]
    fn unknown_action_roundtrips() {
        let tx = TransactionBuilder::new(Action::Other(99)).nonce(1).build();
        let decoded = decode(&encode(&tx)).unwrap();
        assert_eq!(decoded.action(), Action::Other(99));
        assert_eq!(encode(&decoded), encode(&tx));
    }
}
