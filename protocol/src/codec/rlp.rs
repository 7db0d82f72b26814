//! Recursive Length Prefix encoding.
//!
//! RLP knows two kinds of item: byte strings and lists of items. Integers
//! are big-endian byte strings with no leading zeros, zero being the empty
//! string. The decoder is strict: every non-canonical form (over-long
//! length prefixes, prefixed single bytes, integer leading zeros) is an
//! error, so each value has exactly one accepted encoding and hashes over
//! encodings are stable.
//!
//! All parsing runs on untrusted input. Every length is validated against
//! the remaining buffer before it is used.

use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

/// Prefix of a byte string (short form base).
const STRING_OFFSET: u8 = 0x80;

/// Prefix of a list (short form base).
const LIST_OFFSET: u8 = 0xc0;

/// Payloads shorter than this use the single-byte header form.
const SHORT_PAYLOAD_LIMIT: usize = 56;

/// Encoding of the empty list. Doubles as the explicit "nil" marker for
/// absent optional fields, distinct from the empty string `0x80`.
pub const EMPTY_LIST: u8 = LIST_OFFSET;

/// Low-level RLP failures. Callers usually fold these into a richer
/// domain error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RlpError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("{0} trailing bytes after item")]
    TrailingBytes(usize),

    #[error("non-canonical length prefix")]
    NonCanonicalSize,

    #[error("single byte below 0x80 encoded with a string prefix")]
    NonCanonicalSingleByte,

    #[error("integer has leading zero bytes")]
    LeadingZero,

    #[error("integer wider than {bits} bits")]
    Overflow { bits: u64 },

    #[error("expected a byte string, found a list")]
    ExpectedString,

    #[error("expected a list, found a byte string")]
    ExpectedList,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Builder for an RLP list. Items are appended in order; [`RlpList::finish`]
/// prepends the list header.
///
/// ```
/// use aurora_protocol::codec::rlp::RlpList;
///
/// let encoded = RlpList::new().bytes(b"cat").bytes(b"dog").finish();
/// assert_eq!(encoded, [0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']);
/// ```
#[derive(Debug, Default, Clone)]
pub struct RlpList {
    payload: Vec<u8>,
}

impl RlpList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        encode_bytes(&mut self.payload, bytes);
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        encode_u64(&mut self.payload, value);
        self
    }

    pub fn big(&mut self, value: &BigUint) -> &mut Self {
        encode_biguint(&mut self.payload, value);
        self
    }

    /// Appends the nil marker (an empty list).
    pub fn nil(&mut self) -> &mut Self {
        self.payload.push(EMPTY_LIST);
        self
    }

    /// Appends an item that is already RLP-encoded.
    pub fn raw(&mut self, encoded: &[u8]) -> &mut Self {
        self.payload.extend_from_slice(encoded);
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        encode_header(&mut out, LIST_OFFSET, self.payload.len());
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Appends a byte string.
pub fn encode_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
        out.push(bytes[0]);
    } else {
        encode_header(out, STRING_OFFSET, bytes.len());
        out.extend_from_slice(bytes);
    }
}

/// Appends an unsigned integer in minimal big-endian form.
pub fn encode_u64(out: &mut Vec<u8>, value: u64) {
    let be = value.to_be_bytes();
    encode_bytes(out, trim_leading_zeros(&be));
}

/// Appends a big unsigned integer in minimal big-endian form.
pub fn encode_biguint(out: &mut Vec<u8>, value: &BigUint) {
    // `to_bytes_be` renders zero as [0]; RLP wants the empty string.
    if value.is_zero() {
        encode_bytes(out, &[]);
    } else {
        encode_bytes(out, &value.to_bytes_be());
    }
}

fn encode_header(out: &mut Vec<u8>, offset: u8, len: usize) {
    if len < SHORT_PAYLOAD_LIMIT {
        out.push(offset + len as u8);
    } else {
        let be = (len as u64).to_be_bytes();
        let len_bytes = trim_leading_zeros(&be);
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A decoded item borrowing from the input buffer. `List` carries the raw
/// payload of the list; iterate it with [`Item::as_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    Bytes(&'a [u8]),
    List(&'a [u8]),
}

impl<'a> Item<'a> {
    /// `true` for the empty list, the nil marker.
    pub fn is_nil(&self) -> bool {
        matches!(self, Item::List(payload) if payload.is_empty())
    }

    pub fn as_bytes(&self) -> Result<&'a [u8], RlpError> {
        match *self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(RlpError::ExpectedString),
        }
    }

    pub fn as_list(&self) -> Result<ListIter<'a>, RlpError> {
        match *self {
            Item::List(payload) => Ok(ListIter { rest: payload }),
            Item::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = self.as_integer_bytes()?;
        if bytes.len() > 8 {
            return Err(RlpError::Overflow { bits: 64 });
        }
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Decodes an arbitrary-precision unsigned integer. Width is not
    /// bounded here; callers that need a range check do their own.
    pub fn as_biguint(&self) -> Result<BigUint, RlpError> {
        let bytes = self.as_integer_bytes()?;
        Ok(BigUint::from_bytes_be(bytes))
    }

    fn as_integer_bytes(&self) -> Result<&'a [u8], RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::LeadingZero);
        }
        Ok(bytes)
    }
}

/// Iterator over the items of a list payload. Stops after the first error.
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for ListIter<'a> {
    type Item = Result<Item<'a>, RlpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match decode_item(self.rest) {
            Ok((item, rest)) => {
                self.rest = rest;
                Some(Ok(item))
            }
            Err(e) => {
                self.rest = &[];
                Some(Err(e))
            }
        }
    }
}

/// Decodes one item from the front of `input`, returning it with the
/// unconsumed remainder.
pub fn decode_item(input: &[u8]) -> Result<(Item<'_>, &[u8]), RlpError> {
    let (&prefix, body) = input.split_first().ok_or(RlpError::UnexpectedEnd)?;

    match prefix {
        0x00..=0x7f => Ok((Item::Bytes(&input[..1]), body)),
        0x80..=0xbf => {
            let (payload, rest) = read_payload(prefix - STRING_OFFSET, body)?;
            if payload.len() == 1 && payload[0] < STRING_OFFSET {
                return Err(RlpError::NonCanonicalSingleByte);
            }
            Ok((Item::Bytes(payload), rest))
        }
        0xc0..=0xff => {
            let (payload, rest) = read_payload(prefix - LIST_OFFSET, body)?;
            Ok((Item::List(payload), rest))
        }
    }
}

/// Decodes exactly one item; leftover bytes are an error.
pub fn decode_exact(input: &[u8]) -> Result<Item<'_>, RlpError> {
    let (item, rest) = decode_item(input)?;
    if !rest.is_empty() {
        return Err(RlpError::TrailingBytes(rest.len()));
    }
    Ok(item)
}

/// Splits a payload off `body` given the prefix relative to its kind's
/// offset (0..=63).
fn read_payload(relative: u8, body: &[u8]) -> Result<(&[u8], &[u8]), RlpError> {
    let (len, body) = if relative < 56 {
        (relative as usize, body)
    } else {
        let len_of_len = (relative - 55) as usize;
        if body.len() < len_of_len {
            return Err(RlpError::UnexpectedEnd);
        }
        let (len_bytes, body) = body.split_at(len_of_len);
        if len_bytes[0] == 0 {
            return Err(RlpError::NonCanonicalSize);
        }
        let len = len_bytes
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        if len < SHORT_PAYLOAD_LIMIT as u64 {
            return Err(RlpError::NonCanonicalSize);
        }
        let len = usize::try_from(len).map_err(|_| RlpError::UnexpectedEnd)?;
        (len, body)
    };

    if body.len() < len {
        return Err(RlpError::UnexpectedEnd);
    }
    Ok(body.split_at(len))
}
