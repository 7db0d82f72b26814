//! # Codec Building Blocks
//!
//! Format-level encoders shared by the transaction codecs:
//!
//! ```text
//! rlp.rs       strict Recursive Length Prefix encoder/decoder (binary form)
//! hexutil.rs   canonical 0x hex quantities and data (text form)
//! ```
//!
//! Field-level rules (which fields exist, which are required) live with the
//! records in [`crate::transaction`].

pub mod hexutil;
pub mod rlp;

pub use hexutil::{HexBig, HexBytes, HexError, HexU64};
pub use rlp::{Item, RlpError, RlpList};
