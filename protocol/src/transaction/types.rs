//! Core type definitions for transactions.
//!
//! [`Action`] is the tag carried on the wire; [`TxKind`] is the typed view
//! that says which of the flat optional fields matter for a given tag.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::primitives::Address;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Discriminant for the operation a transaction represents.
///
/// Tags this build does not know are preserved as [`Action::Other`] so that
/// decoding never depends on the action and unknown kinds re-encode
/// byte-for-byte.
///
/// Equality and hashing go by [`tag`](Action::tag), so `Other(2)` and
/// `Vote` are the same action.
#[derive(Debug, Clone, Copy, Default)]
pub enum Action {
    /// Value transfer, or contract creation when there is no recipient.
    #[default]
    Transfer,
    /// Registers the sender as a delegate under `nickname`.
    RegisterDelegate,
    /// Casts or withdraws delegate votes encoded in `vote`.
    Vote,
    /// Publishes a new asset described by `asset_info`.
    PublishAsset,
    /// Any other tag.
    Other(u64),
}

impl Action {
    pub fn tag(self) -> u64 {
        match self {
            Self::Transfer => 0,
            Self::RegisterDelegate => 1,
            Self::Vote => 2,
            Self::PublishAsset => 3,
            Self::Other(tag) => tag,
        }
    }

    /// The named variant for a known tag, `self` otherwise.
    pub fn canonical(self) -> Self {
        Self::from(self.tag())
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
    }
}

impl From<u64> for Action {
    fn from(tag: u64) -> Self {
        match tag {
            0 => Self::Transfer,
            1 => Self::RegisterDelegate,
            2 => Self::Vote,
            3 => Self::PublishAsset,
            other => Self::Other(other),
        }
    }
}

impl From<Action> for u64 {
    fn from(action: Action) -> Self {
        action.tag()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer => write!(f, "Transfer"),
            Self::RegisterDelegate => write!(f, "RegisterDelegate"),
            Self::Vote => write!(f, "Vote"),
            Self::PublishAsset => write!(f, "PublishAsset"),
            Self::Other(tag) => write!(f, "Other({})", tag),
        }
    }
}

// ---------------------------------------------------------------------------
// TxKind
// ---------------------------------------------------------------------------

/// Typed view of a transaction, borrowing only the fields its action makes
/// meaningful. Produced by [`Transaction::kind`](super::Transaction::kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind<'a> {
    Transfer {
        to: Address,
        asset: Option<Address>,
        sub_address: Option<&'a str>,
    },
    CreateContract {
        code: &'a [u8],
        abi: Option<&'a str>,
    },
    RegisterDelegate {
        nickname: &'a [u8],
    },
    Vote {
        ballot: &'a [u8],
    },
    PublishAsset {
        info: &'a [u8],
    },
    Other(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tags_roundtrip() {
        for tag in 0..10u64 {
            assert_eq!(Action::from(tag).tag(), tag);
        }
        assert_eq!(Action::from(2), Action::Vote);
        assert_eq!(Action::from(77), Action::Other(77));
    }

    #[test]
    fn other_with_known_tag_is_the_named_action() {
        assert_eq!(Action::Other(2), Action::Vote);
        assert_ne!(Action::Other(2), Action::PublishAsset);
        assert!(matches!(Action::Other(3).canonical(), Action::PublishAsset));
        assert!(matches!(Action::Other(40).canonical(), Action::Other(40)));

        let set: std::collections::HashSet<Action> =
            [Action::Other(1), Action::RegisterDelegate].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Transfer.to_string(), "Transfer");
        assert_eq!(Action::Other(9).to_string(), "Other(9)");
    }
}
