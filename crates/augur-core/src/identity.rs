// crates/augur-core/src/identity.rs

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AugurError;

/// Identifier of an isolated prediction topic. Stakes, rosters, coefficients
/// and scores are always scoped to one topic.
pub type TopicId = u64;

/// Block height at which a round is scored.
pub type BlockHeight = i64;

/// Number of bytes in an account identifier.
pub const ADDRESS_LEN: usize = 20;

/// Identity of a worker or reputer on the network.
///
/// Wraps a 20-byte account identifier. The canonical text form is `0x`
/// followed by 40 lowercase hex digits; parsing also accepts the bare hex
/// form and uppercase digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Wrap raw account bytes.
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw account bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Parse an address, mapping every failure to `AugurError::Identity`.
    pub fn parse(s: &str) -> Result<Self, AugurError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AugurError::Identity(format!(
                "address '{}' must have {} hex digits, found {}",
                s,
                ADDRESS_LEN * 2,
                digits.len()
            )));
        }
        let decoded = hex::decode(digits)
            .map_err(|e| AugurError::Identity(format!("address '{}' is not hex: {}", s, e)))?;
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl FromStr for Address {
    type Err = AugurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AugurError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// The canonical set of workers registered for a topic at round time.
///
/// Owned by the surrounding registry; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRoster {
    workers: BTreeSet<Address>,
}

impl WorkerRoster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `worker` is registered.
    pub fn contains(&self, worker: &Address) -> bool {
        self.workers.contains(worker)
    }

    /// Number of registered workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether no worker is registered.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Registered workers in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.workers.iter()
    }
}

impl FromIterator<Address> for WorkerRoster {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            workers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_roundtrip() {
        let addr = Address::new([0xab; ADDRESS_LEN]);
        let text = addr.to_string();
        assert_eq!(text, format!("0x{}", "ab".repeat(20)));
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_accepts_bare_and_uppercase_hex() {
        let bare = "AB".repeat(20);
        assert_eq!(Address::parse(&bare).unwrap(), Address::new([0xab; 20]));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = Address::parse("0x1234").unwrap_err();
        assert!(matches!(err, AugurError::Identity(_)));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let err = Address::parse(&"zz".repeat(20)).unwrap_err();
        assert!(matches!(err, AugurError::Identity(_)));
    }

    #[test]
    fn serde_uses_text_form() {
        let addr = Address::new([1u8; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"bob\"").is_err());
    }

    #[test]
    fn roster_deduplicates_and_orders() {
        let w1 = Address::new([2u8; 20]);
        let w2 = Address::new([1u8; 20]);
        let roster: WorkerRoster = vec![w1, w2, w1].into_iter().collect();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.iter().copied().collect::<Vec<_>>(), vec![w2, w1]);
        assert!(roster.contains(&w1));
    }
}
