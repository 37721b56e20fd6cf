//! serde support.
//!
//! Serializing forces the memo; a rule error is reported through the
//! serializer's custom error. Deserializing yields an already evaluated memo.

use core::fmt::Display;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error, Serialize, Serializer};

use crate::{Memo, SyncMemo};

impl<A, E> Serialize for Memo<A, E>
where
    A: Serialize,
    E: Display,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.try_get().map_err(S::Error::custom)?;
        A::serialize(&value, serializer)
    }
}

impl<'de, A, E> Deserialize<'de> for Memo<A, E>
where
    A: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        A::deserialize(deserializer).map(Self::evaluated)
    }
}

impl<A, E> Serialize for SyncMemo<A, E>
where
    A: Serialize,
    E: Display,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.try_with(|value| A::serialize(value, serializer))
            .map_err(S::Error::custom)?
    }
}

impl<'de, A, E> Deserialize<'de> for SyncMemo<A, E>
where
    A: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        A::deserialize(deserializer).map(Self::evaluated)
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_forces_memo() {
        let memo = Memo::new(|| vec![1u8, 2, 3]);
        assert_eq!(serde_json::to_string(&memo).unwrap(), "[1,2,3]");
        assert!(memo.is_evaluated());
    }

    #[test]
    fn test_serialize_reports_rule_error() {
        let memo: SyncMemo<u8, String> = SyncMemo::try_new(|| Err("backend offline".to_owned()));
        let err = serde_json::to_string(&memo).unwrap_err();
        assert!(err.to_string().contains("backend offline"));
        assert!(!memo.is_evaluated());
    }

    #[test]
    fn test_deserialize_is_evaluated() {
        let memo: Memo<String> = serde_json::from_str("\"cached\"").unwrap();
        assert!(memo.is_evaluated());
        assert_eq!(memo.value(), "cached");

        let memo: SyncMemo<Vec<i32>> = serde_json::from_str("[4,5]").unwrap();
        assert!(memo.is_evaluated());
        assert_eq!(memo.value(), vec![4, 5]);
    }
}
