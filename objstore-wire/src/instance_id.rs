//! The `«fqn»@«n»` instance identifier shared across the kernel/host boundary

use std::fmt;
use std::sync::Arc;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// An error produced when an instance id string does not have the `fqn@n` shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidInstanceId(pub String);

impl fmt::Display for InvalidInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid instance id: {}", self.0)
    }
}

impl std::error::Error for InvalidInstanceId {}

/// Canonical identifier of a managed object: `«classFQN»@«sequence»`.
///
/// Assigned once at first registration, never mutated, never reused.
#[derive(Clone, Debug, Eq)]
pub struct InstanceId {
    fqn: Arc<str>,
    sequence: u64,
}

impl InstanceId {
    /// Build an instance id directly from its parts.
    pub fn new(fqn: impl Into<Arc<str>>, sequence: u64) -> Self {
        InstanceId { fqn: fqn.into(), sequence }
    }

    /// The class (or `Object`, for anonymous instances) this id was minted for.
    pub fn class_fqn(&self) -> &str {
        &self.fqn
    }

    /// The numeric part of the id, as produced by the instance id sequence.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.fqn, self.sequence)
    }
}

impl PartialEq for InstanceId {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence && self.fqn == other.fqn
    }
}

impl std::hash::Hash for InstanceId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.fqn.hash(state);
        self.sequence.hash(state);
    }
}

impl std::str::FromStr for InstanceId {
    type Err = InvalidInstanceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (fqn, seq) = s.rsplit_once('@').ok_or_else(|| InvalidInstanceId(s.to_string()))?;
        if fqn.is_empty() {
            return Err(InvalidInstanceId(s.to_string()));
        }
        let sequence = seq.parse::<u64>().map_err(|_| InvalidInstanceId(s.to_string()))?;
        Ok(InstanceId { fqn: Arc::from(fqn), sequence })
    }
}

impl Serialize for InstanceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InstanceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_round_trips_through_parse() {
        let id = InstanceId::new("Acme.Widgets.Gadget", 10042);
        let text = id.to_string();
        assert_eq!(text, "Acme.Widgets.Gadget@10042");
        let parsed: InstanceId = text.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_missing_at_sign() {
        assert!("no-at-sign".parse::<InstanceId>().is_err());
    }

    #[test]
    fn rejects_non_numeric_sequence() {
        assert!("Foo@bar".parse::<InstanceId>().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let id = InstanceId::new("Foo", 7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Foo@7\"");
        let back: InstanceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
