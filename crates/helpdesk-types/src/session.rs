//! Session identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest accepted session key, in bytes.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Opaque key identifying one conversation session.
///
/// The key is issued by whatever sits in front of the controller (a cookie,
/// a CLI flag) and is only ever compared for equality. Keys are limited to
/// printable ASCII without whitespace so they survive cookies and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh, time-sortable session key.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("session id must not be empty".to_string());
        }
        if s.len() > MAX_SESSION_ID_LEN {
            return Err(format!(
                "session id exceeds {MAX_SESSION_ID_LEN} bytes"
            ));
        }
        if !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(format!("invalid session id: '{s}'"));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for SessionId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_valid() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().parse::<SessionId>().unwrap(), a);
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!("".parse::<SessionId>().is_err());
        assert!("has space".parse::<SessionId>().is_err());
        assert!("tab\there".parse::<SessionId>().is_err());
    }

    #[test]
    fn rejects_overlong_keys() {
        let long = "a".repeat(MAX_SESSION_ID_LEN + 1);
        assert!(long.parse::<SessionId>().is_err());
        let max = "a".repeat(MAX_SESSION_ID_LEN);
        assert!(max.parse::<SessionId>().is_ok());
    }

    #[test]
    fn serde_uses_plain_string() {
        let id: SessionId = "S1".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"S1\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<SessionId>("\"\"").is_err());
    }
}
