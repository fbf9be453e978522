//! Session memory types.
//!
//! Memory is a per-session key/value table with last-write-wins upserts.
//! Overwritten values are not recoverable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// A stored memory value with its last write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub session_id: SessionId,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Memory writes attributable to one exchange, keyed by memory key.
///
/// A later write to the same key within one exchange replaces the earlier
/// value, matching the store's own upsert semantics.
pub type MemoryDelta = BTreeMap<String, String>;
