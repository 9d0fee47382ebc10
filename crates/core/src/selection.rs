//! The marked selection used by selection actions.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, RecordKey};

/// Ordered, duplicate-free set of marked record keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedSelection {
    keys: Vec<RecordKey>,
}

impl MarkedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key` unless it is already marked. Returns whether it was added.
    pub fn mark(&mut self, key: RecordKey) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Remove `key`. Returns whether it was present.
    pub fn unmark(&mut self, key: &RecordKey) -> bool {
        match self.keys.iter().position(|k| k == key) {
            Some(index) => {
                self.keys.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn set(&mut self, key: RecordKey, marked: bool) {
        if marked {
            self.mark(key);
        } else {
            self.unmark(&key);
        }
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }

    /// Wire shape for `checkIntegrity` and `executeSelectionAction`.
    pub fn affected_records(&self) -> Vec<AffectedRecord> {
        self.keys.iter().map(AffectedRecord::from).collect()
    }

    /// Wire shape for the specific-stage RPCs.
    pub fn stage_elements(&self) -> Vec<StageElement> {
        self.keys.iter().map(StageElement::from).collect()
    }
}

/// A record reference as the integrity and selection RPCs expect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedRecord {
    pub table: String,
    pub live_id: RecordId,
    pub version_id: RecordId,
}

impl From<&RecordKey> for AffectedRecord {
    fn from(key: &RecordKey) -> Self {
        Self {
            table: key.table.clone(),
            live_id: key.live_id,
            version_id: key.version_id,
        }
    }
}

/// A record reference as the specific-stage RPCs expect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageElement {
    pub table: String,
    pub uid: RecordId,
    pub t3ver_oid: RecordId,
}

impl From<&RecordKey> for StageElement {
    fn from(key: &RecordKey) -> Self {
        Self {
            table: key.table.clone(),
            uid: key.version_id,
            t3ver_oid: key.live_id,
        }
    }
}
