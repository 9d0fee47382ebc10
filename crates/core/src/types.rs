use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Record uids on the backend are unsigned integers, transported as i64.
pub type RecordId = i64;

/// Stage identifiers are opaque integers assigned by the backend workflow.
pub type StageId = i64;

/// Composite identity of one workspace row: `table:versionId:liveId`.
///
/// The only identity a row has on the client; it is stable for one render
/// cycle and is what the marked selection stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub table: String,
    pub version_id: RecordId,
    pub live_id: RecordId,
}

impl RecordKey {
    pub fn new(table: impl Into<String>, version_id: RecordId, live_id: RecordId) -> Self {
        Self {
            table: table.into(),
            version_id,
            live_id,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.table, self.version_id, self.live_id)
    }
}

impl FromStr for RecordKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let live = parts.next();
        let version = parts.next();
        let table = parts.next();

        let (Some(table), Some(version), Some(live)) = (table, version, live) else {
            return Err(CoreError::Validation(format!(
                "Invalid record key '{s}'. Expected table:versionId:liveId"
            )));
        };
        if table.is_empty() {
            return Err(CoreError::Validation(format!(
                "Invalid record key '{s}'. Table name must not be empty"
            )));
        }

        let parse_id = |raw: &str| {
            raw.parse::<RecordId>().map_err(|_| {
                CoreError::Validation(format!(
                    "Invalid record key '{s}'. '{raw}' is not a record id"
                ))
            })
        };

        Ok(Self::new(table, parse_id(version)?, parse_id(live)?))
    }
}
