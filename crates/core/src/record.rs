//! Workspace records as listed by `getWorkspaceInfos`.
//!
//! Field names on the wire follow the backend grid data service; the Rust
//! side uses descriptive names. Numeric ids are accepted both as JSON
//! numbers and as numeric strings, since the backend emits either.

use serde::{Deserialize, Deserializer, Serialize};

use crate::stage::{StageDirection, StageTransition};
use crate::types::{RecordId, RecordKey, StageId};

/// One versioned entity in the current workspace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    /// Entity type name, e.g. `tt_content`.
    pub table: String,

    /// Uid of the draft (workspace) version.
    #[serde(rename = "uid", deserialize_with = "lenient_id")]
    pub version_id: RecordId,

    /// Uid of the published counterpart.
    #[serde(rename = "t3ver_oid", deserialize_with = "lenient_id")]
    pub live_id: RecordId,

    /// Page the live record sits on.
    #[serde(rename = "livepid", default, deserialize_with = "lenient_opt_id")]
    pub live_pid: Option<RecordId>,

    #[serde(default, deserialize_with = "lenient_stage")]
    pub stage: StageId,

    #[serde(rename = "value_nextStage", default, deserialize_with = "lenient_opt_id")]
    pub next_stage: Option<StageId>,

    #[serde(rename = "value_prevStage", default, deserialize_with = "lenient_opt_id")]
    pub prev_stage: Option<StageId>,

    /// Group key this row belongs to as a member (e.g. a file reference
    /// inside a content element).
    #[serde(
        rename = "Workspaces_CollectionParent",
        default,
        deserialize_with = "non_empty_string"
    )]
    pub collection: Option<String>,

    /// Group key this row heads. Members carry the same value in
    /// [`collection`](Self::collection).
    #[serde(
        rename = "Workspaces_CollectionCurrent",
        default,
        deserialize_with = "non_empty_string"
    )]
    pub collection_current: Option<String>,

    #[serde(rename = "label_Live", default)]
    pub label_live: String,

    #[serde(rename = "label_Workspace", default)]
    pub label_workspace: String,

    #[serde(rename = "label_Stage", default)]
    pub label_stage: String,

    #[serde(rename = "path_Live", default)]
    pub path_live: String,

    #[serde(flatten)]
    pub permissions: RecordPermissions,
}

/// Per-record action permissions computed by the backend.
///
/// Absent flags count as allowed; the backend re-checks on execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPermissions {
    #[serde(rename = "allowedAction_nextStage", default = "allowed")]
    pub next_stage: bool,
    #[serde(rename = "allowedAction_prevStage", default = "allowed")]
    pub prev_stage: bool,
    #[serde(rename = "allowedAction_publish", default = "allowed")]
    pub publish: bool,
    #[serde(rename = "allowedAction_delete", default = "allowed")]
    pub delete: bool,
    #[serde(rename = "allowedAction_view", default = "allowed")]
    pub view: bool,
}

impl Default for RecordPermissions {
    fn default() -> Self {
        Self {
            next_stage: true,
            prev_stage: true,
            publish: true,
            delete: true,
            view: true,
        }
    }
}

fn allowed() -> bool {
    true
}

impl WorkspaceRecord {
    /// Minimal record with no stage neighbours and no collection role.
    pub fn new(table: impl Into<String>, version_id: RecordId, live_id: RecordId) -> Self {
        Self {
            table: table.into(),
            version_id,
            live_id,
            live_pid: None,
            stage: 0,
            next_stage: None,
            prev_stage: None,
            collection: None,
            collection_current: None,
            label_live: String::new(),
            label_workspace: String::new(),
            label_stage: String::new(),
            path_live: String::new(),
            permissions: RecordPermissions::default(),
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.table.clone(), self.version_id, self.live_id)
    }

    /// The stage move available in `direction`, if any.
    ///
    /// A neighbour equal to the current stage counts as absent, as does a
    /// direction the backend has not granted.
    pub fn transition(&self, direction: StageDirection) -> Option<StageTransition> {
        let (neighbour, permitted) = match direction {
            StageDirection::Previous => (self.prev_stage, self.permissions.prev_stage),
            StageDirection::Next => (self.next_stage, self.permissions.next_stage),
        };

        neighbour
            .filter(|target| *target != self.stage && permitted)
            .map(|target_stage| StageTransition {
                direction,
                target_stage,
            })
    }

    /// Every transition currently offered for this record.
    pub fn available_transitions(&self) -> Vec<StageTransition> {
        [StageDirection::Previous, StageDirection::Next]
            .into_iter()
            .filter_map(|d| self.transition(d))
            .collect()
    }
}

/// Listing payload returned by `getWorkspaceInfos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfos {
    #[serde(default)]
    pub data: Vec<WorkspaceRecord>,
    #[serde(default)]
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Lenient wire decoding
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Text(String),
}

fn parse_wire_id<E: serde::de::Error>(id: WireId) -> Result<Option<i64>, E> {
    match id {
        WireId::Int(v) => Ok(Some(v)),
        WireId::Text(s) if s.trim().is_empty() => Ok(None),
        WireId::Text(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a numeric id, got '{s}'"))),
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    parse_wire_id(WireId::deserialize(deserializer)?)?
        .ok_or_else(|| serde::de::Error::custom("expected a numeric id, got an empty string"))
}

fn lenient_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<WireId>::deserialize(deserializer)? {
        Some(id) => parse_wire_id(id),
        None => Ok(None),
    }
}

fn lenient_stage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(lenient_opt_id(deserializer)?.unwrap_or_default())
}

fn non_empty_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}
