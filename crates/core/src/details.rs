//! Row details as returned by `getRowDetails`: field diff, stage comments
//! and change history of one workspace record.

use serde::{Deserialize, Serialize};

use crate::stage::{optional_stage_label, StageLabel};
use crate::types::{RecordId, StageId};

/// RPC name for the details call.
pub const GET_ROW_DETAILS: &str = "getRowDetails";

/// Arguments of `getRowDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDetailsRequest {
    pub stage: StageId,
    #[serde(rename = "t3ver_oid")]
    pub live_id: RecordId,
    pub table: String,
    #[serde(rename = "uid")]
    pub version_id: RecordId,
    pub filter_fields: bool,
}

/// One changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffItem {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub label: String,
    /// Rendered diff markup, passed through untouched.
    #[serde(default)]
    pub content: String,
}

/// A comment left when the record changed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageComment {
    #[serde(default)]
    pub user_comment: String,
    #[serde(default)]
    pub previous_stage_title: String,
    #[serde(default)]
    pub stage_title: String,
    #[serde(default)]
    pub tstamp: i64,
    #[serde(default)]
    pub user_username: String,
    #[serde(default)]
    pub user_avatar: String,
}

/// A field difference inside a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDiff {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub html: String,
}

/// History differences are either a field list or a plain message
/// (e.g. "record was created").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryDifferences {
    Fields(Vec<HistoryDiff>),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub differences: HistoryDifferences,
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub user_avatar: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub data: Vec<HistoryEntry>,
}

/// Details of one workspace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDetails {
    #[serde(default)]
    pub diff: Vec<DiffItem>,
    #[serde(default)]
    pub comments: Vec<StageComment>,
    #[serde(default)]
    pub history: History,
    #[serde(rename = "path_Live", default)]
    pub path_live: String,
    #[serde(rename = "label_Stage", default)]
    pub label_stage: String,
    #[serde(default)]
    pub stage_position: u32,
    #[serde(default)]
    pub stage_count: u32,
    #[serde(
        rename = "label_PrevStage",
        default,
        deserialize_with = "optional_stage_label"
    )]
    pub label_prev_stage: Option<StageLabel>,
    #[serde(
        rename = "label_NextStage",
        default,
        deserialize_with = "optional_stage_label"
    )]
    pub label_next_stage: Option<StageLabel>,
}

/// `getRowDetails` result envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowDetailsResult {
    #[serde(default)]
    pub data: Vec<RowDetails>,
}
