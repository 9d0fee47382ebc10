//! Stage transitions between adjacent workflow stages.
//!
//! The workflow's stage sequence is opaque to the client: a record only
//! knows whether it has a previous and/or next neighbour.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::StageId;

/// Direction of a single-record stage move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageDirection {
    Previous,
    Next,
}

impl StageDirection {
    /// RPC that renders the form required for this move.
    pub fn window_action(self) -> &'static str {
        match self {
            Self::Previous => "sendToPrevStageWindow",
            Self::Next => "sendToNextStageWindow",
        }
    }

    /// RPC that performs this move.
    pub fn execute_action(self) -> &'static str {
        match self {
            Self::Previous => "sendToPrevStageExecute",
            Self::Next => "sendToNextStageExecute",
        }
    }
}

impl fmt::Display for StageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Previous => "prev",
            Self::Next => "next",
        })
    }
}

impl FromStr for StageDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" | "previous" => Ok(Self::Previous),
            "next" => Ok(Self::Next),
            other => Err(CoreError::InvalidTransition(format!(
                "Invalid direction '{other}'. Must be one of: prev, next"
            ))),
        }
    }
}

/// A directed edge from a record's current stage to an adjacent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub direction: StageDirection,
    pub target_stage: StageId,
}

/// RPCs for moving a whole selection to an arbitrary stage.
pub const SPECIFIC_STAGE_WINDOW_ACTION: &str = "sendToSpecificStageWindow";
pub const SPECIFIC_STAGE_EXECUTE_ACTION: &str = "sendToSpecificStageExecute";

/// Label of an adjacent stage as reported by `getRowDetails`.
///
/// The backend sends `false` when there is no such stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLabel {
    pub title: String,
}

/// Decode `false` (or null) as `None`, an object as `Some(StageLabel)`.
pub fn optional_stage_label<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<StageLabel>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Flag(bool),
        Label(StageLabel),
    }

    match Option::<Wire>::deserialize(deserializer)? {
        None | Some(Wire::Flag(_)) => Ok(None),
        Some(Wire::Label(label)) => Ok(Some(label)),
    }
}
