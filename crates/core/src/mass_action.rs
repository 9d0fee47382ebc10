//! Selection and mass action kinds, and the resumable batch protocol used
//! for whole-workspace mass actions.
//!
//! The backend processes a mass action in bounded batches and keeps its own
//! cursor. The client relays the `{total, processed}` pair reported by each
//! round back as the next request until `processed >= total`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// Action name that never needs an integrity check.
pub const ACTION_DISCARD: &str = "discard";
pub const ACTION_PUBLISH: &str = "publish";

/// RPC for selection actions.
pub const EXECUTE_SELECTION_ACTION: &str = "executeSelectionAction";

/// Whole-workspace action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassActionKind {
    Publish,
    Discard,
}

impl MassActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publish => ACTION_PUBLISH,
            Self::Discard => ACTION_DISCARD,
        }
    }

    /// Backend operation that performs one batch of this action.
    pub fn rpc_method(self) -> &'static str {
        match self {
            Self::Publish => "publishWorkspace",
            Self::Discard => "flushWorkspace",
        }
    }

    /// Discarding cannot introduce content conflicts.
    pub fn requires_integrity_check(self) -> bool {
        !matches!(self, Self::Discard)
    }

    /// Decode a chooser value. An empty value means "nothing chosen".
    pub fn parse_choice(value: &str) -> Result<Option<Self>, CoreError> {
        if value.is_empty() {
            Ok(None)
        } else {
            value.parse().map(Some)
        }
    }
}

impl fmt::Display for MassActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MassActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ACTION_PUBLISH => Ok(Self::Publish),
            ACTION_DISCARD => Ok(Self::Discard),
            other => Err(CoreError::InvalidAction(format!(
                "Invalid mass action '{other}' called"
            ))),
        }
    }
}

/// Action applied to the marked selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionActionKind {
    Publish,
    Discard,
}

impl SelectionActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publish => ACTION_PUBLISH,
            Self::Discard => ACTION_DISCARD,
        }
    }

    pub fn requires_integrity_check(self) -> bool {
        !matches!(self, Self::Discard)
    }

    /// Decode a chooser value. An empty value means "nothing chosen".
    pub fn parse_choice(value: &str) -> Result<Option<Self>, CoreError> {
        if value.is_empty() {
            Ok(None)
        } else {
            value.parse().map(Some)
        }
    }
}

impl fmt::Display for SelectionActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ACTION_PUBLISH => Ok(Self::Publish),
            ACTION_DISCARD => Ok(Self::Discard),
            other => Err(CoreError::InvalidAction(format!(
                "Invalid selection action '{other}' called"
            ))),
        }
    }
}

/// Request body and response of one mass-action round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassActionProgress {
    /// Only set on round 0; tells the backend to reset its cursor.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub init: bool,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub processed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Failure reported by the backend for this round. Successful rounds
    /// carry `"error": false`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "reported_error"
    )]
    pub error: Option<String>,
}

impl MassActionProgress {
    /// Round 0 request.
    pub fn init(language: impl Into<String>) -> Self {
        Self {
            init: true,
            total: 0,
            processed: 0,
            language: Some(language.into()),
            error: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

fn reported_error<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reported {
        Message(String),
        Flag(bool),
    }

    Ok(match Option::<Reported>::deserialize(deserializer)? {
        Some(Reported::Message(message)) if !message.is_empty() => Some(message),
        Some(Reported::Flag(true)) => Some("Mass action failed".to_string()),
        _ => None,
    })
}

/// Result of feeding one response into a [`MassActionRun`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// More rounds are needed; send this request next.
    Continue(MassActionProgress),
    /// The backend reports everything processed.
    Complete(MassActionProgress),
}

/// State machine for one mass-action run.
///
/// Start with [`next_request`](Self::next_request), send it, feed the
/// response to [`record_response`](Self::record_response), and repeat with
/// the request carried by [`RoundOutcome::Continue`] until
/// [`RoundOutcome::Complete`] is returned.
#[derive(Debug, Clone)]
pub struct MassActionRun {
    kind: MassActionKind,
    language: String,
    rounds: u32,
    last: Option<MassActionProgress>,
    complete: bool,
}

impl MassActionRun {
    pub fn new(kind: MassActionKind, language: impl Into<String>) -> Self {
        Self {
            kind,
            language: language.into(),
            rounds: 0,
            last: None,
            complete: false,
        }
    }

    pub fn kind(&self) -> MassActionKind {
        self.kind
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Number of responses recorded so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn last_progress(&self) -> Option<&MassActionProgress> {
        self.last.as_ref()
    }

    /// The request for the next round, or `None` once complete.
    pub fn next_request(&self) -> Option<MassActionProgress> {
        if self.complete {
            return None;
        }
        Some(match &self.last {
            None => MassActionProgress::init(self.language.clone()),
            Some(last) => MassActionProgress {
                init: false,
                total: last.total,
                processed: last.processed,
                language: last
                    .language
                    .clone()
                    .or_else(|| Some(self.language.clone())),
                error: None,
            },
        })
    }

    /// Record the response of the round just sent.
    pub fn record_response(&mut self, response: MassActionProgress) -> RoundOutcome {
        self.rounds += 1;
        self.complete = response.is_complete();
        self.last = Some(response.clone());

        if self.complete {
            RoundOutcome::Complete(response)
        } else {
            // `complete` is false, so a request is always available here.
            RoundOutcome::Continue(self.next_request().unwrap_or(response))
        }
    }
}
