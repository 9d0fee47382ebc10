//! Integrity check scopes and verdicts.
//!
//! Before publishing, the backend is asked whether applying an action would
//! leave live and draft content in conflict. A `warning` verdict is a
//! decision point for the user, not an error.

use serde::{Deserialize, Serialize};

use crate::selection::AffectedRecord;

/// Type tag for selection-scoped checks.
pub const SCOPE_SELECTION: &str = "selection";

/// Verdict value signalling integrity issues.
pub const RESULT_WARNING: &str = "warning";

/// What an integrity check covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityScope {
    /// An explicit list of records.
    Selection(Vec<AffectedRecord>),
    /// The whole workspace, filtered by language, for a mass action kind.
    Workspace { language: String, kind: String },
}

impl IntegrityScope {
    /// Argument object for `checkIntegrity`.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            Self::Selection(records) => serde_json::json!({
                "selection": records,
                "type": SCOPE_SELECTION,
            }),
            Self::Workspace { language, kind } => serde_json::json!({
                "language": language,
                "type": kind,
            }),
        }
    }
}

/// Outcome of an integrity check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Ok,
    /// Issues were found; carries whatever detail the backend reported.
    Warning(serde_json::Value),
}

impl Verdict {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

/// Raw `checkIntegrity` result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntegrityResult {
    pub result: String,
    #[serde(flatten)]
    pub detail: serde_json::Map<String, serde_json::Value>,
}

impl From<IntegrityResult> for Verdict {
    fn from(raw: IntegrityResult) -> Self {
        if raw.result == RESULT_WARNING {
            Verdict::Warning(serde_json::Value::Object(raw.detail))
        } else {
            Verdict::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selection_scope_payload() {
        let scope = IntegrityScope::Selection(vec![AffectedRecord {
            table: "pages".into(),
            live_id: 1,
            version_id: 2,
        }]);
        assert_eq!(
            scope.to_payload(),
            json!({
                "selection": [{"table": "pages", "liveId": 1, "versionId": 2}],
                "type": "selection",
            })
        );
    }

    #[test]
    fn workspace_scope_payload_uses_action_kind_as_type() {
        let scope = IntegrityScope::Workspace {
            language: "all".into(),
            kind: "publish".into(),
        };
        assert_eq!(scope.to_payload(), json!({"language": "all", "type": "publish"}));
    }

    #[test]
    fn warning_keeps_detail() {
        let raw: IntegrityResult =
            serde_json::from_value(json!({"result": "warning", "issues": ["x"]})).unwrap();
        let verdict = Verdict::from(raw);
        assert!(verdict.is_warning());
        assert_eq!(verdict, Verdict::Warning(json!({"issues": ["x"]})));
    }

    #[test]
    fn anything_but_warning_is_ok() {
        let raw: IntegrityResult = serde_json::from_value(json!({"result": "ok"})).unwrap();
        assert_eq!(Verdict::from(raw), Verdict::Ok);
    }
}
