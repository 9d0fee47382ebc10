//! Presentation models handed to the host: confirmation dialogs, the row
//! details view and preview links.
//!
//! Texts are label keys; translating them is the host's job.

use serde::Serialize;

use workspaces_core::details::{
    DiffItem, HistoryDiff, HistoryDifferences, RowDetails, StageComment,
};
use workspaces_core::mass_action::{MassActionKind, SelectionActionKind};
use workspaces_core::record::WorkspaceRecord;
use workspaces_core::stage::StageDirection;

// ---------------------------------------------------------------------------
// Label keys
// ---------------------------------------------------------------------------

pub const LABEL_RECORD_INFORMATION: &str = "window.recordInformation";
pub const LABEL_TAB_CHANGES: &str = "window.recordChanges.tabs.changeSummary";
pub const LABEL_TAB_COMMENTS: &str = "window.recordChanges.tabs.comments";
pub const LABEL_TAB_HISTORY: &str = "window.recordChanges.tabs.history";
pub const LABEL_PATH: &str = "path";
pub const LABEL_CURRENT_STEP: &str = "current_step";
pub const LABEL_CLOSE: &str = "close";
pub const LABEL_OK: &str = "ok";
pub const LABEL_CANCEL: &str = "cancel";

pub const LABEL_INTEGRITY_TITLE: &str = "window.integrity_warning.title";
pub const LABEL_INTEGRITY_DESCRIPTION: &str = "integrity.hasIssuesDescription";
pub const LABEL_INTEGRITY_QUESTION: &str = "integrity.hasIssuesQuestion";
pub const LABEL_PUBLISH_TITLE: &str = "window.publish.title";
pub const LABEL_PUBLISH_MESSAGE: &str = "window.publish.message";
pub const LABEL_DO_PUBLISH: &str = "label_doaction_publish";
pub const LABEL_DISCARD_TITLE: &str = "window.discard.title";
pub const LABEL_DISCARD_MESSAGE: &str = "window.discard.message";
pub const LABEL_SELECTION_TITLE: &str = "window.selectionAction.title";
pub const LABEL_MASS_TITLE: &str = "window.massAction.title";
pub const LABEL_AFFECTS_WORKSPACE: &str = "tooltip.affectWholeWorkspace";

// ---------------------------------------------------------------------------
// Confirmation dialogs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// What a confirmation dialog is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    IntegrityWarning,
    PublishRecord,
    DiscardRecord,
    SelectionAction,
    MassAction,
}

/// A yes/no decision put to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmDialog {
    pub kind: DialogKind,
    pub title: String,
    /// Paragraphs of the dialog body, as label keys.
    pub messages: Vec<String>,
    pub severity: Severity,
    /// Label key of the button that confirms.
    pub confirm_label: String,
    /// Backend-provided detail (integrity issues), if any.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
}

impl ConfirmDialog {
    fn new(
        kind: DialogKind,
        title: &str,
        messages: Vec<String>,
        severity: Severity,
        confirm_label: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            messages,
            severity,
            confirm_label: confirm_label.into(),
            detail: serde_json::Value::Null,
        }
    }

    pub fn integrity_warning(detail: serde_json::Value) -> Self {
        let mut dialog = Self::new(
            DialogKind::IntegrityWarning,
            LABEL_INTEGRITY_TITLE,
            vec![
                LABEL_INTEGRITY_DESCRIPTION.to_string(),
                LABEL_INTEGRITY_QUESTION.to_string(),
            ],
            Severity::Warning,
            LABEL_OK,
        );
        dialog.detail = detail;
        dialog
    }

    pub fn publish_record() -> Self {
        Self::new(
            DialogKind::PublishRecord,
            LABEL_PUBLISH_TITLE,
            vec![LABEL_PUBLISH_MESSAGE.to_string()],
            Severity::Info,
            LABEL_DO_PUBLISH,
        )
    }

    pub fn discard_record() -> Self {
        Self::new(
            DialogKind::DiscardRecord,
            LABEL_DISCARD_TITLE,
            vec![LABEL_DISCARD_MESSAGE.to_string()],
            Severity::Warning,
            LABEL_OK,
        )
    }

    pub fn selection_action(action: SelectionActionKind) -> Self {
        Self::new(
            DialogKind::SelectionAction,
            LABEL_SELECTION_TITLE,
            vec![format!("tooltip.{action}Selected")],
            Severity::Warning,
            format!("label_doaction_{action}"),
        )
    }

    pub fn mass_action(action: MassActionKind) -> Self {
        Self::new(
            DialogKind::MassAction,
            LABEL_MASS_TITLE,
            vec![
                format!("tooltip.{action}All"),
                LABEL_AFFECTS_WORKSPACE.to_string(),
            ],
            Severity::Warning,
            format!("label_doaction_{action}"),
        )
    }
}

// ---------------------------------------------------------------------------
// Row details view
// ---------------------------------------------------------------------------

/// A rendered history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub differences: HistoryBody,
    pub datetime: String,
    pub user: String,
    pub user_avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HistoryBody {
    Fields(Vec<HistoryDiff>),
    /// Shown as plain text, never as markup.
    Text(String),
}

/// One tab of the details view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "section", content = "items", rename_all = "snake_case")]
pub enum DetailSection {
    Changes(Vec<DiffItem>),
    Comments(Vec<StageComment>),
    History(Vec<HistoryItem>),
}

impl DetailSection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Changes(_) => LABEL_TAB_CHANGES,
            Self::Comments(_) => LABEL_TAB_COMMENTS,
            Self::History(_) => LABEL_TAB_HISTORY,
        }
    }

    /// Count badge; only comments carry one.
    pub fn badge(&self) -> Option<usize> {
        match self {
            Self::Comments(comments) => Some(comments.len()),
            _ => None,
        }
    }
}

/// A button of the details view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailButton {
    pub name: &'static str,
    /// Stage title, or a label key for Close.
    pub text: String,
    /// Stage move this button starts; `None` closes the view.
    pub direction: Option<StageDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub title: String,
    /// Live title of the record, substituted into `title`.
    pub record_title: String,
    pub path: String,
    pub stage_label: String,
    pub stage_position: u32,
    pub stage_count: u32,
    pub sections: Vec<DetailSection>,
    /// Index into `sections` of the initially active tab.
    pub active_section: Option<usize>,
    pub buttons: Vec<DetailButton>,
}

impl DetailView {
    /// Build the view of `record` from its `getRowDetails` payload.
    pub fn build(record: &WorkspaceRecord, details: RowDetails) -> Self {
        let mut sections = Vec::new();

        if !details.diff.is_empty() {
            sections.push(DetailSection::Changes(details.diff));
        }
        if !details.comments.is_empty() {
            sections.push(DetailSection::Comments(details.comments));
        }
        if details.history.total > 0 {
            let items = details
                .history
                .data
                .into_iter()
                .filter_map(|entry| {
                    let differences = match entry.differences {
                        HistoryDifferences::Fields(fields) if fields.is_empty() => return None,
                        HistoryDifferences::Fields(fields) => HistoryBody::Fields(fields),
                        HistoryDifferences::Message(text) => HistoryBody::Text(text),
                    };
                    Some(HistoryItem {
                        differences,
                        datetime: entry.datetime,
                        user: entry.user,
                        user_avatar: entry.user_avatar,
                    })
                })
                .collect();
            sections.push(DetailSection::History(items));
        }

        // Only transitions the record can actually take get a button.
        let mut buttons = Vec::new();
        let stage_buttons = [
            ("prevstage", details.label_prev_stage, StageDirection::Previous),
            ("nextstage", details.label_next_stage, StageDirection::Next),
        ];
        for (name, label, direction) in stage_buttons {
            if let Some(label) = label.filter(|_| record.transition(direction).is_some()) {
                buttons.push(DetailButton {
                    name,
                    text: label.title,
                    direction: Some(direction),
                });
            }
        }
        buttons.push(DetailButton {
            name: "cancel",
            text: LABEL_CLOSE.to_string(),
            direction: None,
        });

        Self {
            title: LABEL_RECORD_INFORMATION.to_string(),
            record_title: record.label_live.trim().to_string(),
            path: details.path_live,
            stage_label: details.label_stage,
            stage_position: details.stage_position,
            stage_count: details.stage_count,
            active_section: (!sections.is_empty()).then_some(0),
            sections,
            buttons,
        }
    }

    pub fn has_button(&self, name: &str) -> bool {
        self.buttons.iter().any(|b| b.name == name)
    }
}

// ---------------------------------------------------------------------------
// Preview links
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLink {
    pub language: String,
    pub url: String,
}
