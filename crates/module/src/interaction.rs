//! The seam through which the engines ask the user for decisions.
//!
//! Dialog rendering lives outside this crate. An implementation answers
//! confirmations, fills the stage-change form and is told about mass-action
//! progress.

use async_trait::async_trait;
use serde_json::{Map, Value};

use workspaces_core::mass_action::MassActionProgress;

use crate::presentation::{ConfirmDialog, DialogKind};

/// Form descriptor returned by a stage window RPC.
///
/// The shape is backend-defined (fields for recipients, comments, ...);
/// it is passed through to the [`Interaction`] untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StageForm {
    pub descriptor: Value,
}

impl StageForm {
    pub fn new(descriptor: Value) -> Self {
        Self { descriptor }
    }

    /// Title the backend suggests for the dialog, if any.
    pub fn title(&self) -> Option<&str> {
        self.descriptor.get("title").and_then(Value::as_str)
    }
}

#[async_trait]
pub trait Interaction: Send + Sync {
    /// Ask the user to confirm. `false` aborts the operation.
    async fn confirm(&self, dialog: &ConfirmDialog) -> bool;

    /// Let the user fill the stage form. `None` means cancelled.
    async fn fill_stage_form(&self, form: &StageForm) -> Option<Map<String, Value>>;

    /// Progress of one mass-action round.
    fn mass_action_progress(&self, _progress: &MassActionProgress) {}
}

/// Non-interactive implementation for headless runs.
///
/// Confirms every dialog except integrity warnings, which are only accepted
/// when `proceed_on_integrity_warning` is set. Stage forms are submitted
/// empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended {
    pub proceed_on_integrity_warning: bool,
}

#[async_trait]
impl Interaction for Unattended {
    async fn confirm(&self, dialog: &ConfirmDialog) -> bool {
        match dialog.kind {
            DialogKind::IntegrityWarning => {
                if !self.proceed_on_integrity_warning {
                    tracing::warn!("Integrity issues reported, declining to proceed");
                }
                self.proceed_on_integrity_warning
            }
            _ => true,
        }
    }

    async fn fill_stage_form(&self, _form: &StageForm) -> Option<Map<String, Value>> {
        Some(Map::new())
    }

    fn mass_action_progress(&self, progress: &MassActionProgress) {
        tracing::info!(
            total = progress.total,
            processed = progress.processed,
            "Mass action progress",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use workspaces_core::mass_action::MassActionKind;

    #[tokio::test]
    async fn unattended_declines_integrity_warnings_by_default() {
        let interaction = Unattended::default();
        let warning = ConfirmDialog::integrity_warning(json!({}));
        let confirm = ConfirmDialog::mass_action(MassActionKind::Publish);

        assert!(!interaction.confirm(&warning).await);
        assert!(interaction.confirm(&confirm).await);
    }

    #[tokio::test]
    async fn unattended_can_accept_integrity_warnings() {
        let interaction = Unattended {
            proceed_on_integrity_warning: true,
        };
        assert!(
            interaction
                .confirm(&ConfirmDialog::integrity_warning(json!({})))
                .await
        );
    }

    #[test]
    fn stage_form_exposes_title() {
        let form = StageForm::new(json!({"title": "Send to next stage", "items": []}));
        assert_eq!(form.title(), Some("Send to next stage"));
        assert_eq!(StageForm::new(json!([])).title(), None);
    }
}
