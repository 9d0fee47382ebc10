//! Actions over the marked selection and over single records.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use workspaces_core::integrity::IntegrityScope;
use workspaces_core::mass_action::{SelectionActionKind, EXECUTE_SELECTION_ACTION};
use workspaces_core::selection::AffectedRecord;
use workspaces_core::types::RecordKey;
use workspaces_events::ModuleEvent;
use workspaces_remote::gateway::call;
use workspaces_remote::RemoteAction;

use crate::context::ModuleContext;
use crate::error::ModuleResult;
use crate::integrity::IntegrityChecker;
use crate::outcome::ActionOutcome;
use crate::presentation::{ConfirmDialog, PreviewLink};

pub const PUBLISH_SINGLE_RECORD: &str = "publishSingleRecord";
pub const DELETE_SINGLE_RECORD: &str = "deleteSingleRecord";
pub const VIEW_SINGLE_RECORD: &str = "viewSingleRecord";
pub const PREVIEW_LINKS: &str = "generateWorkspacePreviewLinksForAllLanguages";

pub struct SelectionActionEngine {
    ctx: Arc<ModuleContext>,
    integrity: IntegrityChecker,
}

impl SelectionActionEngine {
    pub(crate) fn new(ctx: Arc<ModuleContext>) -> Self {
        let integrity = IntegrityChecker::new(Arc::clone(&ctx.gateway));
        Self { ctx, integrity }
    }

    /// Apply the chosen action to every marked record.
    ///
    /// An empty `choice` or an empty selection does nothing; an unknown
    /// action name is an error.
    pub async fn run(&self, choice: &str) -> ModuleResult<ActionOutcome> {
        let Some(action) = SelectionActionKind::parse_choice(choice)? else {
            return Ok(ActionOutcome::Skipped);
        };

        let keys = self.ctx.table.read().await.selection().keys().to_vec();
        if keys.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }
        let _guard = self.ctx.in_flight.acquire(&keys)?;
        let affected: Vec<AffectedRecord> = keys.iter().map(AffectedRecord::from).collect();

        if action.requires_integrity_check() {
            let scope = IntegrityScope::Selection(affected.clone());
            if !self.integrity.gate(&scope, self.ctx.interaction.as_ref()).await? {
                return Ok(ActionOutcome::Cancelled);
            }
        }

        let dialog = ConfirmDialog::selection_action(action);
        if !self.ctx.interaction.confirm(&dialog).await {
            return Ok(ActionOutcome::Cancelled);
        }

        let _: Value = call(
            self.ctx.gateway.as_ref(),
            RemoteAction::actions_object(
                EXECUTE_SELECTION_ACTION,
                json!({
                    "action": action.as_str(),
                    "selection": affected,
                }),
            ),
        )
        .await?;

        tracing::info!(
            workspace_id = self.ctx.workspace_id(),
            action = action.as_str(),
            records = affected.len(),
            "Selection action executed",
        );

        self.ctx.table.write().await.clear_selection();
        self.ctx.refresh().await?;
        self.ctx.signal(ModuleEvent::PageTreeRefresh);
        Ok(ActionOutcome::Completed)
    }

    /// Publish one record after an integrity check and confirmation.
    pub async fn publish_record(&self, key: &RecordKey) -> ModuleResult<ActionOutcome> {
        let record = self.ctx.record(key).await?;
        let _guard = self.ctx.in_flight.acquire(std::slice::from_ref(key))?;

        let scope = IntegrityScope::Selection(vec![AffectedRecord::from(key)]);
        if !self.integrity.gate(&scope, self.ctx.interaction.as_ref()).await? {
            return Ok(ActionOutcome::Cancelled);
        }
        if !self.ctx.interaction.confirm(&ConfirmDialog::publish_record()).await {
            return Ok(ActionOutcome::Cancelled);
        }

        let _: Value = call(
            self.ctx.gateway.as_ref(),
            RemoteAction::actions(
                PUBLISH_SINGLE_RECORD,
                vec![
                    json!(record.table),
                    json!(record.live_id),
                    json!(record.version_id),
                ],
            ),
        )
        .await?;

        tracing::info!(
            workspace_id = self.ctx.workspace_id(),
            table = %record.table,
            version_id = record.version_id,
            "Record published",
        );
        self.ctx.refresh().await?;
        self.ctx.signal(ModuleEvent::PageTreeRefresh);
        Ok(ActionOutcome::Completed)
    }

    /// Discard the workspace version of one record. Never integrity-checked.
    pub async fn discard_record(&self, key: &RecordKey) -> ModuleResult<ActionOutcome> {
        let record = self.ctx.record(key).await?;
        let _guard = self.ctx.in_flight.acquire(std::slice::from_ref(key))?;

        if !self.ctx.interaction.confirm(&ConfirmDialog::discard_record()).await {
            return Ok(ActionOutcome::Cancelled);
        }

        let _: Value = call(
            self.ctx.gateway.as_ref(),
            RemoteAction::actions(
                DELETE_SINGLE_RECORD,
                vec![json!(record.table), json!(record.version_id)],
            ),
        )
        .await?;

        tracing::info!(
            workspace_id = self.ctx.workspace_id(),
            table = %record.table,
            version_id = record.version_id,
            "Record discarded",
        );
        self.ctx.refresh().await?;
        self.ctx.signal(ModuleEvent::PageTreeRefresh);
        Ok(ActionOutcome::Completed)
    }

    /// Preview URL of one record's workspace version.
    pub async fn preview_url(&self, key: &RecordKey) -> ModuleResult<String> {
        let record = self.ctx.record(key).await?;
        let url = call(
            self.ctx.gateway.as_ref(),
            RemoteAction::actions(
                VIEW_SINGLE_RECORD,
                vec![json!(record.table), json!(record.version_id)],
            ),
        )
        .await?;
        Ok(url)
    }

    /// Workspace preview links, one per site language.
    pub async fn preview_links(&self) -> ModuleResult<Vec<PreviewLink>> {
        let links: Map<String, Value> = call(
            self.ctx.gateway.as_ref(),
            RemoteAction::actions(PREVIEW_LINKS, vec![json!(self.ctx.workspace_id())]),
        )
        .await?;

        Ok(links
            .into_iter()
            .map(|(language, url)| PreviewLink {
                language,
                url: match url {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
            })
            .collect())
    }
}
