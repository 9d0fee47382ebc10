//! Stage transitions: request the form, let the user fill it, execute.
//!
//! Every move is a three-step protocol. The window RPC returns a form
//! descriptor; the user fills or cancels it; the execute RPC is batched with
//! a listing re-fetch in one round-trip. Cancelling the form is terminal and
//! sends nothing.

use std::sync::Arc;

use serde_json::{json, Value};

use workspaces_core::error::CoreError;
use workspaces_core::selection::StageElement;
use workspaces_core::stage::{
    StageDirection, SPECIFIC_STAGE_EXECUTE_ACTION, SPECIFIC_STAGE_WINDOW_ACTION,
};
use workspaces_core::types::{RecordKey, StageId};
use workspaces_events::ModuleEvent;
use workspaces_remote::gateway::call;
use workspaces_remote::RemoteAction;

use crate::context::ModuleContext;
use crate::error::ModuleResult;
use crate::interaction::StageForm;
use crate::outcome::ActionOutcome;

pub struct StageTransitionEngine {
    ctx: Arc<ModuleContext>,
}

impl StageTransitionEngine {
    pub(crate) fn new(ctx: Arc<ModuleContext>) -> Self {
        Self { ctx }
    }

    /// Move one record to its previous or next stage.
    pub async fn send_to_stage(
        &self,
        key: &RecordKey,
        direction: StageDirection,
    ) -> ModuleResult<ActionOutcome> {
        let record = self.ctx.record(key).await?;
        let transition = record.transition(direction).ok_or_else(|| {
            CoreError::InvalidTransition(format!("Record {key} has no {direction} stage"))
        })?;

        let _guard = self.ctx.in_flight.acquire(std::slice::from_ref(key))?;

        let window = RemoteAction::actions(
            direction.window_action(),
            vec![
                json!(record.version_id),
                json!(record.table),
                json!(record.live_id),
            ],
        );
        let descriptor: Value = call(self.ctx.gateway.as_ref(), window).await?;

        let Some(mut form) = self
            .ctx
            .interaction
            .fill_stage_form(&StageForm::new(descriptor))
            .await
        else {
            tracing::debug!(%key, %direction, "Stage change cancelled");
            return Ok(ActionOutcome::Cancelled);
        };

        form.insert(
            "affects".to_string(),
            json!({
                "table": record.table,
                "nextStage": transition.target_stage,
                "t3ver_oid": record.live_id,
                "uid": record.version_id,
                "elements": [],
            }),
        );

        self.ctx
            .execute_and_refresh(RemoteAction::actions(
                direction.execute_action(),
                vec![Value::Object(form)],
            ))
            .await?;

        tracing::info!(
            workspace_id = self.ctx.workspace_id(),
            table = %record.table,
            version_id = record.version_id,
            target_stage = transition.target_stage,
            "Record sent to {direction} stage",
        );
        self.ctx.signal(ModuleEvent::PageTreeRefresh);
        Ok(ActionOutcome::Completed)
    }

    /// Move every marked record to `stage`.
    pub async fn send_selection_to_stage(&self, stage: StageId) -> ModuleResult<ActionOutcome> {
        let keys = self.ctx.table.read().await.selection().keys().to_vec();
        if keys.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }

        let _guard = self.ctx.in_flight.acquire(&keys)?;
        let elements: Vec<StageElement> = keys.iter().map(StageElement::from).collect();

        let window = RemoteAction::actions(
            SPECIFIC_STAGE_WINDOW_ACTION,
            vec![json!(stage), json!(elements)],
        );
        let descriptor: Value = call(self.ctx.gateway.as_ref(), window).await?;

        let Some(mut form) = self
            .ctx
            .interaction
            .fill_stage_form(&StageForm::new(descriptor))
            .await
        else {
            tracing::debug!(stage, "Specific stage change cancelled");
            return Ok(ActionOutcome::Cancelled);
        };

        form.insert(
            "affects".to_string(),
            json!({
                "elements": elements,
                "nextStage": stage,
            }),
        );

        self.ctx
            .execute_and_refresh(RemoteAction::actions(
                SPECIFIC_STAGE_EXECUTE_ACTION,
                vec![Value::Object(form)],
            ))
            .await?;

        tracing::info!(
            workspace_id = self.ctx.workspace_id(),
            stage,
            records = elements.len(),
            "Selection sent to stage",
        );
        self.ctx.signal(ModuleEvent::PageTreeRefresh);
        Ok(ActionOutcome::Completed)
    }
}
