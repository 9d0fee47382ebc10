//! Whole-workspace publish/discard, processed in server-paced batches.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use workspaces_core::integrity::IntegrityScope;
use workspaces_core::mass_action::{
    MassActionKind, MassActionProgress, MassActionRun, RoundOutcome,
};
use workspaces_events::ModuleEvent;
use workspaces_remote::gateway::call;
use workspaces_remote::{RemoteAction, RemoteError};

use crate::context::ModuleContext;
use crate::error::ModuleResult;
use crate::integrity::IntegrityChecker;
use crate::outcome::MassActionOutcome;
use crate::presentation::ConfirmDialog;

pub struct MassActionEngine {
    ctx: Arc<ModuleContext>,
    integrity: IntegrityChecker,
}

impl MassActionEngine {
    pub(crate) fn new(ctx: Arc<ModuleContext>) -> Self {
        let integrity = IntegrityChecker::new(Arc::clone(&ctx.gateway));
        Self { ctx, integrity }
    }

    /// Run the chosen mass action over the workspace, filtered by the
    /// current language.
    ///
    /// `cancel` is only checked between rounds. A round that is in flight
    /// always completes. A transport failure aborts the loop; running the
    /// action again starts over from round 0.
    pub async fn run(
        &self,
        choice: &str,
        cancel: &CancellationToken,
    ) -> ModuleResult<MassActionOutcome> {
        let Some(kind) = MassActionKind::parse_choice(choice)? else {
            return Ok(MassActionOutcome::Skipped);
        };
        let language = self.ctx.language().await;

        if kind.requires_integrity_check() {
            let scope = IntegrityScope::Workspace {
                language: language.clone(),
                kind: kind.as_str().to_string(),
            };
            if !self.integrity.gate(&scope, self.ctx.interaction.as_ref()).await? {
                return Ok(MassActionOutcome::Cancelled);
            }
        }

        if !self.ctx.interaction.confirm(&ConfirmDialog::mass_action(kind)).await {
            return Ok(MassActionOutcome::Cancelled);
        }

        let mut run = MassActionRun::new(kind, language);
        let mut request = run.next_request();

        let last = loop {
            let Some(body) = request.take() else {
                return Err(RemoteError::Protocol(format!(
                    "'{}' has no request to send",
                    kind.rpc_method()
                ))
                .into());
            };

            let response = self.round(kind, body).await?;
            self.ctx.interaction.mass_action_progress(&response);
            tracing::debug!(
                action = kind.as_str(),
                round = run.rounds() + 1,
                total = response.total,
                processed = response.processed,
                "Mass action round finished",
            );

            match run.record_response(response) {
                RoundOutcome::Complete(last) => break last,
                RoundOutcome::Continue(next) => {
                    if cancel.is_cancelled() {
                        tracing::info!(
                            action = kind.as_str(),
                            rounds = run.rounds(),
                            "Mass action aborted between rounds",
                        );
                        return Ok(MassActionOutcome::Aborted {
                            progress: run.last_progress().cloned(),
                        });
                    }
                    request = Some(next);
                }
            }
        };

        tracing::info!(
            workspace_id = self.ctx.workspace_id(),
            action = kind.as_str(),
            rounds = run.rounds(),
            processed = last.processed,
            "Mass action completed",
        );

        self.ctx.refresh().await?;
        self.ctx.signal(ModuleEvent::MassActionCompleted {
            action: kind.as_str().to_string(),
            processed: last.processed,
        });
        self.ctx.signal(ModuleEvent::PageTreeRefresh);

        Ok(MassActionOutcome::Completed {
            rounds: run.rounds(),
            total: last.total,
            processed: last.processed,
        })
    }

    async fn round(
        &self,
        kind: MassActionKind,
        body: MassActionProgress,
    ) -> ModuleResult<MassActionProgress> {
        let response: MassActionProgress = call(
            self.ctx.gateway.as_ref(),
            RemoteAction::mass(kind.rpc_method(), body),
        )
        .await?;

        if let Some(message) = response.error.clone() {
            return Err(RemoteError::Action {
                method: kind.rpc_method().to_string(),
                message,
            }
            .into());
        }
        Ok(response)
    }
}
