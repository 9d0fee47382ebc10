//! Integrity pre-check run before anything is published.

use std::sync::Arc;

use workspaces_core::integrity::{IntegrityResult, IntegrityScope, Verdict};
use workspaces_remote::gateway::call;
use workspaces_remote::{RemoteAction, RemoteActionGateway};

use crate::error::ModuleResult;
use crate::interaction::Interaction;
use crate::presentation::ConfirmDialog;

/// RPC running the integrity check.
pub const CHECK_INTEGRITY: &str = "checkIntegrity";

/// Asks the backend whether applying an action would leave live and draft
/// content in conflict.
#[derive(Clone)]
pub struct IntegrityChecker {
    gateway: Arc<dyn RemoteActionGateway>,
}

impl IntegrityChecker {
    pub fn new(gateway: Arc<dyn RemoteActionGateway>) -> Self {
        Self { gateway }
    }

    pub async fn check(&self, scope: &IntegrityScope) -> ModuleResult<Verdict> {
        let raw: IntegrityResult = call(
            self.gateway.as_ref(),
            RemoteAction::remote(CHECK_INTEGRITY, scope.to_payload()),
        )
        .await?;
        Ok(raw.into())
    }

    /// Run the check and, on a warning, let the user decide.
    ///
    /// Returns `true` when the caller may proceed.
    pub async fn gate(
        &self,
        scope: &IntegrityScope,
        interaction: &dyn Interaction,
    ) -> ModuleResult<bool> {
        match self.check(scope).await? {
            Verdict::Ok => Ok(true),
            Verdict::Warning(detail) => {
                tracing::warn!(?detail, "Integrity check reported issues");
                let dialog = ConfirmDialog::integrity_warning(detail);
                Ok(interaction.confirm(&dialog).await)
            }
        }
    }
}
