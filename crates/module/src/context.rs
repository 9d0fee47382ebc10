//! State and collaborators shared by the workflow engines.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use workspaces_core::error::CoreError;
use workspaces_core::record::{WorkspaceInfos, WorkspaceRecord};
use workspaces_core::settings::Settings;
use workspaces_core::table::RecordTable;
use workspaces_core::types::RecordKey;
use workspaces_events::{EventBus, ModuleEvent};
use workspaces_remote::gateway::{call, decode};
use workspaces_remote::{RemoteAction, RemoteActionGateway, RemoteError};

use crate::config::ModuleConfig;
use crate::error::ModuleResult;
use crate::in_flight::InFlight;
use crate::interaction::Interaction;
use crate::preferences::ModuleDataStore;

/// RPC returning one page of the workspace listing.
pub(crate) const GET_WORKSPACE_INFOS: &str = "getWorkspaceInfos";

pub(crate) struct ModuleContext {
    pub(crate) config: ModuleConfig,
    pub(crate) gateway: Arc<dyn RemoteActionGateway>,
    pub(crate) interaction: Arc<dyn Interaction>,
    pub(crate) events: Arc<EventBus>,
    pub(crate) preferences: Arc<dyn ModuleDataStore>,
    pub(crate) table: RwLock<RecordTable>,
    pub(crate) in_flight: InFlight,
}

impl ModuleContext {
    pub(crate) fn new(
        config: ModuleConfig,
        gateway: Arc<dyn RemoteActionGateway>,
        interaction: Arc<dyn Interaction>,
        events: Arc<EventBus>,
        preferences: Arc<dyn ModuleDataStore>,
    ) -> Self {
        let settings = Settings::new(config.workspace_id).with_limit(config.page_limit);
        Self {
            config,
            gateway,
            interaction,
            events,
            preferences,
            table: RwLock::new(RecordTable::new(settings)),
            in_flight: InFlight::default(),
        }
    }

    pub(crate) fn workspace_id(&self) -> i64 {
        self.config.workspace_id
    }

    /// Announce a structural change to sibling components.
    pub(crate) fn signal(&self, event: ModuleEvent) {
        self.events.publish(self.config.workspace_id, event);
    }

    /// Snapshot of a rendered row.
    pub(crate) async fn record(&self, key: &RecordKey) -> ModuleResult<WorkspaceRecord> {
        self.table
            .read()
            .await
            .record(key)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(key.clone()).into())
    }

    /// Language filter currently applied to the listing.
    pub(crate) async fn language(&self) -> String {
        self.table.read().await.settings().language.clone()
    }

    async fn listing_action(&self) -> ModuleResult<RemoteAction> {
        let settings = self.table.write().await.fetch_settings()?;
        Ok(RemoteAction::remote(GET_WORKSPACE_INFOS, settings))
    }

    /// Fetch the listing for the current settings and render it.
    pub(crate) async fn refresh(&self) -> ModuleResult<()> {
        let action = self.listing_action().await?;
        let infos: WorkspaceInfos = call(self.gateway.as_ref(), action).await?;
        tracing::debug!(
            workspace_id = self.config.workspace_id,
            total = infos.total,
            rows = infos.data.len(),
            "Workspace listing fetched",
        );
        self.table.write().await.render(infos);
        Ok(())
    }

    /// Run `action` and re-fetch the listing in the same round-trip.
    ///
    /// The listing is rendered even when the action itself failed, since the
    /// backend may have applied part of it; the action's failure is returned
    /// afterwards.
    pub(crate) async fn execute_and_refresh(&self, action: RemoteAction) -> ModuleResult<Value> {
        let method = action.method.clone();
        let listing = self.listing_action().await?;

        let mut results = self.gateway.send(vec![action, listing]).await?;
        if results.len() != 2 {
            return Err(RemoteError::Protocol(format!(
                "Expected 2 results for '{method}', got {}",
                results.len()
            ))
            .into());
        }
        let listing = results.pop().map(decode::<WorkspaceInfos>);
        let executed = results.pop().map(decode::<Value>);

        if let Some(infos) = listing {
            self.table.write().await.render(infos?);
        }
        match executed {
            Some(result) => Ok(result?),
            None => Ok(Value::Null),
        }
    }
}
