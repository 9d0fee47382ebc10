//! The workspace module: owns the record table and routes commands to the
//! workflow engines.

use std::sync::Arc;

use tokio::sync::RwLockReadGuard;
use tokio_util::sync::CancellationToken;

use workspaces_core::details::{RowDetailsRequest, RowDetailsResult, GET_ROW_DETAILS};
use workspaces_core::error::CoreError;
use workspaces_core::settings::{PageAction, SortDirection};
use workspaces_core::stage::StageDirection;
use workspaces_core::table::{CheckboxChange, RecordTable};
use workspaces_core::types::{RecordKey, StageId};
use workspaces_events::{EventBus, ModuleEvent};
use workspaces_remote::gateway::call;
use workspaces_remote::{RemoteAction, RemoteActionGateway};

use crate::config::ModuleConfig;
use crate::context::ModuleContext;
use crate::error::ModuleResult;
use crate::interaction::Interaction;
use crate::mass_action::MassActionEngine;
use crate::outcome::{ActionOutcome, MassActionOutcome};
use crate::preferences::{self, storage_key, ModuleDataStore};
use crate::presentation::{DetailView, PreviewLink};
use crate::selection::SelectionActionEngine;
use crate::stage::StageTransitionEngine;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A user intent the module reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Re-fetch the listing with the current settings.
    Refresh,
    /// Apply a search text. An empty text clears the filter.
    SubmitSearch(String),
    ClearSearch,
    SetDepth(i64),
    SetLanguage(String),
    SetStageFilter(String),
    Sort {
        field: String,
        direction: SortDirection,
    },
    Paginate(PageAction),
    ToggleRecord {
        key: RecordKey,
        checked: bool,
    },
    SendToStage {
        key: RecordKey,
        direction: StageDirection,
    },
    SendSelectionToStage {
        stage: StageId,
    },
    PublishRecord(RecordKey),
    DiscardRecord(RecordKey),
    /// Chooser value of the selection action menu (`""`, `publish`, `discard`).
    RunSelectionAction(String),
    /// Chooser value of the mass action menu (`""`, `publish`, `discard`).
    RunMassAction(String),
}

/// What a [`Command`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The listing was re-fetched and rendered.
    Refreshed,
    /// Nothing changed (e.g. `next` on the last page).
    Unchanged,
    /// Checkbox changes in application order.
    Toggled(Vec<CheckboxChange>),
    Action(ActionOutcome),
    MassAction(MassActionOutcome),
}

// ---------------------------------------------------------------------------
// WorkspaceModule
// ---------------------------------------------------------------------------

/// Entry point of the workspace staging & publication workflow.
///
/// Cheap to share behind an `Arc`; commands may run concurrently. Mutations
/// of the same record are serialized by an in-flight guard and fail fast
/// with [`CoreError::Conflict`].
pub struct WorkspaceModule {
    ctx: Arc<ModuleContext>,
    stage: StageTransitionEngine,
    selection: SelectionActionEngine,
    mass: MassActionEngine,
    cancel: CancellationToken,
}

impl WorkspaceModule {
    pub fn new(
        config: ModuleConfig,
        gateway: Arc<dyn RemoteActionGateway>,
        interaction: Arc<dyn Interaction>,
        events: Arc<EventBus>,
        preferences: Arc<dyn ModuleDataStore>,
    ) -> Self {
        let ctx = Arc::new(ModuleContext::new(
            config,
            gateway,
            interaction,
            events,
            preferences,
        ));
        Self {
            stage: StageTransitionEngine::new(Arc::clone(&ctx)),
            selection: SelectionActionEngine::new(Arc::clone(&ctx)),
            mass: MassActionEngine::new(Arc::clone(&ctx)),
            ctx,
            cancel: CancellationToken::new(),
        }
    }

    /// Announce a pending workspace switch, restore persisted filters and
    /// fetch the first page of the listing.
    pub async fn start(&self) -> ModuleResult<()> {
        if let Some(switch) = &self.ctx.config.workspace_switch {
            tracing::info!(
                workspace_id = switch.id,
                title = %switch.title,
                "Workspace switched",
            );
            self.ctx.signal(ModuleEvent::WorkspaceSwitched {
                id: switch.id,
                title: switch.title.clone(),
            });
            self.ctx.signal(ModuleEvent::PageTreeRefresh);
            self.ctx.signal(ModuleEvent::ModuleMenuRefresh);
        }

        self.restore_preferences().await;

        if !self.ctx.config.workspace_accessible {
            tracing::info!(
                workspace_id = self.ctx.workspace_id(),
                "Workspace not accessible, skipping listing",
            );
            return Ok(());
        }
        self.ctx.refresh().await
    }

    /// Route one command.
    pub async fn dispatch(&self, command: Command) -> ModuleResult<CommandOutcome> {
        match command {
            Command::Refresh => self.refreshed().await,
            Command::SubmitSearch(text) => {
                self.ctx.table.write().await.settings_mut().filter_txt = text;
                self.refreshed().await
            }
            Command::ClearSearch => {
                self.ctx.table.write().await.settings_mut().filter_txt.clear();
                self.refreshed().await
            }
            Command::SetDepth(depth) => {
                self.persist(preferences::DEPTH, depth.to_string()).await;
                self.ctx.table.write().await.settings_mut().depth = depth;
                self.refreshed().await
            }
            Command::SetLanguage(language) => {
                self.persist(preferences::LANGUAGE, language.clone()).await;
                self.ctx.table.write().await.settings_mut().language = language;
                self.refreshed().await
            }
            Command::SetStageFilter(stage) => {
                self.persist(preferences::STAGE, stage.clone()).await;
                self.ctx.table.write().await.settings_mut().stage = Some(stage);
                self.refreshed().await
            }
            Command::Sort { field, direction } => {
                {
                    let mut table = self.ctx.table.write().await;
                    let settings = table.settings_mut();
                    settings.sort = field;
                    settings.dir = direction;
                }
                self.refreshed().await
            }
            Command::Paginate(action) => {
                let reload = self.ctx.table.write().await.paginate(action)?;
                if reload {
                    self.refreshed().await
                } else {
                    Ok(CommandOutcome::Unchanged)
                }
            }
            Command::ToggleRecord { key, checked } => {
                let changes = self.ctx.table.write().await.toggle(&key, checked)?;
                Ok(CommandOutcome::Toggled(changes))
            }
            Command::SendToStage { key, direction } => self
                .stage
                .send_to_stage(&key, direction)
                .await
                .map(CommandOutcome::Action),
            Command::SendSelectionToStage { stage } => self
                .stage
                .send_selection_to_stage(stage)
                .await
                .map(CommandOutcome::Action),
            Command::PublishRecord(key) => self
                .selection
                .publish_record(&key)
                .await
                .map(CommandOutcome::Action),
            Command::DiscardRecord(key) => self
                .selection
                .discard_record(&key)
                .await
                .map(CommandOutcome::Action),
            Command::RunSelectionAction(choice) => self
                .selection
                .run(&choice)
                .await
                .map(CommandOutcome::Action),
            Command::RunMassAction(choice) => {
                let cancel = self.cancel.child_token();
                self.run_mass_action(&choice, &cancel)
                    .await
                    .map(CommandOutcome::MassAction)
            }
        }
    }

    /// Run a mass action that stops between rounds once `cancel` fires.
    pub async fn run_mass_action(
        &self,
        choice: &str,
        cancel: &CancellationToken,
    ) -> ModuleResult<MassActionOutcome> {
        self.mass.run(choice, cancel).await
    }

    /// Fetch and build the details view of one row.
    pub async fn show_details(&self, key: &RecordKey) -> ModuleResult<DetailView> {
        let record = self.ctx.record(key).await?;
        let request = RowDetailsRequest {
            stage: record.stage,
            live_id: record.live_id,
            table: record.table.clone(),
            version_id: record.version_id,
            filter_fields: true,
        };
        let result: RowDetailsResult = call(
            self.ctx.gateway.as_ref(),
            RemoteAction::remote(GET_ROW_DETAILS, request),
        )
        .await?;

        let details = result.data.into_iter().next().ok_or_else(|| {
            CoreError::Internal(format!("No details returned for record {key}"))
        })?;
        Ok(DetailView::build(&record, details))
    }

    pub async fn preview_url(&self, key: &RecordKey) -> ModuleResult<String> {
        self.selection.preview_url(key).await
    }

    pub async fn preview_links(&self) -> ModuleResult<Vec<PreviewLink>> {
        self.selection.preview_links().await
    }

    /// Read access to the rendered table.
    pub async fn table(&self) -> RwLockReadGuard<'_, RecordTable> {
        self.ctx.table.read().await
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.ctx.config
    }

    /// Stop running mass actions after their current round.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    // ---- private helpers ----

    async fn refreshed(&self) -> ModuleResult<CommandOutcome> {
        self.ctx.refresh().await?;
        Ok(CommandOutcome::Refreshed)
    }

    async fn persist(&self, name: &str, value: String) {
        self.ctx.preferences.set(&storage_key(name), value).await;
    }

    async fn restore_preferences(&self) {
        let store = &self.ctx.preferences;
        let depth = store.get(&storage_key(preferences::DEPTH)).await;
        let language = store.get(&storage_key(preferences::LANGUAGE)).await;
        let stage = store.get(&storage_key(preferences::STAGE)).await;

        let mut table = self.ctx.table.write().await;
        let settings = table.settings_mut();
        if let Some(raw) = depth {
            match raw.parse() {
                Ok(depth) => settings.depth = depth,
                Err(_) => tracing::warn!(value = %raw, "Ignoring stored depth"),
            }
        }
        if let Some(language) = language {
            settings.language = language;
        }
        if let Some(stage) = stage {
            settings.stage = Some(stage);
        }
    }
}
