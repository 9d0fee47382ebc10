//! Shared fixtures for the module integration tests: a scripted gateway, a
//! scripted interaction and listing builders.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::broadcast;

use workspaces_core::mass_action::MassActionProgress;
use workspaces_events::{EventBus, ModuleEvent, Notification};
use workspaces_module::presentation::ConfirmDialog;
use workspaces_module::{
    Interaction, MemoryStore, ModuleConfig, ModuleDataStore, StageForm, WorkspaceModule,
};
use workspaces_remote::{ActionResult, RemoteAction, RemoteActionGateway, RemoteError};

pub const WORKSPACE_ID: i64 = 3;

// ---------------------------------------------------------------------------
// MockGateway
// ---------------------------------------------------------------------------

enum Scripted {
    Ok(Value),
    Failed(String),
}

/// Gateway answering from per-method scripts and recording every batch.
///
/// Queued answers are consumed in order; once a method's queue is empty its
/// sticky answer is used, then a default (`{data: [], total: 0}` for the
/// listing, `null` for anything else).
#[derive(Default)]
pub struct MockGateway {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    sticky: Mutex<HashMap<String, Value>>,
    batches: Mutex<Vec<Vec<RemoteAction>>>,
    transport_failures: Mutex<Vec<TransportFailure>>,
}

struct TransportFailure {
    method: Option<String>,
    nth: usize,
    message: String,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer the next call of `method` with `result`.
    pub fn respond(&self, method: &str, result: Value) {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(Scripted::Ok(result));
    }

    /// Answer every call of `method` with `result` once the queue is empty.
    pub fn respond_always(&self, method: &str, result: Value) {
        self.sticky
            .lock()
            .unwrap()
            .insert(method.to_string(), result);
    }

    /// Report a per-action failure for the next call of `method`.
    pub fn fail(&self, method: &str, message: &str) {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(Scripted::Failed(message.to_string()));
    }

    /// Fail the next round-trip as a whole.
    pub fn fail_transport(&self, message: &str) {
        self.transport_failures.lock().unwrap().push(TransportFailure {
            method: None,
            nth: 0,
            message: message.to_string(),
        });
    }

    /// Fail the round-trip carrying the `nth` (1-based) call of `method`.
    pub fn fail_transport_at(&self, method: &str, nth: usize, message: &str) {
        self.transport_failures.lock().unwrap().push(TransportFailure {
            method: Some(method.to_string()),
            nth,
            message: message.to_string(),
        });
    }

    pub fn batches(&self) -> Vec<Vec<RemoteAction>> {
        self.batches.lock().unwrap().clone()
    }

    /// Every action sent, flattened across batches.
    pub fn calls(&self) -> Vec<RemoteAction> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|a| a.method).collect()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RemoteAction> {
        self.calls()
            .into_iter()
            .filter(|a| a.method == method)
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls_to(method).len()
    }

    fn answer(&self, method: &str) -> ActionResult {
        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front);

        match queued {
            Some(Scripted::Ok(value)) => ActionResult::ok(method, value),
            Some(Scripted::Failed(message)) => ActionResult::failed(method, message),
            None => {
                let value = self
                    .sticky
                    .lock()
                    .unwrap()
                    .get(method)
                    .cloned()
                    .unwrap_or_else(|| match method {
                        "getWorkspaceInfos" => listing(vec![], 0),
                        _ => Value::Null,
                    });
                ActionResult::ok(method, value)
            }
        }
    }
}

#[async_trait]
impl RemoteActionGateway for MockGateway {
    async fn send(&self, actions: Vec<RemoteAction>) -> Result<Vec<ActionResult>, RemoteError> {
        self.batches.lock().unwrap().push(actions.clone());

        let failure = {
            let mut failures = self.transport_failures.lock().unwrap();
            let position = failures.iter().position(|f| match &f.method {
                None => true,
                Some(method) => {
                    actions.iter().any(|a| &a.method == method) && self.count(method) == f.nth
                }
            });
            position.map(|i| failures.remove(i))
        };
        if let Some(failure) = failure {
            return Err(RemoteError::ApiError {
                status: 502,
                body: failure.message,
            });
        }

        Ok(actions.iter().map(|a| self.answer(&a.method)).collect())
    }
}

// ---------------------------------------------------------------------------
// ScriptedInteraction
// ---------------------------------------------------------------------------

/// Interaction answering from scripts and recording what it was shown.
///
/// Confirmations default to `true`, stage forms to an empty submitted form.
#[derive(Default)]
pub struct ScriptedInteraction {
    confirms: Mutex<VecDeque<bool>>,
    forms: Mutex<VecDeque<Option<Map<String, Value>>>>,
    dialogs: Mutex<Vec<ConfirmDialog>>,
    forms_seen: Mutex<Vec<StageForm>>,
    progress: Mutex<Vec<MassActionProgress>>,
}

impl ScriptedInteraction {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer the next confirmations in order.
    pub fn with_confirms(answers: &[bool]) -> Arc<Self> {
        let interaction = Self::default();
        interaction.confirms.lock().unwrap().extend(answers);
        Arc::new(interaction)
    }

    /// Answer the next stage form with `values`, or cancel it with `None`.
    pub fn answer_form(&self, values: Option<Map<String, Value>>) {
        self.forms.lock().unwrap().push_back(values);
    }

    pub fn dialogs(&self) -> Vec<ConfirmDialog> {
        self.dialogs.lock().unwrap().clone()
    }

    pub fn forms_seen(&self) -> Vec<StageForm> {
        self.forms_seen.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<MassActionProgress> {
        self.progress.lock().unwrap().clone()
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn confirm(&self, dialog: &ConfirmDialog) -> bool {
        self.dialogs.lock().unwrap().push(dialog.clone());
        self.confirms.lock().unwrap().pop_front().unwrap_or(true)
    }

    async fn fill_stage_form(&self, form: &StageForm) -> Option<Map<String, Value>> {
        self.forms_seen.lock().unwrap().push(form.clone());
        self.forms
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Some(Map::new()))
    }

    fn mass_action_progress(&self, progress: &MassActionProgress) {
        self.progress.lock().unwrap().push(progress.clone());
    }
}

// ---------------------------------------------------------------------------
// Module and listing builders
// ---------------------------------------------------------------------------

pub fn config() -> ModuleConfig {
    ModuleConfig::new(WORKSPACE_ID, "http://cms.test/dispatch", "token")
}

pub struct Harness {
    pub module: Arc<WorkspaceModule>,
    pub gateway: Arc<MockGateway>,
    pub interaction: Arc<ScriptedInteraction>,
    pub store: Arc<MemoryStore>,
    pub events: broadcast::Receiver<Notification>,
}

impl Harness {
    pub fn new(gateway: Arc<MockGateway>, interaction: Arc<ScriptedInteraction>) -> Self {
        Self::with_config(config(), gateway, interaction)
    }

    pub fn with_config(
        config: ModuleConfig,
        gateway: Arc<MockGateway>,
        interaction: Arc<ScriptedInteraction>,
    ) -> Self {
        let bus = Arc::new(EventBus::default());
        let events = bus.subscribe();
        let store = Arc::new(MemoryStore::new());
        let module = WorkspaceModule::new(
            config,
            gateway.clone(),
            interaction.clone(),
            bus,
            store.clone() as Arc<dyn ModuleDataStore>,
        );
        Self {
            module: Arc::new(module),
            gateway,
            interaction,
            store,
            events,
        }
    }

    /// Start the module with `rows` as the first listing.
    pub async fn started(
        gateway: Arc<MockGateway>,
        interaction: Arc<ScriptedInteraction>,
        rows: Vec<Value>,
    ) -> Self {
        let total = rows.len() as u64;
        gateway.respond("getWorkspaceInfos", listing(rows, total));
        let mut harness = Self::new(gateway, interaction);
        harness.module.start().await.unwrap();
        harness.drain_events();
        harness
    }

    /// Events published since the last drain.
    pub fn drain_events(&mut self) -> Vec<ModuleEvent> {
        let mut events = Vec::new();
        while let Ok(notification) = self.events.try_recv() {
            events.push(notification.event);
        }
        events
    }
}

pub fn listing(rows: Vec<Value>, total: u64) -> Value {
    json!({ "data": rows, "total": total })
}

/// A listing row with both stage neighbours.
pub fn row(table: &str, uid: i64, live_id: i64) -> Value {
    json!({
        "table": table,
        "uid": uid,
        "t3ver_oid": live_id,
        "stage": 0,
        "value_prevStage": -10,
        "value_nextStage": 1,
        "label_Live": format!("{table} {uid}"),
    })
}

pub fn with_field(mut row: Value, field: &str, value: Value) -> Value {
    row[field] = value;
    row
}
