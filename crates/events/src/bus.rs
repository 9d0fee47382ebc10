//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Sibling components (the page tree, the module menu) subscribe to learn
//! that workspace content changed structurally and must be reloaded.
//! [`EventBus`] is meant to be shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ModuleEvent
// ---------------------------------------------------------------------------

/// A structural change signalled by the workspace module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModuleEvent {
    /// Records were published, discarded or moved; the page tree is stale.
    PageTreeRefresh,

    /// The module menu has to be rebuilt (e.g. after a workspace switch).
    ModuleMenuRefresh,

    /// The backend switched the editor into another workspace.
    WorkspaceSwitched { id: i64, title: String },

    /// A whole-workspace mass action ran to completion.
    MassActionCompleted { action: String, processed: u64 },
}

impl ModuleEvent {
    /// Dot-separated event name, e.g. `"pagetree.refresh"`.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PageTreeRefresh => "pagetree.refresh",
            Self::ModuleMenuRefresh => "modulemenu.refresh",
            Self::WorkspaceSwitched { .. } => "workspace.switched",
            Self::MassActionCompleted { .. } => "workspace.mass_action_completed",
        }
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// Envelope delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub event: ModuleEvent,

    /// Workspace the change happened in.
    pub workspace_id: i64,

    /// When the notification was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(workspace_id: i64, event: ModuleEvent) -> Self {
        Self {
            event,
            workspace_id,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use workspaces_events::bus::{EventBus, ModuleEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(1, ModuleEvent::PageTreeRefresh);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is dropped.
    pub fn publish(&self, workspace_id: i64, event: ModuleEvent) {
        tracing::debug!(workspace_id, event_type = event.event_type(), "Publishing module event");
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(Notification::new(workspace_id, event));
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
