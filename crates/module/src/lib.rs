//! Workspace staging & publication workflow engines.
//!
//! [`WorkspaceModule`] owns the record table and routes typed
//! [`Command`]s to the engines:
//!
//! - [`integrity::IntegrityChecker`]: conflict pre-check before publishing.
//! - [`stage::StageTransitionEngine`]: request/confirm/execute stage moves.
//! - [`selection::SelectionActionEngine`]: actions over the marked records.
//! - [`mass_action::MassActionEngine`]: resumable whole-workspace batches.
//!
//! User decisions go through the [`Interaction`] seam; structural changes
//! are announced on the [`workspaces_events::EventBus`].

pub mod backend;
pub mod config;
mod context;
pub mod error;
mod in_flight;
pub mod integrity;
pub mod interaction;
pub mod mass_action;
pub mod outcome;
pub mod preferences;
pub mod presentation;
pub mod selection;
pub mod stage;

pub use backend::{Command, CommandOutcome, WorkspaceModule};
pub use config::{ModuleConfig, WorkspaceSwitchNotice};
pub use error::{ModuleError, ModuleResult};
pub use interaction::{Interaction, StageForm, Unattended};
pub use outcome::{ActionOutcome, MassActionOutcome};
pub use preferences::{MemoryStore, ModuleDataStore};
