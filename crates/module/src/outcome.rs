//! Results of user-facing workflow operations.

use workspaces_core::mass_action::MassActionProgress;

/// How a single-shot action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was executed and the listing re-fetched.
    Completed,
    /// The user declined a dialog; nothing was sent.
    Cancelled,
    /// Nothing to do (empty choice or empty selection).
    Skipped,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// How a whole-workspace mass action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MassActionOutcome {
    Completed {
        rounds: u32,
        total: u64,
        processed: u64,
    },
    Cancelled,
    Skipped,
    /// Stopped between rounds by the caller's cancellation token.
    Aborted { progress: Option<MassActionProgress> },
}

impl MassActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
