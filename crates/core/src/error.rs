use crate::types::RecordKey;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Record not found: {0}")]
    NotFound(RecordKey),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// An action name that no handler knows. Raised for unknown mass,
    /// selection or pagination actions; never a user-recoverable state.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A stage move in a direction the record has no neighbour for.
    #[error("Invalid stage transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
