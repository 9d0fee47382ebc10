use workspaces_core::error::CoreError;
use workspaces_remote::RemoteError;

/// Error type of every workflow operation.
///
/// Wraps [`CoreError`] for programming errors and invalid input, and
/// [`RemoteError`] for transport and per-action failures.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ModuleResult<T> = Result<T, ModuleError>;
