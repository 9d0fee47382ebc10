use serde::Deserialize;

use crate::error::ModuleError;

/// Default page size of the listing.
const DEFAULT_PAGE_LIMIT: u64 = 30;

/// Default HTTP request timeout towards the dispatcher.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Workspace switch performed by the backend before the module loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceSwitchNotice {
    pub id: i64,
    pub title: String,
}

/// Module configuration, injected at construction.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    /// Workspace being browsed.
    pub workspace_id: i64,
    /// Full URL of the dispatcher endpoint.
    pub dispatch_url: String,
    /// Request token appended to every remote action.
    pub token: String,
    /// Listing page size.
    pub page_limit: u64,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Whether the current user may access the workspace listing at all.
    pub workspace_accessible: bool,
    /// Set when the backend switched workspaces on the way in.
    pub workspace_switch: Option<WorkspaceSwitchNotice>,
}

impl ModuleConfig {
    pub fn new(workspace_id: i64, dispatch_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            workspace_id,
            dispatch_url: dispatch_url.into(),
            token: token.into(),
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            workspace_accessible: true,
            workspace_switch: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `WORKSPACE_ID`         | --      |
    /// | `DISPATCH_URL`         | --      |
    /// | `DISPATCH_TOKEN`       | empty   |
    /// | `PAGE_LIMIT`           | `30`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`    |
    /// | `WORKSPACE_SWITCH`     | unset; JSON `{"id": .., "title": ..}` |
    pub fn from_env() -> Result<Self, ModuleError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ModuleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let workspace_id = required(&var, "WORKSPACE_ID")?
            .trim()
            .parse::<i64>()
            .map_err(|_| ModuleError::Config("WORKSPACE_ID must be an integer".into()))?;
        let dispatch_url = required(&var, "DISPATCH_URL")?;
        let token = var("DISPATCH_TOKEN").unwrap_or_default();

        let page_limit = parsed(&var, "PAGE_LIMIT", DEFAULT_PAGE_LIMIT)?;
        if page_limit == 0 {
            return Err(ModuleError::Config("PAGE_LIMIT must be at least 1".into()));
        }
        let request_timeout_secs =
            parsed(&var, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        let workspace_switch = match var("WORKSPACE_SWITCH").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
                ModuleError::Config(format!("WORKSPACE_SWITCH is not valid JSON: {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            workspace_id,
            dispatch_url,
            token,
            page_limit,
            request_timeout_secs,
            workspace_accessible: true,
            workspace_switch,
        })
    }
}

fn required<F: Fn(&str) -> Option<String>>(var: &F, key: &str) -> Result<String, ModuleError> {
    var(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ModuleError::Config(format!("{key} must be set")))
}

fn parsed<F: Fn(&str) -> Option<String>>(
    var: &F,
    key: &str,
    default: u64,
) -> Result<u64, ModuleError> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ModuleError::Config(format!("{key} must be a valid u64"))),
        None => Ok(default),
    }
}
