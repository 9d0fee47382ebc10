//! The gateway seam between the workflow engines and the backend.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::messages::{ActionResult, RemoteAction};

/// Errors from the remote action layer.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The dispatcher returned a non-2xx status code.
    #[error("Dispatcher error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response did not match the request (count, ids or shape).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A single action reported a failure.
    #[error("Action '{method}' failed: {message}")]
    Action { method: String, message: String },

    /// An action result could not be decoded into the expected type.
    #[error("Failed to decode result of '{method}': {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Sends batches of named actions to the backend.
///
/// One call is one network round-trip. The backend runs the actions in the
/// given order and the results come back in the same order. A transport
/// failure fails the whole batch; a failing action is reported in its
/// [`ActionResult`] instead.
#[async_trait]
pub trait RemoteActionGateway: Send + Sync {
    async fn send(&self, actions: Vec<RemoteAction>) -> Result<Vec<ActionResult>, RemoteError>;
}

/// Send a single action and decode its result.
///
/// A per-action failure is turned into [`RemoteError::Action`].
pub async fn call<T, G>(gateway: &G, action: RemoteAction) -> Result<T, RemoteError>
where
    T: DeserializeOwned,
    G: RemoteActionGateway + ?Sized,
{
    let method = action.method.clone();
    let mut results = gateway.send(vec![action]).await?;
    let result = results.pop().ok_or_else(|| {
        RemoteError::Protocol(format!("No result returned for '{method}'"))
    })?;
    decode(result)
}

/// Decode one action result, surfacing per-action failures as errors.
pub fn decode<T: DeserializeOwned>(result: ActionResult) -> Result<T, RemoteError> {
    if let Some(message) = result.error {
        return Err(RemoteError::Action {
            method: result.method,
            message,
        });
    }
    serde_json::from_value(result.result).map_err(|source| RemoteError::Decode {
        method: result.method,
        source,
    })
}
