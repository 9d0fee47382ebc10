//! HTTP implementation of the remote action gateway.
//!
//! Posts action batches to the dispatcher endpoint using [`reqwest`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::gateway::{RemoteActionGateway, RemoteError};
use crate::messages::{ActionResult, RemoteAction, RpcRequest, RpcResponse};

/// HTTP client for one dispatcher endpoint.
pub struct HttpGateway {
    client: reqwest::Client,
    dispatch_url: String,
    token: String,
    next_tid: AtomicU64,
}

impl HttpGateway {
    /// Create a gateway for a dispatcher endpoint.
    ///
    /// * `dispatch_url` - full URL of the dispatcher, e.g.
    ///   `https://cms.example/typo3/ajax/workspace/dispatch`.
    /// * `token` - request token appended to every action's arguments.
    /// * `timeout` - per-request timeout of the underlying HTTP client.
    pub fn new(
        dispatch_url: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, dispatch_url, token))
    }

    /// Create a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, dispatch_url: String, token: String) -> Self {
        Self {
            client,
            dispatch_url,
            token,
            next_tid: AtomicU64::new(1),
        }
    }

    pub fn dispatch_url(&self) -> &str {
        &self.dispatch_url
    }

    /// Build the request body, assigning increasing transaction ids.
    fn envelopes(&self, actions: &[RemoteAction]) -> Vec<RpcRequest> {
        actions
            .iter()
            .map(|action| {
                let tid = self.next_tid.fetch_add(1, Ordering::Relaxed);
                action.envelope(&self.token, tid)
            })
            .collect()
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Pair response entries with the requests they answer.
///
/// The dispatcher must answer every envelope, in order. When it echoes
/// transaction ids they have to match.
pub fn match_responses(
    requests: &[RpcRequest],
    responses: Vec<RpcResponse>,
) -> Result<Vec<ActionResult>, RemoteError> {
    if requests.len() != responses.len() {
        return Err(RemoteError::Protocol(format!(
            "Expected {} results, got {}",
            requests.len(),
            responses.len()
        )));
    }

    requests
        .iter()
        .zip(responses)
        .map(|(request, response)| {
            if let Some(tid) = response.tid {
                if tid != request.tid {
                    return Err(RemoteError::Protocol(format!(
                        "Result for transaction {tid} arrived in place of {}",
                        request.tid
                    )));
                }
            }
            Ok(ActionResult::from_response(&request.method, response))
        })
        .collect()
}

#[async_trait]
impl RemoteActionGateway for HttpGateway {
    async fn send(&self, actions: Vec<RemoteAction>) -> Result<Vec<ActionResult>, RemoteError> {
        if actions.is_empty() {
            return Ok(Vec::new());
        }

        let requests = self.envelopes(&actions);
        let methods: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
        tracing::debug!(url = %self.dispatch_url, ?methods, "Sending remote actions");

        let response = self
            .client
            .post(&self.dispatch_url)
            .json(&requests)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let entries: Vec<RpcResponse> = response.json().await?;

        let results = match_responses(&requests, entries)?;
        for result in results.iter().filter(|r| r.is_error()) {
            tracing::warn!(
                method = %result.method,
                error = result.error.as_deref().unwrap_or_default(),
                "Remote action reported a failure",
            );
        }
        Ok(results)
    }
}
