//! Wire model of the dispatcher RPC protocol.
//!
//! A request body is a JSON array of envelopes
//! `{action, method, data, type: "rpc", tid}`; the response body is a JSON
//! array with one entry per envelope, in request order. The request token
//! is always the last element of `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope `type` of every request.
pub const RPC_TYPE: &str = "rpc";

/// Response entry `type` of a failed call.
pub const EXCEPTION_TYPE: &str = "exception";

/// Backend handler class an action is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handler {
    /// Read-side calls: listing, integrity, details.
    RemoteServer,
    /// Single-record and selection operations, stage windows.
    Actions,
    /// Batched whole-workspace operations.
    MassActions,
}

impl Handler {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoteServer => "RemoteServer",
            Self::Actions => "Actions",
            Self::MassActions => "MassActions",
        }
    }
}

/// Arguments of one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// A single argument object, sent as `[object, token]`.
    Object(Value),
    /// Positional arguments, sent as `[...args, token]`.
    Positional(Vec<Value>),
}

/// One named action to run on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAction {
    pub handler: Handler,
    pub method: String,
    pub arguments: Arguments,
}

impl RemoteAction {
    /// A `RemoteServer` call with one argument object.
    pub fn remote(method: impl Into<String>, payload: impl Serialize) -> Self {
        Self::with_object(Handler::RemoteServer, method, payload)
    }

    /// An `Actions` call with positional arguments.
    pub fn actions(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            handler: Handler::Actions,
            method: method.into(),
            arguments: Arguments::Positional(args),
        }
    }

    /// An `Actions` call with one argument object.
    pub fn actions_object(method: impl Into<String>, payload: impl Serialize) -> Self {
        Self::with_object(Handler::Actions, method, payload)
    }

    /// A `MassActions` call with one argument object.
    pub fn mass(method: impl Into<String>, payload: impl Serialize) -> Self {
        Self::with_object(Handler::MassActions, method, payload)
    }

    fn with_object(handler: Handler, method: impl Into<String>, payload: impl Serialize) -> Self {
        // Serializing plain data structs into a Value cannot fail; fall back
        // to null rather than panicking if a caller passes something exotic.
        let value = serde_json::to_value(payload).unwrap_or(Value::Null);
        Self {
            handler,
            method: method.into(),
            arguments: Arguments::Object(value),
        }
    }

    /// Positional argument list or argument object, as sent (without token).
    pub fn payload(&self) -> Value {
        match &self.arguments {
            Arguments::Object(v) => v.clone(),
            Arguments::Positional(args) => Value::Array(args.clone()),
        }
    }

    /// Build the wire envelope for this action.
    pub fn envelope(&self, token: &str, tid: u64) -> RpcRequest {
        let mut data = match &self.arguments {
            Arguments::Object(v) => vec![v.clone()],
            Arguments::Positional(args) => args.clone(),
        };
        data.push(Value::String(token.to_string()));

        RpcRequest {
            action: self.handler.as_str(),
            method: self.method.clone(),
            data,
            kind: RPC_TYPE,
            tid,
        }
    }
}

/// Serialized request envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub action: &'static str,
    pub method: String,
    pub data: Vec<Value>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tid: u64,
}

/// Raw response entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub tid: Option<u64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of one action within a round-trip.
///
/// A failed action is a value, not a transport error: the other actions in
/// the same round-trip may still have succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub method: String,
    pub result: Value,
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(method: impl Into<String>, result: Value) -> Self {
        Self {
            method: method.into(),
            result,
            error: None,
        }
    }

    pub fn failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            result: Value::Null,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Pair a raw response entry with the method it answers.
    pub fn from_response(method: &str, response: RpcResponse) -> Self {
        if response.kind.as_deref() == Some(EXCEPTION_TYPE) {
            let message = response
                .message
                .unwrap_or_else(|| "Remote action failed".to_string());
            Self::failed(method, message)
        } else {
            Self::ok(method, response.result)
        }
    }
}
