//! Remote action gateway for the workspace dispatcher endpoint.
//!
//! Provides the typed action/envelope model of the RPC wire format, the
//! [`RemoteActionGateway`] seam the engines talk to, and an HTTP
//! implementation built on [`reqwest`].

pub mod api;
pub mod gateway;
pub mod messages;

pub use api::HttpGateway;
pub use gateway::{call, RemoteActionGateway, RemoteError};
pub use messages::{ActionResult, Handler, RemoteAction};
