//! Structural-change notifications for the workspace module.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ModuleEvent`]: what changed (page tree, module menu, workspace).
//! - [`Notification`]: the envelope delivered to subscribers.

pub mod bus;

pub use bus::{EventBus, ModuleEvent, Notification};
