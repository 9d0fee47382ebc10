//! Domain model of the workspace staging & publication workflow.
//!
//! Pure, synchronous building blocks shared by the remote gateway and the
//! module engines: workspace records and their composite keys, browsing
//! settings and paging, the marked selection, the record table with its
//! collection checkbox rules, stage transitions, integrity verdicts and
//! mass-action progress.

pub mod details;
pub mod error;
pub mod integrity;
pub mod mass_action;
pub mod record;
pub mod selection;
pub mod settings;
pub mod stage;
pub mod table;
pub mod types;
