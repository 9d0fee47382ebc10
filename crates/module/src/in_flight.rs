//! Per-record guard against overlapping mutations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use workspaces_core::error::CoreError;
use workspaces_core::types::RecordKey;

/// Records currently being mutated.
#[derive(Debug, Default, Clone)]
pub(crate) struct InFlight {
    keys: Arc<Mutex<HashSet<RecordKey>>>,
}

/// Releases its keys when dropped.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    keys: Arc<Mutex<HashSet<RecordKey>>>,
    held: Vec<RecordKey>,
}

impl InFlight {
    /// Claim every key or none. Fails with `Conflict` naming the first key
    /// already claimed by another operation.
    pub(crate) fn acquire(&self, keys: &[RecordKey]) -> Result<InFlightGuard, CoreError> {
        let mut set = self.keys.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(busy) = keys.iter().find(|k| set.contains(*k)) {
            return Err(CoreError::Conflict(format!(
                "Record {busy} has an operation in progress"
            )));
        }

        let mut held = Vec::with_capacity(keys.len());
        for key in keys {
            if set.insert(key.clone()) {
                held.push(key.clone());
            }
        }

        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            held,
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        for key in &self.held {
            set.remove(key);
        }
    }
}
