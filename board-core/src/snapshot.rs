//! Single-slot snapshot store used to undo a clear
//!
//! Only the most recent clear is recoverable: saving overwrites the slot and
//! restoring empties it.

use crate::{actions::ActionStack, ledger::Ledger};
use serde::{Deserialize, Serialize};

/// Saved copy of the ledger and action stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bets and totals at the time of the clear
    pub ledger: Ledger,

    /// Action order at the time of the clear
    pub actions: ActionStack,
}

impl Snapshot {
    /// Newest action before the snapshot was taken
    pub fn last_action(&self) -> Option<crate::types::Action> {
        self.actions.last()
    }
}

/// At-most-one snapshot slot
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    slot: Option<Snapshot>,
}

impl SnapshotStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot, replacing any previous one
    pub fn save(&mut self, ledger: Ledger, actions: ActionStack) {
        if self.slot.is_some() {
            tracing::debug!("Overwriting pending snapshot");
        }
        self.slot = Some(Snapshot { ledger, actions });
    }

    /// Consume the snapshot, if any
    pub fn take(&mut self) -> Option<Snapshot> {
        self.slot.take()
    }

    /// Whether a snapshot is waiting to be restored
    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// Inspect the pending snapshot
    pub fn peek(&self) -> Option<&Snapshot> {
        self.slot.as_ref()
    }
}
