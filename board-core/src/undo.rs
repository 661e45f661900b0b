//! Undo coordination
//!
//! Every undo request makes one single-step decision:
//!
//! 1. A pending snapshot is restored first (undo of a clear).
//! 2. Otherwise the newest action is reversed: a `Double` halves every
//!    total, a `Bet` pops the newest bet.
//! 3. With nothing recorded the request is a no-op.
//!
//! Requests arriving inside the cooldown window of the last accepted one are
//! dropped before any of this runs.

use crate::types::{Action, Bet};
use std::time::{Duration, Instant};

/// What an undo request will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStep {
    /// Restore the snapshot saved by the last clear
    RestoreSnapshot,
    /// Halve every total to reverse the newest double
    ReverseDouble,
    /// Pop the newest bet
    RemoveBet,
    /// Nothing to undo
    Nothing,
}

/// Decide the undo step from the snapshot slot and the newest action
pub fn plan_undo(snapshot_pending: bool, last_action: Option<Action>) -> UndoStep {
    if snapshot_pending {
        return UndoStep::RestoreSnapshot;
    }

    match last_action {
        Some(Action::Double) => UndoStep::ReverseDouble,
        Some(Action::Bet) => UndoStep::RemoveBet,
        None => UndoStep::Nothing,
    }
}

/// Result of an accepted or dropped undo request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The cleared board came back
    RestoredSnapshot,
    /// The newest double was reversed
    ReversedDouble,
    /// The newest bet was removed
    RemovedBet(Bet),
    /// Dropped by the cooldown window
    Throttled,
}

/// Cooldown gate on undo requests
#[derive(Debug, Clone)]
pub struct UndoThrottle {
    /// Window after an accepted request during which others are dropped
    cooldown: Duration,

    /// When the last request was accepted
    last_accepted: Option<Instant>,
}

impl UndoThrottle {
    /// Create new throttle
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// Accept the request at `now` unless it falls inside the cooldown window
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if now < last + self.cooldown {
                return false;
            }
        }

        self.last_accepted = Some(now);
        true
    }

    /// Time left before the next request is accepted
    pub fn retry_after(&self, now: Instant) -> Duration {
        match self.last_accepted {
            Some(last) => (last + self.cooldown).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Configured cooldown
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
