//! Action stack: the order in which bets and doubles happened
//!
//! Clears are not recorded here; they are recovered through the snapshot slot.

use crate::types::Action;
use serde::{Deserialize, Serialize};

/// Append-with-pop log of action kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionStack {
    actions: Vec<Action>,
}

impl ActionStack {
    /// Create empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Remove and return the newest action
    pub fn pop(&mut self) -> Option<Action> {
        self.actions.pop()
    }

    /// Newest action without removing it
    pub fn last(&self) -> Option<Action> {
        self.actions.last().copied()
    }

    /// Actions oldest first
    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    /// Number of `Bet` entries
    pub fn bet_count(&self) -> usize {
        self.actions.iter().filter(|a| **a == Action::Bet).count()
    }

    /// Number of recorded actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Nothing recorded
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Move the whole stack out, leaving it empty
    pub fn take(&mut self) -> ActionStack {
        std::mem::take(self)
    }
}
