//! Display adapter contract
//!
//! The session never reads visual state. It pushes notifications to a
//! `DisplayAdapter`, each carrying everything needed to render the change.

use crate::{
    ledger::BoardCells,
    types::{Bet, CellLabel, ChipValue},
};
use serde::{Deserialize, Serialize};

/// Receiver of ledger change notifications
pub trait DisplayAdapter {
    /// One chip was drawn on a cell; `cell_total` is the new stack total
    fn chip_placed(&mut self, cell: &CellLabel, chip: ChipValue, cell_total: u64);

    /// One chip was taken off; `remaining` is `None` once the stack is gone
    fn chip_removed(&mut self, cell: &CellLabel, chip: ChipValue, remaining: Option<u64>);

    /// Every chip left the board
    fn all_chips_cleared(&mut self);

    /// A stack's displayed total changed without chips moving (double/halve)
    fn cell_total_rescaled(&mut self, cell: &CellLabel, chip: ChipValue, total: u64);

    /// Rebuild the whole board.
    ///
    /// The default clears the board, replays every bet in order through
    /// `chip_placed`, then refreshes each stack whose replayed total differs
    /// from the final one (stacks that were doubled).
    fn full_redraw_requested(&mut self, bets: &[Bet], totals: &BoardCells) {
        self.all_chips_cleared();

        let mut replayed = BoardCells::new();
        for bet in bets {
            let running = replayed
                .credit(&bet.cell, bet.chip, bet.chip.as_total())
                .unwrap_or_else(|e| {
                    tracing::warn!(cell = %bet.cell, chip = %bet.chip, "Redraw replay saturated: {}", e);
                    u64::MAX
                });
            self.chip_placed(&bet.cell, bet.chip, running);
        }

        for (cell, chip, total) in totals.iter() {
            if replayed.get(cell, chip) != Some(total) {
                self.cell_total_rescaled(cell, chip, total);
            }
        }
    }
}

impl<T: DisplayAdapter + ?Sized> DisplayAdapter for Box<T> {
    fn chip_placed(&mut self, cell: &CellLabel, chip: ChipValue, cell_total: u64) {
        (**self).chip_placed(cell, chip, cell_total)
    }

    fn chip_removed(&mut self, cell: &CellLabel, chip: ChipValue, remaining: Option<u64>) {
        (**self).chip_removed(cell, chip, remaining)
    }

    fn all_chips_cleared(&mut self) {
        (**self).all_chips_cleared()
    }

    fn cell_total_rescaled(&mut self, cell: &CellLabel, chip: ChipValue, total: u64) {
        (**self).cell_total_rescaled(cell, chip, total)
    }

    fn full_redraw_requested(&mut self, bets: &[Bet], totals: &BoardCells) {
        (**self).full_redraw_requested(bets, totals)
    }
}

/// A notification as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// See [`DisplayAdapter::chip_placed`]
    ChipPlaced {
        /// Cell label
        cell: CellLabel,
        /// Chip value
        chip: ChipValue,
        /// New stack total
        total: u64,
    },
    /// See [`DisplayAdapter::chip_removed`]
    ChipRemoved {
        /// Cell label
        cell: CellLabel,
        /// Chip value
        chip: ChipValue,
        /// Remaining stack total
        remaining: Option<u64>,
    },
    /// See [`DisplayAdapter::all_chips_cleared`]
    AllChipsCleared,
    /// See [`DisplayAdapter::cell_total_rescaled`]
    CellTotalRescaled {
        /// Cell label
        cell: CellLabel,
        /// Chip value
        chip: ChipValue,
        /// New stack total
        total: u64,
    },
    /// See [`DisplayAdapter::full_redraw_requested`]
    FullRedraw {
        /// Bets in placement order
        bets: Vec<Bet>,
        /// Final totals, one entry per stack
        totals: Vec<StackTotal>,
    },
}

/// One stack's total as carried by [`DisplayEvent::FullRedraw`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTotal {
    /// Cell label
    pub cell: CellLabel,
    /// Chip value
    pub chip: ChipValue,
    /// Stack total
    pub total: u64,
}

impl StackTotal {
    /// Flatten board totals in (cell, chip) order
    pub fn list(totals: &BoardCells) -> Vec<StackTotal> {
        totals
            .iter()
            .map(|(cell, chip, total)| StackTotal {
                cell: cell.clone(),
                chip,
                total,
            })
            .collect()
    }
}

/// Adapter that records every notification
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    events: Vec<DisplayEvent>,
}

impl RecordingDisplay {
    /// Create empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// Hand over recorded events and start afresh
    pub fn drain(&mut self) -> Vec<DisplayEvent> {
        std::mem::take(&mut self.events)
    }
}

impl DisplayAdapter for RecordingDisplay {
    fn chip_placed(&mut self, cell: &CellLabel, chip: ChipValue, cell_total: u64) {
        self.events.push(DisplayEvent::ChipPlaced {
            cell: cell.clone(),
            chip,
            total: cell_total,
        });
    }

    fn chip_removed(&mut self, cell: &CellLabel, chip: ChipValue, remaining: Option<u64>) {
        self.events.push(DisplayEvent::ChipRemoved {
            cell: cell.clone(),
            chip,
            remaining,
        });
    }

    fn all_chips_cleared(&mut self) {
        self.events.push(DisplayEvent::AllChipsCleared);
    }

    fn cell_total_rescaled(&mut self, cell: &CellLabel, chip: ChipValue, total: u64) {
        self.events.push(DisplayEvent::CellTotalRescaled {
            cell: cell.clone(),
            chip,
            total,
        });
    }

    fn full_redraw_requested(&mut self, bets: &[Bet], totals: &BoardCells) {
        self.events.push(DisplayEvent::FullRedraw {
            bets: bets.to_vec(),
            totals: StackTotal::list(totals),
        });
    }
}
