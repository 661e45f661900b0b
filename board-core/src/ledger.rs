//! Bet ledger: the append-only bet log and its derived per-cell totals
//!
//! The bet log is the source of truth. `BoardCells` is a cache keyed by
//! (cell, chip) that must always be re-derivable from the log plus the
//! doubles currently in effect.
//!
//! # Example
//!
//! ```
//! use board_core::{Bet, CellLabel, ChipValue, Ledger};
//!
//! let mut ledger = Ledger::new();
//! ledger.place_bet(Bet::new(1, "25")).unwrap();
//! ledger.place_bet(Bet::new(5, "25")).unwrap();
//! assert_eq!(ledger.cells().get(&CellLabel::new("25"), ChipValue::new(5)), Some(5));
//!
//! let (undone, remaining) = ledger.undo_last_bet().unwrap();
//! assert_eq!(undone, Bet::new(5, "25"));
//! assert_eq!(remaining, None);
//! ```

use crate::{
    doubling::{self, Direction, HalvePolicy},
    types::{Action, Bet, CellLabel, ChipValue},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-cell, per-denomination accumulated totals.
///
/// An entry exists only while its total is nonzero; a cell with no entries
/// is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardCells {
    pub(crate) cells: BTreeMap<CellLabel, BTreeMap<ChipValue, u64>>,
}

impl BoardCells {
    /// Create empty totals
    pub fn new() -> Self {
        Self::default()
    }

    /// Total for one (cell, chip) entry
    pub fn get(&self, cell: &CellLabel, chip: ChipValue) -> Option<u64> {
        self.cells.get(cell).and_then(|chips| chips.get(&chip)).copied()
    }

    /// All entries of one cell
    pub fn cell(&self, cell: &CellLabel) -> Option<&BTreeMap<ChipValue, u64>> {
        self.cells.get(cell)
    }

    /// Iterate entries in (cell, chip) order
    pub fn iter(&self) -> impl Iterator<Item = (&CellLabel, ChipValue, u64)> + '_ {
        self.cells
            .iter()
            .flat_map(|(cell, chips)| chips.iter().map(move |(chip, total)| (cell, *chip, *total)))
    }

    /// Number of (cell, chip) entries
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    /// No entries at all
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sum of every total on the board
    pub fn total_stake(&self) -> u64 {
        self.iter().fold(0u64, |acc, (_, _, total)| acc.saturating_add(total))
    }

    /// Whether any entry holds zero or any cell is empty
    pub fn has_zero_entries(&self) -> bool {
        self.cells
            .values()
            .any(|chips| chips.is_empty() || chips.values().any(|total| *total == 0))
    }

    /// Add `amount` to an entry, returning the new total
    pub fn credit(&mut self, cell: &CellLabel, chip: ChipValue, amount: u64) -> Result<u64> {
        let current = self.get(cell, chip).unwrap_or(0);
        let total = current.checked_add(amount).ok_or_else(|| Error::TotalOverflow {
            cell: cell.to_string(),
            chip: chip.get(),
        })?;

        self.cells.entry(cell.clone()).or_default().insert(chip, total);
        Ok(total)
    }

    /// Subtract `amount` from an entry, pruning it at zero.
    ///
    /// Returns the remaining total, or `None` when the entry was pruned.
    pub fn debit(&mut self, cell: &CellLabel, chip: ChipValue, amount: u64) -> Result<Option<u64>> {
        let current = self.get(cell, chip).ok_or_else(|| {
            Error::InvariantViolation(format!("No total for chip {} on cell {}", chip, cell))
        })?;
        let remaining = current.checked_sub(amount).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "Total {} for chip {} on cell {} is below {}",
                current, chip, cell, amount
            ))
        })?;

        if remaining == 0 {
            self.remove(cell, chip);
            Ok(None)
        } else {
            self.cells.entry(cell.clone()).or_default().insert(chip, remaining);
            Ok(Some(remaining))
        }
    }

    /// Drop one entry and its cell if that leaves it empty
    pub(crate) fn remove(&mut self, cell: &CellLabel, chip: ChipValue) {
        if let Some(chips) = self.cells.get_mut(cell) {
            chips.remove(&chip);
            if chips.is_empty() {
                self.cells.remove(cell);
            }
        }
    }
}

/// Bet log plus derived totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Append-ordered bets
    bets: Vec<Bet>,

    /// Derived totals
    cells: BoardCells,
}

impl Ledger {
    /// Create empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bet and credit its chip to the cell.
    ///
    /// Returns the new total for (cell, chip). Nothing changes on error.
    pub fn place_bet(&mut self, bet: Bet) -> Result<u64> {
        let total = self.cells.credit(&bet.cell, bet.chip, bet.chip.as_total())?;
        self.bets.push(bet);
        Ok(total)
    }

    /// Pop the newest bet and debit its chip from the cell.
    ///
    /// Returns the bet and the remaining total (`None` once pruned).
    pub fn undo_last_bet(&mut self) -> Result<(Bet, Option<u64>)> {
        let bet = self.bets.last().ok_or(Error::EmptyHistory)?;
        let remaining = self.cells.debit(&bet.cell, bet.chip, bet.chip.as_total())?;

        match self.bets.pop() {
            Some(bet) => Ok((bet, remaining)),
            None => Err(Error::EmptyHistory),
        }
    }

    /// Move the whole ledger out, leaving it empty
    pub fn take(&mut self) -> Ledger {
        std::mem::take(self)
    }

    /// Bets in placement order
    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    /// Derived totals
    pub fn cells(&self) -> &BoardCells {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut BoardCells {
        &mut self.cells
    }

    /// Number of recorded bets
    pub fn len(&self) -> usize {
        self.bets.len()
    }

    /// No bets recorded
    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Face-value sum of the bets on (cell, chip), ignoring doubles
    pub fn face_total(&self, cell: &CellLabel, chip: ChipValue) -> u64 {
        self.bets
            .iter()
            .filter(|bet| &bet.cell == cell && bet.chip == chip)
            .map(|bet| bet.chip.as_total())
            .sum()
    }

    /// Rebuild totals by replaying the action log over the bet log.
    ///
    /// Each `Bet` action consumes the next bet; each `Double` doubles every
    /// total accumulated so far.
    pub fn rederive(bets: &[Bet], actions: &[Action]) -> Result<BoardCells> {
        let mut cells = BoardCells::new();
        let mut pending = bets.iter();

        for action in actions {
            match action {
                Action::Bet => {
                    let bet = pending.next().ok_or_else(|| {
                        Error::InvariantViolation("More bet actions than bets".to_string())
                    })?;
                    cells.credit(&bet.cell, bet.chip, bet.chip.as_total())?;
                }
                Action::Double => {
                    doubling::apply(&mut cells, Direction::Double, HalvePolicy::Prune)?;
                }
            }
        }

        if pending.next().is_some() {
            return Err(Error::InvariantViolation(
                "More bets than bet actions".to_string(),
            ));
        }

        Ok(cells)
    }
}
