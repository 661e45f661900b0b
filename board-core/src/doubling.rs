//! Doubling engine: scales every outstanding total up or down by two

use crate::{
    ledger::BoardCells,
    types::{CellLabel, ChipValue},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a rescale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// total * 2
    Double,
    /// floor(total / 2), only ever used to reverse a double
    Halve,
}

/// Treatment of totals that halve down to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalvePolicy {
    /// Remove zeroed entries so no zero total survives
    #[default]
    Prune,
    /// Keep zeroed entries in place
    Retain,
}

impl FromStr for HalvePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prune" => Ok(HalvePolicy::Prune),
            "retain" => Ok(HalvePolicy::Retain),
            other => Err(Error::Config(format!("Unknown halve policy: {}", other))),
        }
    }
}

impl fmt::Display for HalvePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalvePolicy::Prune => write!(f, "prune"),
            HalvePolicy::Retain => write!(f, "retain"),
        }
    }
}

/// One entry whose total changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rescaled {
    /// Cell label
    pub cell: CellLabel,
    /// Chip value
    pub chip: ChipValue,
    /// Total after the rescale (zero if the entry was pruned)
    pub total: u64,
}

/// Rescale every entry of `cells`.
///
/// Doubling is checked up front: if any total would overflow, nothing changes.
/// Returns the affected entries in (cell, chip) order.
pub fn apply(cells: &mut BoardCells, direction: Direction, policy: HalvePolicy) -> Result<Vec<Rescaled>> {
    if direction == Direction::Double {
        if let Some((cell, chip, _)) = cells.iter().find(|(_, _, total)| total.checked_mul(2).is_none()) {
            return Err(Error::TotalOverflow {
                cell: cell.to_string(),
                chip: chip.get(),
            });
        }
    }

    let mut rescaled = Vec::with_capacity(cells.len());
    for (cell, chips) in cells.cells.iter_mut() {
        for (chip, total) in chips.iter_mut() {
            *total = match direction {
                Direction::Double => *total * 2,
                Direction::Halve => *total / 2,
            };
            rescaled.push(Rescaled {
                cell: cell.clone(),
                chip: *chip,
                total: *total,
            });
        }
    }

    if direction == Direction::Halve && policy == HalvePolicy::Prune {
        for entry in rescaled.iter().filter(|r| r.total == 0) {
            tracing::debug!(cell = %entry.cell, chip = %entry.chip, "Pruning total halved to zero");
            cells.remove(&entry.cell, entry.chip);
        }
    }

    Ok(rescaled)
}
