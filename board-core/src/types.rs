//! Core types for the betting board
//!
//! All types are designed for:
//! - Cheap cloning into snapshots
//! - Deterministic ordering (BTreeMap keys)
//! - Serialization for display events (serde)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chip denomination (face value of one chip)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChipValue(u32);

impl ChipValue {
    /// Create new chip value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Face value
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Face value widened for total arithmetic
    pub fn as_total(&self) -> u64 {
        u64::from(self.0)
    }
}

impl From<u32> for ChipValue {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ChipValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one betting position on the board ("25", "red", "col1")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellLabel(String);

impl CellLabel {
    /// Create new cell label
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CellLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl fmt::Display for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One atomic placement: a single chip put on a single cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bet {
    /// Chip face value
    pub chip: ChipValue,

    /// Target cell
    pub cell: CellLabel,
}

impl Bet {
    /// Create new bet
    pub fn new(chip: u32, cell: impl Into<CellLabel>) -> Self {
        Self {
            chip: ChipValue::new(chip),
            cell: cell.into(),
        }
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.chip, self.cell)
    }
}

/// Kind of a reversible high-level action, in the order it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// A chip was placed (pairs with the newest bet in the log)
    Bet,
    /// All outstanding totals were doubled
    Double,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Bet => write!(f, "bet"),
            Action::Double => write!(f, "double"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_display() {
        let bet = Bet::new(5, "25");
        assert_eq!(bet.to_string(), "5 on 25");
        assert_eq!(bet.chip.as_total(), 5);
    }

    #[test]
    fn test_bet_serializes_flat() {
        let bet = Bet::new(10, "red");
        let json = serde_json::to_string(&bet).unwrap();
        assert_eq!(json, r#"{"chip":10,"cell":"red"}"#);
        assert_eq!(serde_json::to_string(&Action::Double).unwrap(), r#""double""#);
    }
}
