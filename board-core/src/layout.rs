//! Board layout: which chips and cells a session accepts

use crate::{
    config::BoardConfig,
    types::{CellLabel, ChipValue},
    Error, Result,
};
use std::collections::{BTreeSet, HashSet};

/// Outside cells of the single-zero layout
const OUTSIDE_CELLS: [&str; 12] = [
    "1-12", "13-24", "25-36", "1-18", "19-36", "even", "odd", "red", "black", "col1", "col2",
    "col3",
];

/// European single-zero cell labels: "0" to "36" followed by the outside cells
pub fn european_cells() -> Vec<String> {
    (0..=36)
        .map(|n: u8| n.to_string())
        .chain(OUTSIDE_CELLS.iter().map(|s| s.to_string()))
        .collect()
}

/// Accepted denominations and cells for one session
#[derive(Debug, Clone)]
pub struct BoardLayout {
    denominations: BTreeSet<ChipValue>,
    cells: HashSet<CellLabel>,
    strict: bool,
}

impl BoardLayout {
    /// Build from board configuration
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            denominations: config.denominations.iter().copied().map(ChipValue::new).collect(),
            cells: config.cells.iter().map(CellLabel::new).collect(),
            strict: config.strict_validation,
        }
    }

    /// Denominations in ascending order
    pub fn denominations(&self) -> impl Iterator<Item = ChipValue> + '_ {
        self.denominations.iter().copied()
    }

    /// Number of addressable cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether the label names a configured cell
    pub fn contains_cell(&self, cell: &CellLabel) -> bool {
        self.cells.contains(cell)
    }

    /// Validate a chip value.
    ///
    /// A zero chip is refused even when validation is relaxed.
    pub fn check_chip(&self, chip: ChipValue) -> Result<()> {
        if chip.get() == 0 || (self.strict && !self.denominations.contains(&chip)) {
            return Err(Error::InvalidDenomination(chip.get()));
        }
        Ok(())
    }

    /// Validate a cell label
    pub fn check_cell(&self, cell: &CellLabel) -> Result<()> {
        if self.strict && !self.contains_cell(cell) {
            return Err(Error::UnknownCell(cell.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_european_cells() {
        let cells = european_cells();
        assert_eq!(cells.len(), 49);
        assert_eq!(cells[0], "0");
        assert_eq!(cells[36], "36");
        assert!(cells.contains(&"red".to_string()));
    }

    #[test]
    fn test_strict_layout() {
        let layout = BoardLayout::from_config(&BoardConfig::default());
        assert!(layout.check_chip(ChipValue::new(25)).is_ok());
        assert!(matches!(
            layout.check_chip(ChipValue::new(3)),
            Err(Error::InvalidDenomination(3))
        ));
        assert!(layout.check_cell(&CellLabel::new("17")).is_ok());
        assert!(matches!(
            layout.check_cell(&CellLabel::new("37")),
            Err(Error::UnknownCell(_))
        ));
        let chips: Vec<u32> = layout.denominations().map(|c| c.get()).collect();
        assert_eq!(chips, vec![1, 5, 10, 25, 100, 500]);
    }

    #[test]
    fn test_relaxed_layout() {
        let config = BoardConfig {
            strict_validation: false,
            ..BoardConfig::default()
        };
        let layout = BoardLayout::from_config(&config);
        assert!(layout.check_chip(ChipValue::new(3)).is_ok());
        assert!(layout.check_cell(&CellLabel::new("anywhere")).is_ok());
        assert!(layout.check_chip(ChipValue::new(0)).is_err());
    }
}
