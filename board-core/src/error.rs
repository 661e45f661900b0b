//! Error types for the betting board

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, Error>;

/// Board errors
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing recorded to undo, double or clear
    #[error("No bets recorded")]
    EmptyHistory,

    /// Restore attempted with an empty snapshot slot
    #[error("No snapshot to restore")]
    NoSnapshot,

    /// Chip value is not one of the configured denominations
    #[error("Invalid denomination: {0}")]
    InvalidDenomination(u32),

    /// Cell label does not exist on the board
    #[error("Unknown cell: {0}")]
    UnknownCell(String),

    /// Placement of the selected chip with no chip selected
    #[error("No chip selected")]
    NoChipSelected,

    /// A cell total would exceed the representable range
    #[error("Total overflow on cell {cell} for chip {chip}")]
    TotalOverflow {
        /// Cell label
        cell: String,
        /// Chip value
        chip: u32,
    },

    /// Invariant violation (cache out of sync with the bet log, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Benign errors are silent no-ops that leave the session untouched
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::EmptyHistory | Error::NoSnapshot)
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
