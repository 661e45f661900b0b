//! Betting board core
//!
//! Bet ledger and undo state machine for a roulette-style betting layout.
//!
//! # Architecture
//!
//! - **Bet log**: Append-ordered bets are the source of truth
//! - **Derived totals**: Per-cell, per-chip totals are a cache over the log
//! - **Action stack**: Records whether each step was a bet or a double
//! - **Snapshot slot**: One saved board so the last clear can be undone
//! - **Display adapter**: Rendering is pushed outward, never queried
//!
//! # Invariants
//!
//! - Every `Bet` action pairs with exactly one bet in the log
//! - Totals replay from the bet log plus the doubles in effect
//! - No zero-valued entry or empty cell survives an operation
//! - Every operation applies fully or not at all

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod ledger;
pub mod actions;
pub mod snapshot;
pub mod doubling;
pub mod undo;
pub mod display;
pub mod layout;
pub mod session;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{Action, Bet, CellLabel, ChipValue};
pub use ledger::{BoardCells, Ledger};
pub use display::{DisplayAdapter, DisplayEvent, RecordingDisplay, StackTotal};
pub use undo::UndoOutcome;
pub use session::BettingSession;
pub use config::Config;
