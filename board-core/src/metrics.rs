//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for a betting session.
//!
//! # Metrics
//!
//! - `board_bets_placed_total` - Chips placed
//! - `board_bets_undone_total` - Chips removed by undo
//! - `board_doubles_total` - Doubles applied
//! - `board_doubles_reversed_total` - Doubles reversed by undo
//! - `board_clears_total` - Board clears
//! - `board_snapshot_restores_total` - Clears undone
//! - `board_undo_throttled_total` - Undo requests dropped by the cooldown
//! - `board_total_stake` - Sum of all totals on the board

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Chips placed
    pub bets_placed: IntCounter,

    /// Chips removed by undo
    pub bets_undone: IntCounter,

    /// Doubles applied
    pub doubles: IntCounter,

    /// Doubles reversed
    pub doubles_reversed: IntCounter,

    /// Board clears
    pub clears: IntCounter,

    /// Snapshot restores
    pub snapshot_restores: IntCounter,

    /// Dropped undo requests
    pub undo_throttled: IntCounter,

    /// Current stake on the board
    pub total_stake: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let counter = |name: &str, help: &str| -> prometheus::Result<IntCounter> {
            let counter = IntCounter::new(name, help)?;
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        };

        let bets_placed = counter("board_bets_placed_total", "Chips placed")?;
        let bets_undone = counter("board_bets_undone_total", "Chips removed by undo")?;
        let doubles = counter("board_doubles_total", "Doubles applied")?;
        let doubles_reversed = counter("board_doubles_reversed_total", "Doubles reversed by undo")?;
        let clears = counter("board_clears_total", "Board clears")?;
        let snapshot_restores = counter("board_snapshot_restores_total", "Clears undone")?;
        let undo_throttled = counter(
            "board_undo_throttled_total",
            "Undo requests dropped by the cooldown",
        )?;

        let total_stake = IntGauge::new("board_total_stake", "Sum of all totals on the board")?;
        registry.register(Box::new(total_stake.clone()))?;

        Ok(Self {
            bets_placed,
            bets_undone,
            doubles,
            doubles_reversed,
            clears,
            snapshot_restores,
            undo_throttled,
            total_stake,
            registry,
        })
    }

    /// Update the stake gauge
    pub fn set_total_stake(&self, stake: u64) {
        self.total_stake.set(i64::try_from(stake).unwrap_or(i64::MAX));
    }

    /// Text exposition of every metric
    pub fn render(&self) -> crate::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::Error::Metrics(e.to_string()))
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("bets_placed", &self.bets_placed.get())
            .field("bets_undone", &self.bets_undone.get())
            .field("doubles", &self.doubles.get())
            .field("clears", &self.clears.get())
            .field("total_stake", &self.total_stake.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.bets_placed.get(), 0);
        assert_eq!(metrics.total_stake.get(), 0);
    }

    #[test]
    fn test_independent_registries() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.bets_placed.inc();
        assert_eq!(first.bets_placed.get(), 1);
        assert_eq!(second.bets_placed.get(), 0);
    }

    #[test]
    fn test_stake_gauge_saturates() {
        let metrics = Metrics::new().unwrap();
        metrics.set_total_stake(42);
        assert_eq!(metrics.total_stake.get(), 42);
        metrics.set_total_stake(u64::MAX);
        assert_eq!(metrics.total_stake.get(), i64::MAX);
    }

    #[test]
    fn test_render() {
        let metrics = Metrics::new().unwrap();
        metrics.clears.inc();
        let text = metrics.render().unwrap();
        assert!(text.contains("board_clears_total 1"));
        assert!(text.contains("board_undo_throttled_total 0"));
    }
}
