//! Betting session: one board, owned by the caller
//!
//! The session ties together the ledger, action stack, snapshot slot,
//! doubling engine and undo coordination, and pushes every visible change to
//! its display adapter. Each operation runs to completion synchronously and
//! either applies fully or leaves the session untouched.

use crate::{
    actions::ActionStack,
    config::Config,
    display::DisplayAdapter,
    doubling::{self, Direction},
    layout::BoardLayout,
    ledger::{BoardCells, Ledger},
    metrics::Metrics,
    snapshot::SnapshotStore,
    types::{Action, Bet, CellLabel, ChipValue},
    undo::{plan_undo, UndoOutcome, UndoStep, UndoThrottle},
    Error, Result,
};
use std::time::Instant;
use uuid::Uuid;

/// Interactive betting session
#[derive(Debug)]
pub struct BettingSession<D> {
    /// Session identifier (UUIDv7, used in logs)
    id: Uuid,

    /// Configuration
    config: Config,

    /// Accepted chips and cells
    layout: BoardLayout,

    /// Bets and totals
    ledger: Ledger,

    /// Order of bets and doubles
    actions: ActionStack,

    /// Board saved by the last clear
    snapshots: SnapshotStore,

    /// Chip the user is holding
    selected: Option<ChipValue>,

    /// Undo cooldown gate
    throttle: UndoThrottle,

    /// Renderer
    display: D,

    /// Session metrics
    metrics: Metrics,
}

impl<D: DisplayAdapter> BettingSession<D> {
    /// Start a session with an empty board
    pub fn new(config: Config, display: D) -> Result<Self> {
        config.validate()?;

        let id = Uuid::now_v7();
        let layout = BoardLayout::from_config(&config.board);
        let throttle = UndoThrottle::new(config.undo.cooldown());
        let metrics = Metrics::new()?;

        tracing::info!(
            session = %id,
            cells = layout.cell_count(),
            halve_policy = %config.doubling.halve_policy,
            undo_cooldown_ms = throttle.cooldown().as_millis() as u64,
            "Betting session started"
        );

        Ok(Self {
            id,
            config,
            layout,
            ledger: Ledger::new(),
            actions: ActionStack::new(),
            snapshots: SnapshotStore::new(),
            selected: None,
            throttle,
            display,
            metrics,
        })
    }

    /// Pick up a chip
    pub fn select_chip(&mut self, value: u32) -> Result<ChipValue> {
        let chip = ChipValue::new(value);
        self.layout.check_chip(chip)?;
        self.selected = Some(chip);
        tracing::debug!(session = %self.id, chip = %chip, "Chip selected");
        Ok(chip)
    }

    /// Put the held chip down, returning it
    pub fn deselect_chip(&mut self) -> Option<ChipValue> {
        self.selected.take()
    }

    /// Chip currently held
    pub fn selected_chip(&self) -> Option<ChipValue> {
        self.selected
    }

    /// A click landed outside the board.
    ///
    /// Returns true if the held chip was dropped.
    pub fn outside_click(&mut self) -> bool {
        if !self.config.selection.deselect_on_outside_click {
            return false;
        }
        self.deselect_chip().is_some()
    }

    /// Place one chip of `value` on `cell`, returning the new stack total
    pub fn place_bet(&mut self, value: u32, cell: impl Into<CellLabel>) -> Result<u64> {
        let chip = ChipValue::new(value);
        let cell = cell.into();
        self.layout.check_chip(chip)?;
        self.layout.check_cell(&cell)?;

        let bet = Bet { chip, cell };
        let total = self.ledger.place_bet(bet.clone())?;
        self.actions.push(Action::Bet);
        self.display.chip_placed(&bet.cell, bet.chip, total);

        self.metrics.bets_placed.inc();
        self.refresh_stake();
        tracing::info!(session = %self.id, cell = %bet.cell, chip = %bet.chip, total, "Bet placed");
        Ok(total)
    }

    /// Place the held chip on `cell`
    pub fn place_selected(&mut self, cell: impl Into<CellLabel>) -> Result<u64> {
        let chip = self.selected.ok_or(Error::NoChipSelected)?;
        self.place_bet(chip.get(), cell)
    }

    /// Double every outstanding total, returning the number of stacks changed.
    ///
    /// The bet log keeps its face values; only the totals change.
    pub fn double(&mut self) -> Result<usize> {
        if self.ledger.is_empty() {
            tracing::debug!(session = %self.id, "Double ignored, no bets");
            return Err(Error::EmptyHistory);
        }

        let policy = self.config.doubling.halve_policy;
        let rescaled = doubling::apply(self.ledger.cells_mut(), Direction::Double, policy)?;
        for entry in &rescaled {
            self.display.cell_total_rescaled(&entry.cell, entry.chip, entry.total);
        }
        self.actions.push(Action::Double);

        self.metrics.doubles.inc();
        self.refresh_stake();
        tracing::info!(session = %self.id, stacks = rescaled.len(), "Bets doubled");
        Ok(rescaled.len())
    }

    /// Clear the board, keeping it recoverable by the next undo.
    ///
    /// Returns the number of bets cleared.
    pub fn clear(&mut self) -> Result<usize> {
        if self.ledger.is_empty() {
            tracing::debug!(session = %self.id, "Clear ignored, no bets");
            return Err(Error::EmptyHistory);
        }

        let cleared = self.ledger.len();
        self.snapshots.save(self.ledger.take(), self.actions.take());
        self.display.all_chips_cleared();

        self.metrics.clears.inc();
        self.refresh_stake();
        tracing::info!(session = %self.id, bets = cleared, "Board cleared");
        Ok(cleared)
    }

    /// Undo one step now
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        self.undo_at(Instant::now())
    }

    /// Undo one step, treating `now` as the request time
    pub fn undo_at(&mut self, now: Instant) -> Result<UndoOutcome> {
        if !self.throttle.try_acquire(now) {
            self.metrics.undo_throttled.inc();
            tracing::debug!(
                session = %self.id,
                retry_after_ms = self.throttle.retry_after(now).as_millis() as u64,
                "Undo dropped by cooldown"
            );
            return Ok(UndoOutcome::Throttled);
        }

        match plan_undo(self.snapshots.is_pending(), self.actions.last()) {
            UndoStep::RestoreSnapshot => {
                self.restore_if_present()?;
                Ok(UndoOutcome::RestoredSnapshot)
            }
            UndoStep::ReverseDouble => {
                self.reverse_double()?;
                Ok(UndoOutcome::ReversedDouble)
            }
            UndoStep::RemoveBet => {
                let bet = self.remove_last_bet()?;
                Ok(UndoOutcome::RemovedBet(bet))
            }
            UndoStep::Nothing => {
                tracing::debug!(session = %self.id, "Nothing to undo");
                Err(Error::EmptyHistory)
            }
        }
    }

    /// Bring back the board saved by the last clear and redraw it
    pub fn restore_if_present(&mut self) -> Result<()> {
        let snapshot = self.snapshots.take().ok_or(Error::NoSnapshot)?;
        let doubled_last = snapshot.last_action() == Some(Action::Double);

        self.ledger = snapshot.ledger;
        self.actions = snapshot.actions;
        self.display
            .full_redraw_requested(self.ledger.bets(), self.ledger.cells());

        self.metrics.snapshot_restores.inc();
        self.refresh_stake();
        tracing::info!(
            session = %self.id,
            bets = self.ledger.len(),
            doubled_last,
            "Cleared board restored"
        );
        Ok(())
    }

    fn reverse_double(&mut self) -> Result<()> {
        let policy = self.config.doubling.halve_policy;
        let rescaled = doubling::apply(self.ledger.cells_mut(), Direction::Halve, policy)?;
        self.actions.pop();
        for entry in &rescaled {
            self.display.cell_total_rescaled(&entry.cell, entry.chip, entry.total);
        }

        self.metrics.doubles_reversed.inc();
        self.refresh_stake();
        tracing::info!(session = %self.id, stacks = rescaled.len(), "Double reversed");
        Ok(())
    }

    fn remove_last_bet(&mut self) -> Result<Bet> {
        let (bet, remaining) = self.ledger.undo_last_bet()?;
        self.actions.pop();
        self.display.chip_removed(&bet.cell, bet.chip, remaining);

        self.metrics.bets_undone.inc();
        self.refresh_stake();
        tracing::info!(session = %self.id, cell = %bet.cell, chip = %bet.chip, ?remaining, "Bet undone");
        Ok(bet)
    }

    fn refresh_stake(&self) {
        self.metrics.set_total_stake(self.ledger.cells().total_stake());
    }

    /// Check the totals cache against the bet and action logs
    pub fn verify(&self) -> Result<()> {
        let bet_actions = self.actions.bet_count();
        if bet_actions != self.ledger.len() {
            return Err(Error::InvariantViolation(format!(
                "{} bet actions for {} bets",
                bet_actions,
                self.ledger.len()
            )));
        }

        let expected = Ledger::rederive(self.ledger.bets(), self.actions.as_slice())?;
        if &expected != self.ledger.cells() {
            return Err(Error::InvariantViolation(
                "Cell totals differ from replayed bet log".to_string(),
            ));
        }

        if self.ledger.cells().has_zero_entries() {
            return Err(Error::InvariantViolation(
                "Zero-valued entry on the board".to_string(),
            ));
        }

        Ok(())
    }

    /// Session identifier
    pub fn session_id(&self) -> Uuid {
        self.id
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accepted chips and cells
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Bets in placement order
    pub fn bets(&self) -> &[Bet] {
        self.ledger.bets()
    }

    /// Current totals
    pub fn cells(&self) -> &BoardCells {
        self.ledger.cells()
    }

    /// Face-value sum of the bets on (cell, chip), ignoring doubles
    pub fn face_total(&self, cell: &CellLabel, chip: ChipValue) -> u64 {
        self.ledger.face_total(cell, chip)
    }

    /// Recorded actions, oldest first
    pub fn actions(&self) -> &[Action] {
        self.actions.as_slice()
    }

    /// Sum of every total on the board
    pub fn total_stake(&self) -> u64 {
        self.ledger.cells().total_stake()
    }

    /// Whether the next undo will restore a cleared board
    pub fn has_pending_snapshot(&self) -> bool {
        self.snapshots.is_pending()
    }

    /// Session metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Display adapter
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Display adapter, mutably
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayEvent, RecordingDisplay, StackTotal};
    use std::time::Duration;

    fn session() -> BettingSession<RecordingDisplay> {
        let mut config = Config::default();
        config.undo.cooldown_ms = 0;
        BettingSession::new(config, RecordingDisplay::new()).unwrap()
    }

    fn cell(label: &str) -> CellLabel {
        CellLabel::new(label)
    }

    fn total(session: &BettingSession<RecordingDisplay>, label: &str, chip: u32) -> Option<u64> {
        session.cells().get(&cell(label), ChipValue::new(chip))
    }

    #[test]
    fn test_place_bet_notifies() {
        let mut session = session();
        assert_eq!(session.place_bet(5, "25").unwrap(), 5);
        assert_eq!(session.place_bet(5, "25").unwrap(), 10);

        assert_eq!(
            session.display().events().last(),
            Some(&DisplayEvent::ChipPlaced {
                cell: cell("25"),
                chip: ChipValue::new(5),
                total: 10,
            })
        );
        assert_eq!(session.actions(), &[Action::Bet, Action::Bet]);
        assert_eq!(session.metrics().bets_placed.get(), 2);
        assert_eq!(session.metrics().total_stake.get(), 10);
        session.verify().unwrap();
    }

    #[test]
    fn test_place_bet_rejects_invalid_input() {
        let mut session = session();
        assert!(matches!(session.place_bet(3, "25"), Err(Error::InvalidDenomination(3))));
        assert!(matches!(session.place_bet(5, "99"), Err(Error::UnknownCell(_))));
        assert!(session.bets().is_empty());
        assert!(session.actions().is_empty());
        assert!(session.display().events().is_empty());
    }

    #[test]
    fn test_select_and_place() {
        let mut session = session();
        assert!(matches!(session.place_selected("1"), Err(Error::NoChipSelected)));
        assert!(session.select_chip(7).is_err());
        assert_eq!(session.selected_chip(), None);

        session.select_chip(25).unwrap();
        assert_eq!(session.place_selected("red").unwrap(), 25);
        assert_eq!(session.place_selected("red").unwrap(), 50);
        assert_eq!(session.selected_chip(), Some(ChipValue::new(25)));
    }

    #[test]
    fn test_outside_click_configurable() {
        let mut session = session();
        session.select_chip(10).unwrap();
        assert!(session.outside_click());
        assert_eq!(session.selected_chip(), None);
        assert!(!session.outside_click());

        let mut config = Config::default();
        config.selection.deselect_on_outside_click = false;
        let mut sticky = BettingSession::new(config, RecordingDisplay::new()).unwrap();
        sticky.select_chip(10).unwrap();
        assert!(!sticky.outside_click());
        assert_eq!(sticky.selected_chip(), Some(ChipValue::new(10)));
    }

    #[test]
    fn test_double_and_reverse() {
        let mut session = session();
        session.place_bet(1, "36").unwrap();
        session.place_bet(25, "red").unwrap();
        session.display_mut().drain();

        assert_eq!(session.double().unwrap(), 2);
        assert_eq!(total(&session, "36", 1), Some(2));
        assert_eq!(total(&session, "red", 25), Some(50));
        assert_eq!(session.display().events().len(), 2);
        assert_eq!(session.bets().len(), 2);
        session.verify().unwrap();

        assert_eq!(session.undo().unwrap(), UndoOutcome::ReversedDouble);
        assert_eq!(total(&session, "36", 1), Some(1));
        assert_eq!(total(&session, "red", 25), Some(25));
        assert_eq!(session.bets().len(), 2);
        assert_eq!(session.actions(), &[Action::Bet, Action::Bet]);
        session.verify().unwrap();
    }

    #[test]
    fn test_double_and_clear_on_empty_board() {
        let mut session = session();
        assert!(matches!(session.double(), Err(Error::EmptyHistory)));
        assert!(matches!(session.clear(), Err(Error::EmptyHistory)));
        assert!(matches!(session.undo(), Err(Error::EmptyHistory)));
        assert!(!session.has_pending_snapshot());
        assert!(session.actions().is_empty());
        assert!(session.display().events().is_empty());
    }

    #[test]
    fn test_undo_bet_reports_remaining() {
        let mut session = session();
        session.place_bet(5, "7").unwrap();
        session.place_bet(5, "7").unwrap();

        assert_eq!(session.undo().unwrap(), UndoOutcome::RemovedBet(Bet::new(5, "7")));
        assert_eq!(
            session.display().events().last(),
            Some(&DisplayEvent::ChipRemoved {
                cell: cell("7"),
                chip: ChipValue::new(5),
                remaining: Some(5),
            })
        );

        session.undo().unwrap();
        assert_eq!(
            session.display().events().last(),
            Some(&DisplayEvent::ChipRemoved {
                cell: cell("7"),
                chip: ChipValue::new(5),
                remaining: None,
            })
        );
        assert!(session.cells().is_empty());
        assert_eq!(session.total_stake(), 0);
    }

    #[test]
    fn test_clear_then_restore() {
        let mut session = session();
        session.place_bet(1, "36").unwrap();
        session.double().unwrap();
        session.place_bet(5, "36").unwrap();
        let bets = session.bets().to_vec();
        let cells = session.cells().clone();

        assert_eq!(session.clear().unwrap(), 2);
        assert!(session.bets().is_empty());
        assert!(session.cells().is_empty());
        assert!(session.actions().is_empty());
        assert!(session.has_pending_snapshot());
        assert_eq!(session.display().events().last(), Some(&DisplayEvent::AllChipsCleared));

        assert_eq!(session.undo().unwrap(), UndoOutcome::RestoredSnapshot);
        assert_eq!(session.bets(), bets.as_slice());
        assert_eq!(session.cells(), &cells);
        assert_eq!(session.actions(), &[Action::Bet, Action::Double, Action::Bet]);
        assert!(!session.has_pending_snapshot());
        assert_eq!(
            session.display().events().last(),
            Some(&DisplayEvent::FullRedraw {
                bets,
                totals: StackTotal::list(&cells),
            })
        );
        session.verify().unwrap();
    }

    #[test]
    fn test_snapshot_takes_priority_over_new_bets() {
        let mut session = session();
        session.place_bet(1, "1").unwrap();
        session.clear().unwrap();
        session.place_bet(5, "2").unwrap();

        assert_eq!(session.undo().unwrap(), UndoOutcome::RestoredSnapshot);
        assert_eq!(session.bets(), &[Bet::new(1, "1")]);
    }

    #[test]
    fn test_restore_without_snapshot() {
        let mut session = session();
        assert!(matches!(session.restore_if_present(), Err(Error::NoSnapshot)));
    }

    #[test]
    fn test_undo_cooldown() {
        let mut config = Config::default();
        config.undo.cooldown_ms = 150;
        let mut session = BettingSession::new(config, RecordingDisplay::new()).unwrap();
        session.place_bet(1, "1").unwrap();
        session.place_bet(1, "2").unwrap();
        session.place_bet(1, "3").unwrap();

        let start = Instant::now();
        assert!(matches!(session.undo_at(start).unwrap(), UndoOutcome::RemovedBet(_)));
        assert_eq!(
            session.undo_at(start + Duration::from_millis(20)).unwrap(),
            UndoOutcome::Throttled
        );
        assert_eq!(
            session.undo_at(start + Duration::from_millis(140)).unwrap(),
            UndoOutcome::Throttled
        );
        assert_eq!(session.bets().len(), 2);
        assert_eq!(session.metrics().undo_throttled.get(), 2);

        assert!(matches!(
            session.undo_at(start + Duration::from_millis(150)).unwrap(),
            UndoOutcome::RemovedBet(_)
        ));
        assert_eq!(session.bets().len(), 1);
    }

    #[test]
    fn test_relaxed_validation_trusts_caller() {
        let mut config = Config::default();
        config.board.strict_validation = false;
        let mut session = BettingSession::new(config, RecordingDisplay::new()).unwrap();
        assert_eq!(session.place_bet(3, "split 1/2").unwrap(), 3);
        assert!(matches!(session.place_bet(0, "1"), Err(Error::InvalidDenomination(0))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.board.denominations.clear();
        assert!(matches!(
            BettingSession::new(config, RecordingDisplay::new()),
            Err(Error::Config(_))
        ));
    }
}
