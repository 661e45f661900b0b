//! Terminal front end for a betting session
//!
//! Reads one command per line from stdin:
//!
//! ```text
//! chip <value>           pick up a chip
//! bet <cell>             place the held chip
//! bet <value> <cell>     place a chip of <value>
//! undo | double | clear
//! outside                click outside the board
//! show | metrics | help | quit
//! ```

use anyhow::Context;
use board_core::{
    BettingSession, BoardCells, CellLabel, ChipValue, Config, DisplayAdapter, RecordingDisplay,
};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Chip(u32),
    Bet { chip: Option<u32>, cell: String },
    Undo,
    Double,
    Clear,
    Outside,
    Show,
    Metrics,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let command = match parts.as_slice() {
            ["chip", value] => Command::Chip(value.parse().context("chip value")?),
            ["bet", cell] => Command::Bet {
                chip: None,
                cell: cell.to_string(),
            },
            ["bet", value, cell] => Command::Bet {
                chip: Some(value.parse().context("chip value")?),
                cell: cell.to_string(),
            },
            ["undo"] => Command::Undo,
            ["double"] => Command::Double,
            ["clear"] => Command::Clear,
            ["outside"] => Command::Outside,
            ["show"] => Command::Show,
            ["metrics"] => Command::Metrics,
            ["help"] | ["?"] => Command::Help,
            ["quit"] | ["exit"] => Command::Quit,
            _ => anyhow::bail!("unrecognised command: {}", line.trim()),
        };
        Ok(command)
    }
}

/// Plain-text renderer
#[derive(Debug, Default)]
struct TextDisplay;

impl DisplayAdapter for TextDisplay {
    fn chip_placed(&mut self, cell: &CellLabel, chip: ChipValue, cell_total: u64) {
        println!("+ {} on {} (stack {})", chip, cell, cell_total);
    }

    fn chip_removed(&mut self, cell: &CellLabel, chip: ChipValue, remaining: Option<u64>) {
        match remaining {
            Some(total) => println!("- {} off {} (stack {})", chip, cell, total),
            None => println!("- {} off {} (stack gone)", chip, cell),
        }
    }

    fn all_chips_cleared(&mut self) {
        println!("board cleared");
    }

    fn cell_total_rescaled(&mut self, cell: &CellLabel, chip: ChipValue, total: u64) {
        println!("~ {} stack of {} now {}", cell, chip, total);
    }
}

/// Output mode chosen by `BOARD_OUTPUT`
#[derive(Debug)]
enum Output {
    Text(TextDisplay),
    Json(RecordingDisplay),
}

impl DisplayAdapter for Output {
    fn chip_placed(&mut self, cell: &CellLabel, chip: ChipValue, cell_total: u64) {
        match self {
            Output::Text(d) => d.chip_placed(cell, chip, cell_total),
            Output::Json(d) => d.chip_placed(cell, chip, cell_total),
        }
    }

    fn chip_removed(&mut self, cell: &CellLabel, chip: ChipValue, remaining: Option<u64>) {
        match self {
            Output::Text(d) => d.chip_removed(cell, chip, remaining),
            Output::Json(d) => d.chip_removed(cell, chip, remaining),
        }
    }

    fn all_chips_cleared(&mut self) {
        match self {
            Output::Text(d) => d.all_chips_cleared(),
            Output::Json(d) => d.all_chips_cleared(),
        }
    }

    fn cell_total_rescaled(&mut self, cell: &CellLabel, chip: ChipValue, total: u64) {
        match self {
            Output::Text(d) => d.cell_total_rescaled(cell, chip, total),
            Output::Json(d) => d.cell_total_rescaled(cell, chip, total),
        }
    }

    fn full_redraw_requested(&mut self, bets: &[board_core::Bet], totals: &BoardCells) {
        match self {
            Output::Text(d) => d.full_redraw_requested(bets, totals),
            Output::Json(d) => d.full_redraw_requested(bets, totals),
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = match std::env::var("BOARD_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("loading {}", path))?
            .with_env_overrides()?,
        Err(_) => Config::from_env()?,
    };
    Ok(config)
}

fn print_board(session: &BettingSession<Output>) {
    if session.cells().is_empty() {
        println!("(empty board)");
    }
    for (cell, chip, total) in session.cells().iter() {
        println!("{:>6} | chip {:>4} | {}", cell, chip, total);
    }
    println!(
        "stake {} | bets {} | held chip {} | clear pending {}",
        session.total_stake(),
        session.bets().len(),
        session
            .selected_chip()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
        session.has_pending_snapshot()
    );
}

/// Run one line; returns false once the session should end
fn handle(session: &mut BettingSession<Output>, line: &str) -> anyhow::Result<bool> {
    let command: Command = match line.parse() {
        Ok(command) => command,
        Err(e) => {
            println!("{:#} (try 'help')", e);
            return Ok(true);
        }
    };

    let result = match command {
        Command::Chip(value) => session.select_chip(value).map(|_| ()),
        Command::Bet { chip: Some(value), cell } => session.place_bet(value, cell.as_str()).map(|_| ()),
        Command::Bet { chip: None, cell } => session.place_selected(cell.as_str()).map(|_| ()),
        Command::Undo => session.undo().map(|outcome| tracing::debug!(?outcome, "Undo")),
        Command::Double => session.double().map(|_| ()),
        Command::Clear => session.clear().map(|_| ()),
        Command::Outside => {
            if session.outside_click() {
                println!("chip dropped");
            }
            Ok(())
        }
        Command::Show => {
            print_board(session);
            Ok(())
        }
        Command::Metrics => {
            print!("{}", session.metrics().render()?);
            Ok(())
        }
        Command::Help => {
            println!("chip <v> | bet [<v>] <cell> | undo | double | clear | outside | show | metrics | quit");
            Ok(())
        }
        Command::Quit => return Ok(false),
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_benign() => tracing::debug!("Ignored: {}", e),
        Err(e) => {
            tracing::warn!("Rejected: {}", e);
            println!("rejected: {}", e);
        }
    }

    if let Output::Json(recorder) = session.display_mut() {
        for event in recorder.drain() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    let output = match std::env::var("BOARD_OUTPUT").as_deref() {
        Ok("json") => Output::Json(RecordingDisplay::new()),
        _ => Output::Text(TextDisplay),
    };

    let mut session = BettingSession::new(config, output)?;
    tracing::info!(session = %session.session_id(), "Board ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => {
                        if !handle(&mut session, &line)? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!(
        session = %session.session_id(),
        stake = session.total_stake(),
        "Shutting down board"
    );
    Ok(())
}
