#![cfg(feature = "std")]

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use tokio::sync::watch;

use crate::{
    board::{Cell, Grid},
    common::{AttackOutcome, Coord},
    config::BOARD_SIZE,
    game::{GameEngine, MoveError},
    player::Player,
};

/// How often a waiting prompt checks for an interrupt.
const INPUT_POLL: Duration = Duration::from_millis(200);

/// Human player reading two-digit coordinates (row then column).
///
/// Lines are read on a background thread so a pending prompt can still be
/// abandoned when the interrupt signal fires.
pub struct CliPlayer {
    lines: Receiver<String>,
    interrupt: Option<watch::Receiver<bool>>,
}

impl CliPlayer {
    pub fn new() -> Self {
        Self::with_input(io::BufReader::new(io::stdin()))
    }

    /// Read moves from any buffered source instead of stdin.
    pub fn with_input<R: BufRead + Send + 'static>(input: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            lines: rx,
            interrupt: None,
        }
    }

    /// Give up on the prompt once `interrupt` turns `true`.
    pub fn with_interrupt(mut self, interrupt: watch::Receiver<bool>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Next input line; `None` on end of input or interrupt.
    fn next_line(&mut self) -> Option<String> {
        loop {
            if self.interrupted() {
                return None;
            }
            match self.lines.recv_timeout(INPUT_POLL) {
                Ok(line) => return Some(line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `"23"` as row 2, column 3.
pub fn parse_coord(input: &str) -> Result<Coord, String> {
    let input = input.trim();
    let bytes = input.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err("Enter exactly two digits: row then column (e.g. 23)".to_string());
    }
    let coord = ((bytes[0] - b'0') as usize, (bytes[1] - b'0') as usize);
    if !Grid::in_bounds(coord) {
        return Err(format!(
            "Coordinates must be between 0 and {}",
            BOARD_SIZE - 1
        ));
    }
    Ok(coord)
}

fn coord_to_string(coord: Coord) -> String {
    format!("{}{}", coord.0, coord.1)
}

fn render_cell(cell: Cell, reveal: bool) -> char {
    match cell {
        Cell::ShipPresent if !reveal => Cell::Empty.symbol(),
        other => other.symbol(),
    }
}

/// Both boards side by side: own board on the left, opponent view on the right.
pub fn render_boards(engine: &GameEngine) -> String {
    let n = BOARD_SIZE as usize;
    let width = n * 2 + 2;
    let spacing = " ".repeat(10);
    let mut out = String::new();
    out.push_str(&format!(
        "{:^width$}{}{:^width$}\n",
        "Your board",
        spacing,
        "Opponent board",
        width = width
    ));
    let header: String = (0..n).map(|c| format!(" {}", c)).collect();
    out.push_str(&format!("  {}{}  {}\n", header, spacing, header));
    let own = engine.own_board().grid().rows();
    let view = engine.remote_view().rows();
    for r in 0..n {
        let left: String = own[r]
            .iter()
            .map(|&c| format!(" {}", render_cell(c, true)))
            .collect();
        let right: String = view[r]
            .iter()
            .map(|&c| format!(" {}", render_cell(c, false)))
            .collect();
        out.push_str(&format!("{} {}{}{} {}\n", r, left, spacing, r, right));
    }
    out
}

fn describe(outcome: &AttackOutcome) -> String {
    match outcome {
        AttackOutcome::Hit => "hit!".to_string(),
        AttackOutcome::HitAndSunk(label) => format!("hit, {} sunk!", label),
        AttackOutcome::Miss => "miss.".to_string(),
        AttackOutcome::AlreadyAttacked => "already attacked.".to_string(),
    }
}

impl Player for CliPlayer {
    fn select_target(
        &mut self,
        _rng: &mut SmallRng,
        _view: &Grid,
        _remaining: &[usize],
    ) -> Option<Coord> {
        loop {
            print!("Your turn. Coordinates (e.g. 23 for row 2, column 3), q to quit: ");
            let _ = io::stdout().flush();
            let line = self.next_line()?;
            if line.trim().eq_ignore_ascii_case("q") {
                return None;
            }
            match parse_coord(&line) {
                Ok(coord) => return Some(coord),
                Err(msg) => println!("{}", msg),
            }
        }
    }

    fn reject_target(&mut self, coord: Coord, reason: MoveError) {
        match reason {
            MoveError::AlreadyAttacked => {
                println!("You already attacked {}. Try again.", coord_to_string(coord))
            }
            other => println!("{} rejected: {}", coord_to_string(coord), other),
        }
    }

    fn handle_attack_result(&mut self, coord: Coord, outcome: &AttackOutcome) {
        println!("You fired at {}: {}", coord_to_string(coord), describe(outcome));
    }

    fn handle_incoming_attack(&mut self, coord: Coord, outcome: &AttackOutcome) {
        println!(
            "Opponent fired at {}: {}",
            coord_to_string(coord),
            describe(outcome)
        );
    }

    fn show(&mut self, engine: &GameEngine) {
        println!("{}", render_boards(engine));
    }
}
