use core::fmt;

use crate::{
    attack::{self, RemoteRegistry, ShipSet},
    board::{Board, Cell, Grid},
    common::{AttackOutcome, BoardError, Coord},
};

/// Which side of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Own fleet placed, opponent layout not known yet.
    AwaitingFleetExchange,
    ActivePlay { local_turn: bool },
    GameOver { winner: Side },
}

/// Current status of a game, seen from the local side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// Reasons a shot is refused by the state machine. Nothing is mutated when
/// one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfBounds,
    AlreadyAttacked,
    OutOfTurn,
    NotStarted,
    AlreadyStarted,
    GameOver,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfBounds => write!(f, "coordinate is outside the board"),
            MoveError::AlreadyAttacked => write!(f, "that cell was already attacked"),
            MoveError::OutOfTurn => write!(f, "not this side's turn"),
            MoveError::NotStarted => write!(f, "fleet exchange has not completed"),
            MoveError::AlreadyStarted => write!(f, "fleet exchange already completed"),
            MoveError::GameOver => write!(f, "the game is over"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MoveError {}

impl From<BoardError> for MoveError {
    fn from(_: BoardError) -> Self {
        MoveError::OutOfBounds
    }
}

/// Whole session state, as saved and restored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub own_board: Board,
    pub remote_view: Grid,
    pub remote_ships: RemoteRegistry,
    pub local_turn: bool,
}

/// Turn-by-turn state machine holding the own board and the view of the
/// opponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEngine {
    own_board: Board,
    remote_view: Grid,
    remote_ships: RemoteRegistry,
    phase: Phase,
}

impl GameEngine {
    /// Engine for a freshly placed fleet, waiting for the opponent's layout.
    pub fn new(own_board: Board) -> Self {
        Self {
            own_board,
            remote_view: Grid::new(),
            remote_ships: RemoteRegistry::new(),
            phase: Phase::AwaitingFleetExchange,
        }
    }

    /// Complete the fleet exchange and enter active play.
    pub fn begin(&mut self, remote_ships: RemoteRegistry, first_mover: bool) -> Result<(), MoveError> {
        if self.phase != Phase::AwaitingFleetExchange {
            return Err(MoveError::AlreadyStarted);
        }
        self.remote_ships = remote_ships;
        self.phase = Phase::ActivePlay {
            local_turn: first_mover,
        };
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn own_board(&self) -> &Board {
        &self.own_board
    }

    /// Mutable access for manual placement before the exchange.
    pub fn own_board_mut(&mut self) -> &mut Board {
        &mut self.own_board
    }

    pub fn remote_view(&self) -> &Grid {
        &self.remote_view
    }

    pub fn remote_ships(&self) -> &RemoteRegistry {
        &self.remote_ships
    }

    pub fn is_local_turn(&self) -> bool {
        matches!(self.phase, Phase::ActivePlay { local_turn: true })
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    /// Shots resolved so far by both sides.
    pub fn turns_played(&self) -> usize {
        let own = self.own_board.grid();
        own.count(Cell::Hit)
            + own.count(Cell::Miss)
            + self.remote_view.count(Cell::Hit)
            + self.remote_view.count(Cell::Miss)
    }

    /// Check a local target before anything is sent.
    pub fn validate_target(&self, coord: Coord) -> Result<(), MoveError> {
        match self.phase {
            Phase::AwaitingFleetExchange => return Err(MoveError::NotStarted),
            Phase::GameOver { .. } => return Err(MoveError::GameOver),
            Phase::ActivePlay { local_turn: false } => return Err(MoveError::OutOfTurn),
            Phase::ActivePlay { local_turn: true } => {}
        }
        if self.remote_view.is_attacked(coord)? {
            return Err(MoveError::AlreadyAttacked);
        }
        Ok(())
    }

    /// Record our own shot against the opponent's declared fleet.
    pub fn apply_local_attack(&mut self, coord: Coord) -> Result<AttackOutcome, MoveError> {
        self.validate_target(coord)?;
        let outcome = attack::resolve(&mut self.remote_view, &mut self.remote_ships, coord)?;
        self.phase = if self.remote_ships.is_fleet_destroyed() {
            Phase::GameOver {
                winner: Side::Local,
            }
        } else {
            Phase::ActivePlay { local_turn: false }
        };
        Ok(outcome)
    }

    /// Apply the opponent's shot to our own board.
    pub fn apply_remote_attack(&mut self, coord: Coord) -> Result<AttackOutcome, MoveError> {
        match self.phase {
            Phase::AwaitingFleetExchange => return Err(MoveError::NotStarted),
            Phase::GameOver { .. } => return Err(MoveError::GameOver),
            Phase::ActivePlay { local_turn: true } => return Err(MoveError::OutOfTurn),
            Phase::ActivePlay { local_turn: false } => {}
        }
        let outcome = self.own_board.receive_attack(coord)?;
        if outcome == AttackOutcome::AlreadyAttacked {
            return Err(MoveError::AlreadyAttacked);
        }
        self.phase = if self.own_board.is_fleet_destroyed() {
            Phase::GameOver {
                winner: Side::Remote,
            }
        } else {
            Phase::ActivePlay { local_turn: true }
        };
        Ok(outcome)
    }

    /// Evaluate the current game status.
    pub fn status(&self) -> GameStatus {
        match self.phase {
            Phase::GameOver {
                winner: Side::Local,
            } => GameStatus::Won,
            Phase::GameOver {
                winner: Side::Remote,
            } => GameStatus::Lost,
            _ => GameStatus::InProgress,
        }
    }

    /// Lengths of opponent ships not reported sunk yet.
    pub fn remote_lengths_remaining(&self) -> alloc::vec::Vec<usize> {
        self.remote_ships
            .ships()
            .keys()
            .filter_map(|label| label.rsplit(' ').next())
            .filter_map(crate::ship::ShipKind::from_name)
            .map(|k| k.length())
            .collect()
    }

    /// Snapshot of the current state. `None` before the fleet exchange.
    pub fn state(&self) -> Option<GameState> {
        let local_turn = match self.phase {
            Phase::AwaitingFleetExchange => return None,
            Phase::ActivePlay { local_turn } => local_turn,
            Phase::GameOver { winner } => winner == Side::Remote,
        };
        Some(GameState {
            own_board: self.own_board.clone(),
            remote_view: self.remote_view,
            remote_ships: self.remote_ships.clone(),
            local_turn,
        })
    }

    /// Restore an engine from a previously saved state, skipping the exchange.
    pub fn from_state(state: GameState) -> Self {
        let phase = if state.remote_ships.is_fleet_destroyed() {
            Phase::GameOver {
                winner: Side::Local,
            }
        } else if state.own_board.is_fleet_destroyed() {
            Phase::GameOver {
                winner: Side::Remote,
            }
        } else {
            Phase::ActivePlay {
                local_turn: state.local_turn,
            }
        };
        Self {
            own_board: state.own_board,
            remote_view: state.remote_view,
            remote_ships: state.remote_ships,
            phase,
        }
    }
}
