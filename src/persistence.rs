//! Save and restore a running session so an interrupted game can resume
//! without a new fleet exchange.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    attack::RemoteRegistry,
    board::{Board, Cell, Grid},
    common::Coord,
    config::{BOARD_SIZE, DEFAULT_SAVE_PATH},
    game::GameState,
    ship::ShipGroup,
};

const N: usize = BOARD_SIZE as usize;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("cannot access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot is inconsistent: {0}")]
    Malformed(String),
}

/// On-disk shape of a saved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player_board: Vec<Vec<char>>,
    pub opponent_board: Vec<Vec<char>>,
    pub player_ships: Vec<Vec<Coord>>,
    /// Labels for `player_ships`, index for index. Older saves lack them.
    #[serde(default)]
    pub player_ship_labels: Vec<String>,
    pub opponent_ships: BTreeMap<String, Vec<Coord>>,
    pub is_player_turn: bool,
}

fn grid_to_symbols(grid: &Grid) -> Vec<Vec<char>> {
    grid.rows()
        .iter()
        .map(|row| row.iter().map(|c| c.symbol()).collect())
        .collect()
}

fn grid_from_symbols(rows: &[Vec<char>], name: &str) -> Result<Grid, PersistenceError> {
    if rows.len() != N || rows.iter().any(|r| r.len() != N) {
        return Err(PersistenceError::Malformed(format!(
            "{} must be {}x{}",
            name, N, N
        )));
    }
    let mut cells = [[Cell::Empty; N]; N];
    for (r, row) in rows.iter().enumerate() {
        for (c, &ch) in row.iter().enumerate() {
            cells[r][c] = Cell::from_symbol(ch).ok_or_else(|| {
                PersistenceError::Malformed(format!("{} has unknown symbol {:?}", name, ch))
            })?;
        }
    }
    Ok(Grid::from_rows(cells))
}

impl From<&GameState> for Snapshot {
    fn from(state: &GameState) -> Self {
        let ships = state.own_board.ships();
        Snapshot {
            player_board: grid_to_symbols(state.own_board.grid()),
            opponent_board: grid_to_symbols(&state.remote_view),
            player_ships: ships.iter().map(|s| s.cells().to_vec()).collect(),
            player_ship_labels: ships.iter().map(|s| s.label().to_string()).collect(),
            opponent_ships: state.remote_ships.ships().clone(),
            is_player_turn: state.local_turn,
        }
    }
}

impl TryFrom<Snapshot> for GameState {
    type Error = PersistenceError;

    fn try_from(snap: Snapshot) -> Result<Self, Self::Error> {
        let own_grid = grid_from_symbols(&snap.player_board, "player_board")?;
        let remote_view = grid_from_symbols(&snap.opponent_board, "opponent_board")?;
        if remote_view.count(Cell::ShipPresent) > 0 {
            return Err(PersistenceError::Malformed(
                "opponent_board reveals ship cells".into(),
            ));
        }
        let labels_usable = snap.player_ship_labels.len() == snap.player_ships.len();
        let ships = snap
            .player_ships
            .into_iter()
            .enumerate()
            .map(|(i, cells)| {
                let label = if labels_usable {
                    snap.player_ship_labels[i].clone()
                } else {
                    format!("ship #{}", i)
                };
                ShipGroup::new(label, cells)
            })
            .collect();
        let own_board = Board::from_parts(own_grid, ships)
            .map_err(|e| PersistenceError::Malformed(format!("player_ships: {}", e)))?;
        // Every registry cell must still be shootable, or that ship can never sink.
        let mut claimed = HashSet::new();
        for (label, cells) in snap.opponent_ships.iter() {
            if cells.is_empty() || cells.iter().any(|&c| !Grid::in_bounds(c)) {
                return Err(PersistenceError::Malformed(format!(
                    "opponent ship {:?} has bad coordinates",
                    label
                )));
            }
            for &coord in cells.iter() {
                if remote_view.cell_at(coord).map_or(true, Cell::is_attacked) {
                    return Err(PersistenceError::Malformed(format!(
                        "opponent ship {:?} lists {:?}, which was already attacked",
                        label, coord
                    )));
                }
                if !claimed.insert(coord) {
                    return Err(PersistenceError::Malformed(format!(
                        "opponent coordinate {:?} belongs to more than one ship",
                        coord
                    )));
                }
            }
        }
        Ok(GameState {
            own_board,
            remote_view,
            remote_ships: RemoteRegistry::from(snap.opponent_ships),
            local_turn: snap.is_player_turn,
        })
    }
}

/// A snapshot file at a fixed location.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Write `state`, replacing any earlier snapshot at this location.
    pub fn save(&self, state: &GameState) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(&Snapshot::from(state))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        log::info!("saved game to {}", self.path.display());
        Ok(())
    }

    /// Read the snapshot. A missing file means "start fresh" and yields `None`.
    pub fn load(&self) -> Result<Option<GameState>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        let snap: Snapshot = serde_json::from_slice(&bytes)?;
        GameState::try_from(snap).map(Some)
    }

    /// Remove the snapshot after a finished game. A missing file is fine.
    pub fn delete(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("removed save file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}
