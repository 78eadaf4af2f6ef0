//! Game board state: a cell grid plus the live ship groups.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::attack::{self, ShipSet};
use crate::common::{AttackOutcome, BoardError, Coord};
use crate::config::BOARD_SIZE;
use crate::ship::ShipGroup;

const N: usize = BOARD_SIZE as usize;

/// State of one board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    ShipPresent,
    Hit,
    Miss,
}

impl Cell {
    /// One-character symbol used in snapshots and on screen.
    pub const fn symbol(self) -> char {
        match self {
            Cell::Empty => '~',
            Cell::ShipPresent => 'S',
            Cell::Hit => 'X',
            Cell::Miss => 'O',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '~' => Some(Cell::Empty),
            'S' => Some(Cell::ShipPresent),
            'X' => Some(Cell::Hit),
            'O' => Some(Cell::Miss),
            _ => None,
        }
    }

    pub fn is_attacked(self) -> bool {
        matches!(self, Cell::Hit | Cell::Miss)
    }
}

/// N×N grid of cells, used both for the own board and the remote view.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cells: [[Cell; N]; N],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; N]; N],
        }
    }

    pub fn from_rows(cells: [[Cell; N]; N]) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> &[[Cell; N]; N] {
        &self.cells
    }

    pub fn in_bounds(coord: Coord) -> bool {
        coord.0 < N && coord.1 < N
    }

    pub fn cell_at(&self, coord: Coord) -> Result<Cell, BoardError> {
        if !Self::in_bounds(coord) {
            return Err(BoardError::OutOfBounds);
        }
        Ok(self.cells[coord.0][coord.1])
    }

    /// Whether a shot already landed at `coord`.
    pub fn is_attacked(&self, coord: Coord) -> Result<bool, BoardError> {
        Ok(self.cell_at(coord)?.is_attacked())
    }

    /// Unconditional write. Callers must not re-mark an attacked cell.
    pub fn mark_hit(&mut self, coord: Coord) -> Result<(), BoardError> {
        self.set(coord, Cell::Hit)
    }

    /// Unconditional write. Callers must not re-mark an attacked cell.
    pub fn mark_miss(&mut self, coord: Coord) -> Result<(), BoardError> {
        self.set(coord, Cell::Miss)
    }

    pub(crate) fn set(&mut self, coord: Coord, cell: Cell) -> Result<(), BoardError> {
        if !Self::in_bounds(coord) {
            return Err(BoardError::OutOfBounds);
        }
        self.cells[coord.0][coord.1] = cell;
        Ok(())
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == cell)
            .count()
    }

    /// Coordinates not attacked yet, row-major.
    pub fn unattacked(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..N)
            .flat_map(|r| (0..N).map(move |c| (r, c)))
            .filter(move |&(r, c)| !self.cells[r][c].is_attacked())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for cell in row.iter() {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A side's own board: grid plus live ship groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    ships: Vec<ShipGroup>,
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board from a grid and its live groups, checking that every
    /// group cell is marked `ShipPresent` and that groups do not overlap.
    pub fn from_parts(grid: Grid, ships: Vec<ShipGroup>) -> Result<Self, BoardError> {
        let mut seen: Vec<Coord> = Vec::new();
        for ship in ships.iter() {
            if ship.is_sunk() {
                return Err(BoardError::EmptyShip);
            }
            for &coord in ship.cells() {
                if grid.cell_at(coord)? != Cell::ShipPresent {
                    return Err(BoardError::Inconsistent);
                }
                if seen.contains(&coord) {
                    return Err(BoardError::ShipOverlaps);
                }
                seen.push(coord);
            }
        }
        if grid.count(Cell::ShipPresent) != seen.len() {
            return Err(BoardError::Inconsistent);
        }
        Ok(Self { grid, ships })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ships(&self) -> &[ShipGroup] {
        &self.ships
    }

    /// Place a ship on the given cells.
    pub fn place_ship(&mut self, label: String, coords: Vec<Coord>) -> Result<(), BoardError> {
        if coords.is_empty() {
            return Err(BoardError::EmptyShip);
        }
        for (i, &coord) in coords.iter().enumerate() {
            if self.grid.cell_at(coord)? != Cell::Empty || coords[..i].contains(&coord) {
                return Err(BoardError::ShipOverlaps);
            }
        }
        for &coord in coords.iter() {
            self.grid.set(coord, Cell::ShipPresent)?;
        }
        self.ships.push(ShipGroup::new(label, coords));
        Ok(())
    }

    /// Place an already-built group (see [`ShipGroup::span`]).
    pub fn place_group(&mut self, group: ShipGroup) -> Result<(), BoardError> {
        let (label, coords) = group.into_parts();
        self.place_ship(label, coords)
    }

    /// Whether every cell of `group` is currently empty.
    pub fn fits(&self, group: &ShipGroup) -> bool {
        group
            .cells()
            .iter()
            .all(|&c| self.grid.cell_at(c) == Ok(Cell::Empty))
    }

    pub fn mark_hit(&mut self, coord: Coord) -> Result<(), BoardError> {
        self.grid.mark_hit(coord)
    }

    pub fn mark_miss(&mut self, coord: Coord) -> Result<(), BoardError> {
        self.grid.mark_miss(coord)
    }

    /// Returns `true` when no live ship group is left.
    pub fn is_fleet_destroyed(&self) -> bool {
        self.ships.is_fleet_destroyed()
    }

    /// Resolve an incoming shot against this board.
    pub fn receive_attack(&mut self, coord: Coord) -> Result<AttackOutcome, BoardError> {
        attack::resolve(&mut self.grid, &mut self.ships, coord)
    }
}
