//! Common types: coordinates, board errors and attack outcomes.

use alloc::string::String;

/// A `(row, col)` position on the board.
pub type Coord = (usize, usize);

/// Outcome of resolving one shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Shot hit a ship that still has segments left.
    Hit,
    /// Shot removed the last segment of a ship, carrying its label.
    HitAndSunk(String),
    /// Shot hit open water.
    Miss,
    /// Cell was already `Hit` or `Miss`; nothing changed.
    AlreadyAttacked,
}

impl AttackOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, AttackOutcome::Hit | AttackOutcome::HitAndSunk(_))
    }
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Coordinate lies outside the grid.
    OutOfBounds,
    /// Ship placement overlaps another ship.
    ShipOverlaps,
    /// A ship needs at least one cell.
    EmptyShip,
    /// Random placement ran out of attempts.
    UnableToPlaceShip,
    /// Ship groups and grid disagree about where ships are.
    Inconsistent,
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::OutOfBounds => write!(f, "Coordinate is outside the board"),
            BoardError::ShipOverlaps => write!(f, "Ship placement overlaps with another ship"),
            BoardError::EmptyShip => write!(f, "Ship has no cells"),
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::Inconsistent => write!(f, "Ship groups do not match the board cells"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoardError {}
