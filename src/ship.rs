//! Ship definitions and the live segment lists tracked per ship.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::common::{BoardError, Coord};
use crate::config::BOARD_SIZE;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Cell `step` positions along this orientation from `origin`.
    pub fn offset(self, origin: Coord, step: usize) -> Coord {
        match self {
            Orientation::Horizontal => (origin.0, origin.1 + step),
            Orientation::Vertical => (origin.0 + step, origin.1),
        }
    }
}

/// Ship types of the fleet catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Destroyer,
}

impl ShipKind {
    /// Name used on the wire and in labels.
    pub const fn name(&self) -> &'static str {
        match self {
            ShipKind::Carrier => "carrier",
            ShipKind::Battleship => "battleship",
            ShipKind::Cruiser => "cruiser",
            ShipKind::Destroyer => "destroyer",
        }
    }

    /// Number of segments.
    pub const fn length(&self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser => 3,
            ShipKind::Destroyer => 2,
        }
    }

    /// Ship type of a given length. Lengths are unique within the catalogue.
    pub fn from_length(length: usize) -> Option<Self> {
        [
            ShipKind::Carrier,
            ShipKind::Battleship,
            ShipKind::Cruiser,
            ShipKind::Destroyer,
        ]
        .into_iter()
        .find(|k| k.length() == length)
    }

    /// Look a ship type up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            ShipKind::Carrier,
            ShipKind::Battleship,
            ShipKind::Cruiser,
            ShipKind::Destroyer,
        ]
        .into_iter()
        .find(|k| k.name() == name)
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One physical ship: a label and the coordinates not hit yet.
///
/// The list is owned by the ship; the board grid is a separate value and the
/// attack resolver keeps both in step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipGroup {
    label: String,
    cells: Vec<Coord>,
}

impl ShipGroup {
    pub fn new(label: String, cells: Vec<Coord>) -> Self {
        Self { label, cells }
    }

    /// Build the straight run of `length` cells starting at `origin`.
    pub fn span(
        label: String,
        origin: Coord,
        orientation: Orientation,
        length: usize,
    ) -> Result<Self, BoardError> {
        if length == 0 {
            return Err(BoardError::EmptyShip);
        }
        let n = BOARD_SIZE as usize;
        let end = orientation.offset(origin, length - 1);
        if end.0 >= n || end.1 >= n {
            return Err(BoardError::OutOfBounds);
        }
        let cells = (0..length).map(|i| orientation.offset(origin, i)).collect();
        Ok(Self { label, cells })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Remaining (unhit) coordinates, in placement order.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    /// Remove `coord` from the remaining cells. Returns `true` if it was present.
    pub fn remove(&mut self, coord: Coord) -> bool {
        match self.cells.iter().position(|&c| c == coord) {
            Some(i) => {
                self.cells.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_sunk(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Coord>) {
        (self.label, self.cells)
    }
}
