//! Random, non-overlapping placement of the standard fleet.

use rand::Rng;

use crate::board::Board;
use crate::common::BoardError;
use crate::config::{fleet_kinds, ship_label, BOARD_SIZE, MAX_PLACEMENT_ATTEMPTS};
use crate::ship::{Orientation, ShipGroup, ShipKind};

/// Returns a random group for `kind` that fits on `board` without overlap.
///
/// Gives up with `UnableToPlaceShip` after `MAX_PLACEMENT_ATTEMPTS` tries.
pub fn random_placement<R: Rng + ?Sized>(
    board: &Board,
    rng: &mut R,
    index: usize,
    kind: ShipKind,
) -> Result<ShipGroup, BoardError> {
    let len = kind.length();
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let orient = if rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let max_r = if orient == Orientation::Vertical {
            BOARD_SIZE as usize - len
        } else {
            BOARD_SIZE as usize - 1
        };
        let max_c = if orient == Orientation::Horizontal {
            BOARD_SIZE as usize - len
        } else {
            BOARD_SIZE as usize - 1
        };
        let r = rng.random_range(0..=max_r);
        let c = rng.random_range(0..=max_c);
        let group = ShipGroup::span(ship_label(index, kind), (r, c), orient, len)?;
        if board.fits(&group) {
            return Ok(group);
        }
    }
    Err(BoardError::UnableToPlaceShip)
}

/// Place the whole fleet catalogue onto `board`.
pub fn place_fleet<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Result<(), BoardError> {
    for (index, kind) in fleet_kinds().enumerate() {
        let group = random_placement(board, rng, index, kind)?;
        board.place_group(group)?;
    }
    Ok(())
}

/// Fresh board with a random fleet.
pub fn random_board<R: Rng + ?Sized>(rng: &mut R) -> Result<Board, BoardError> {
    let mut board = Board::new();
    place_fleet(&mut board, rng)?;
    Ok(board)
}
