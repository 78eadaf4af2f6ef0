//! Attack resolution shared by the defending board and the attacker's view.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::board::Grid;
use crate::common::{AttackOutcome, BoardError, Coord};
use crate::ship::ShipGroup;

/// Result of removing one segment from a ship collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strike {
    Hit,
    Sunk(String),
}

/// A collection of live ships that shots can be resolved against.
pub trait ShipSet {
    /// Remove `coord` from whichever ship holds it, dropping the ship once it
    /// has no cells left. Returns `None` when no ship holds `coord`.
    fn take_segment(&mut self, coord: Coord) -> Option<Strike>;

    /// `true` once every ship is gone.
    fn is_fleet_destroyed(&self) -> bool;
}

impl ShipSet for Vec<ShipGroup> {
    fn take_segment(&mut self, coord: Coord) -> Option<Strike> {
        let idx = self.iter().position(|s| s.contains(coord))?;
        self[idx].remove(coord);
        if self[idx].is_sunk() {
            let (label, _) = self.remove(idx).into_parts();
            Some(Strike::Sunk(label))
        } else {
            Some(Strike::Hit)
        }
    }

    fn is_fleet_destroyed(&self) -> bool {
        self.is_empty()
    }
}

/// The opponent's ships as declared at handshake, keyed by label, holding the
/// coordinates we have not hit yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteRegistry {
    ships: BTreeMap<String, Vec<Coord>>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: String, cells: Vec<Coord>) {
        self.ships.insert(label, cells);
    }

    pub fn ships(&self) -> &BTreeMap<String, Vec<Coord>> {
        &self.ships
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }
}

impl From<BTreeMap<String, Vec<Coord>>> for RemoteRegistry {
    fn from(ships: BTreeMap<String, Vec<Coord>>) -> Self {
        Self { ships }
    }
}

impl ShipSet for RemoteRegistry {
    fn take_segment(&mut self, coord: Coord) -> Option<Strike> {
        let (label, cells) = self
            .ships
            .iter_mut()
            .find(|(_, cells)| cells.contains(&coord))?;
        cells.retain(|&c| c != coord);
        if !cells.is_empty() {
            return Some(Strike::Hit);
        }
        let label = label.clone();
        self.ships.remove(&label);
        Some(Strike::Sunk(label))
    }

    fn is_fleet_destroyed(&self) -> bool {
        self.ships.is_empty()
    }
}

/// Resolve a shot at `coord`, mirroring the result into both `grid` and
/// `ships`. A cell already `Hit` or `Miss` yields `AlreadyAttacked` and is left
/// untouched.
pub fn resolve<S: ShipSet + ?Sized>(
    grid: &mut Grid,
    ships: &mut S,
    coord: Coord,
) -> Result<AttackOutcome, BoardError> {
    if grid.is_attacked(coord)? {
        return Ok(AttackOutcome::AlreadyAttacked);
    }
    match ships.take_segment(coord) {
        Some(strike) => {
            grid.mark_hit(coord)?;
            Ok(match strike {
                Strike::Hit => AttackOutcome::Hit,
                Strike::Sunk(label) => AttackOutcome::HitAndSunk(label),
            })
        }
        None => {
            grid.mark_miss(coord)?;
            Ok(AttackOutcome::Miss)
        }
    }
}
