use alloc::{format, string::String};

use crate::ship::ShipKind;

pub const BOARD_SIZE: u8 = 10;

/// One line of the fleet catalogue: a ship type and how many of it are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetEntry {
    pub kind: ShipKind,
    pub count: usize,
}

pub const FLEET: [FleetEntry; 4] = [
    FleetEntry { kind: ShipKind::Carrier, count: 1 },
    FleetEntry { kind: ShipKind::Battleship, count: 1 },
    FleetEntry { kind: ShipKind::Cruiser, count: 2 },
    FleetEntry { kind: ShipKind::Destroyer, count: 2 },
];

/// Number of ships in a complete fleet.
pub const NUM_SHIPS: usize = 1 + 1 + 2 + 2;

/// Total number of ship segments used in the standard configuration.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 2 * 3 + 2 * 2;

/// Random placement attempts per ship before giving up.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_SAVE_PATH: &str = "navy_battle_save.json";

/// Ship kinds in placement order, one entry per physical ship.
pub fn fleet_kinds() -> impl Iterator<Item = ShipKind> {
    FLEET
        .iter()
        .flat_map(|entry| core::iter::repeat(entry.kind).take(entry.count))
}

/// Label used to identify ship number `index` of type `kind` in notifications.
pub fn ship_label(index: usize, kind: ShipKind) -> String {
    format!("ship #{} {}", index, kind.name())
}
