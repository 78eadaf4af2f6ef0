//! Wire messages: the fleet layout exchanged once at session start and the
//! two-digit shot sent on every turn.

use std::collections::HashSet;
use std::string::{String, ToString};
use std::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{
    attack::RemoteRegistry,
    board::{Board, Grid},
    common::Coord,
    config::{ship_label, BOARD_SIZE, NUM_SHIPS, TOTAL_SHIP_CELLS},
    ship::ShipKind,
};

/// Errors raised while encoding or decoding protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid shot message {0:?}: expected two decimal digits")]
    InvalidShot(String),
    #[error("malformed fleet layout: {0}")]
    MalformedLayout(String),
    #[error("fleet layout is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },
    #[error("empty frame")]
    EmptyFrame,
}

/// Connection role. The listener binds and accepts; the initiator connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Listener,
    Initiator,
}

impl Role {
    /// The listener always takes the first shot.
    pub fn first_mover(self) -> bool {
        matches!(self, Role::Listener)
    }
}

/// One ship as declared to the peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipRecord {
    #[serde(rename = "type")]
    pub kind: ShipKind,
    pub coordinates: Vec<Coord>,
}

/// A whole fleet as declared to the peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FleetLayout(pub Vec<ShipRecord>);

impl FleetLayout {
    /// Describe an untouched board. Ship types are recovered from group
    /// lengths, which are unique per type in the catalogue.
    pub fn from_board(board: &Board) -> Result<Self, ProtocolError> {
        board
            .ships()
            .iter()
            .map(|ship| {
                let kind = ShipKind::from_length(ship.cells().len()).ok_or_else(|| {
                    ProtocolError::MalformedLayout(std::format!(
                        "{} has {} cells, matching no ship type",
                        ship.label(),
                        ship.cells().len()
                    ))
                })?;
                Ok(ShipRecord {
                    kind,
                    coordinates: ship.cells().to_vec(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FleetLayout)
    }

    pub fn records(&self) -> &[ShipRecord] {
        &self.0
    }

    /// Structural checks on a received layout: record and cell counts, bounds,
    /// and no cell claimed twice.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.0.len() != NUM_SHIPS {
            return Err(ProtocolError::MalformedLayout(std::format!(
                "expected {} ships, got {}",
                NUM_SHIPS,
                self.0.len()
            )));
        }
        let mut seen = HashSet::new();
        for (i, record) in self.0.iter().enumerate() {
            if record.coordinates.is_empty() {
                return Err(ProtocolError::MalformedLayout(std::format!(
                    "ship {} has no coordinates",
                    i
                )));
            }
            for &coord in record.coordinates.iter() {
                if !Grid::in_bounds(coord) {
                    return Err(ProtocolError::MalformedLayout(std::format!(
                        "ship {} coordinate {:?} is off the board",
                        i, coord
                    )));
                }
                if !seen.insert(coord) {
                    return Err(ProtocolError::MalformedLayout(std::format!(
                        "coordinate {:?} is claimed twice",
                        coord
                    )));
                }
            }
        }
        if seen.len() != TOTAL_SHIP_CELLS {
            return Err(ProtocolError::MalformedLayout(std::format!(
                "expected {} ship cells, got {}",
                TOTAL_SHIP_CELLS,
                seen.len()
            )));
        }
        Ok(())
    }

    /// Registry of the peer's ships, labelled by record index and type.
    pub fn into_registry(self) -> RemoteRegistry {
        let mut registry = RemoteRegistry::new();
        for (i, record) in self.0.into_iter().enumerate() {
            registry.insert(ship_label(i, record.kind), record.coordinates);
        }
        registry
    }
}

/// Messages exchanged between peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Sent once by each side at session start.
    FleetLayout(FleetLayout),
    /// A shot at (row, col), sent by the side whose turn it is.
    Shot(Coord),
}

impl Message {
    /// Payload bytes: JSON text for a layout, two ASCII digits for a shot.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        match self {
            Message::FleetLayout(layout) => Ok(serde_json::to_vec(layout)?),
            Message::Shot(coord) => Ok(encode_shot(*coord)?.to_vec()),
        }
    }

    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        match payload.first() {
            None => Err(ProtocolError::EmptyFrame),
            Some(b'[') => Ok(Message::FleetLayout(serde_json::from_slice(payload)?)),
            Some(_) => decode_shot(payload).map(Message::Shot),
        }
    }
}

/// Encode a shot as row digit then column digit.
pub fn encode_shot(coord: Coord) -> Result<[u8; 2], ProtocolError> {
    if !Grid::in_bounds(coord) {
        return Err(ProtocolError::InvalidShot(std::format!("{:?}", coord)));
    }
    Ok([b'0' + coord.0 as u8, b'0' + coord.1 as u8])
}

pub fn decode_shot(payload: &[u8]) -> Result<Coord, ProtocolError> {
    let invalid = || ProtocolError::InvalidShot(String::from_utf8_lossy(payload).to_string());
    let [r, c] = payload else {
        return Err(invalid());
    };
    if !r.is_ascii_digit() || !c.is_ascii_digit() {
        return Err(invalid());
    }
    let coord = ((r - b'0') as usize, (c - b'0') as usize);
    if coord.0 >= BOARD_SIZE as usize || coord.1 >= BOARD_SIZE as usize {
        return Err(invalid());
    }
    Ok(coord)
}
