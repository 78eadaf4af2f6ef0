#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod ai;
pub mod attack;
mod board;
mod common;
mod config;
#[cfg(feature = "std")]
pub mod error;
mod game;
#[cfg(feature = "std")]
mod logging;
pub mod placement;
mod player;
mod player_ai;
#[cfg(feature = "std")]
mod player_cli;
#[cfg(feature = "std")]
pub mod player_node;
#[cfg(feature = "std")]
pub mod persistence;
#[cfg(feature = "std")]
pub mod protocol;
mod ship;
#[cfg(feature = "std")]
pub mod transport;

pub use ai::*;
pub use attack::{RemoteRegistry, ShipSet, Strike};
pub use board::*;
pub use common::*;
pub use config::*;
#[cfg(feature = "std")]
pub use error::SessionError;
pub use game::*;
#[cfg(feature = "std")]
pub use logging::{init_logging, LOG_ENV};
pub use placement::{place_fleet, random_board, random_placement};
pub use player::*;
pub use player_ai::*;
#[cfg(feature = "std")]
pub use player_cli::*;
#[cfg(feature = "std")]
pub use player_node::*;
#[cfg(feature = "std")]
pub use persistence::{PersistenceError, Snapshot, SnapshotStore};
#[cfg(feature = "std")]
pub use protocol::{FleetLayout, Message, ProtocolError, Role, ShipRecord};
pub use ship::*;
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport, TransportError};
