#![cfg(feature = "std")]

use std::string::{String, ToString};

use crate::{
    common::BoardError, game::MoveError, persistence::PersistenceError, protocol::ProtocolError,
    transport::TransportError,
};

/// Everything that can end or interrupt a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Random fleet placement ran out of attempts.
    #[error("ship placement failed: {0}")]
    Placement(BoardError),
    /// The peer sent something that breaks the protocol.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// A local target was refused; the player is asked again.
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),
    #[error("transport error: {0}")]
    Transport(TransportError),
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Frame(e) => SessionError::ProtocolViolation(e.to_string()),
            other => SessionError::Transport(other),
        }
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        SessionError::ProtocolViolation(err.to_string())
    }
}
