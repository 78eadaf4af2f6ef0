use std::time::Duration;

use crate::protocol::{Message, ProtocolError};

/// Failures of the underlying byte stream. All of them end the session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed by peer")]
    Closed,
    #[error("no data from peer within {0:?}")]
    Timeout(Duration),
    #[error("interrupted")]
    Interrupted,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad frame: {0}")]
    Frame(#[from] ProtocolError),
}

/// A reliable, ordered, bidirectional message channel to exactly one peer.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> Result<(), TransportError>;
    async fn recv(&mut self) -> Result<Message, TransportError>;

    /// Close the channel. Errors while closing are not interesting to callers.
    async fn close(&mut self) {}
}

pub mod in_memory;
pub mod tcp;
