use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::task::yield_now;

use crate::protocol::Message;
use crate::transport::{Transport, TransportError};

type Queue = Arc<Mutex<VecDeque<Vec<u8>>>>;

/// Paired in-process transport. Messages go through the wire encoding so the
/// peer sees exactly what a TCP peer would.
pub struct InMemoryTransport {
    recv_queue: Queue,
    send_queue: Queue,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let q1 = Arc::new(Mutex::new(VecDeque::new()));
        let q2 = Arc::new(Mutex::new(VecDeque::new()));
        (
            Self {
                recv_queue: q1.clone(),
                send_queue: q2.clone(),
            },
            Self {
                recv_queue: q2,
                send_queue: q1,
            },
        )
    }

    /// Queue raw payload bytes, bypassing the encoder.
    pub fn send_raw(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        // The peer holds the only other reference to our send queue.
        if Arc::strong_count(&self.send_queue) == 1 {
            return Err(TransportError::Closed);
        }
        self.send_queue
            .lock()
            .map_err(|_| TransportError::Closed)?
            .push_back(payload);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, msg: Message) -> Result<(), TransportError> {
        let payload = msg.encode()?;
        self.send_raw(payload)
    }

    async fn recv(&mut self) -> Result<Message, TransportError> {
        loop {
            let next = self
                .recv_queue
                .lock()
                .map_err(|_| TransportError::Closed)?
                .pop_front();
            if let Some(payload) = next {
                return Ok(Message::decode(&payload)?);
            }
            if Arc::strong_count(&self.recv_queue) == 1 {
                return Err(TransportError::Closed);
            }
            yield_now().await;
        }
    }

    async fn close(&mut self) {
        // Dropping our handles is what the peer observes as a closed link.
        self.recv_queue = Arc::new(Mutex::new(VecDeque::new()));
        self.send_queue = Arc::new(Mutex::new(VecDeque::new()));
    }
}
