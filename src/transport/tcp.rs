use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::{Message, ProtocolError};
use crate::transport::{Transport, TransportError};

/// Default time to wait for the peer. Generous, since the peer may be a human
/// thinking about a move.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Largest accepted frame payload. A fleet layout is well under 1 KiB.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Frames are `[u32 big-endian length][payload]`.
pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Duration,
    max_frame_size: usize,
    shutdown: Arc<AtomicBool>,
}

fn map_io(e: std::io::Error) -> TransportError {
    match e.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted => TransportError::Closed,
        _ => TransportError::Io(e),
    }
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_FRAME_SIZE)
    }

    pub fn with_timeout(stream: TcpStream, timeout_duration: Duration) -> Self {
        Self::with_config(stream, timeout_duration, MAX_FRAME_SIZE)
    }

    pub fn with_config(stream: TcpStream, timeout_duration: Duration, max_frame_size: usize) -> Self {
        // Small messages, one per turn: do not let Nagle hold them back.
        let _ = stream.set_nodelay(true);
        Self {
            stream,
            timeout_duration,
            max_frame_size,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Handle that makes every later operation fail with `Interrupted`.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Request graceful shutdown of the transport.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    async fn write_frame(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > self.max_frame_size {
            return Err(ProtocolError::FrameTooLarge {
                len: payload.len(),
                max: self.max_frame_size,
            }
            .into());
        }
        let len = (payload.len() as u32).to_be_bytes();
        self.stream.write_all(&len).await.map_err(map_io)?;
        self.stream.write_all(payload).await.map_err(map_io)?;
        self.stream.flush().await.map_err(map_io)?;
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut len_buf = [0u8; 4];
        self.stream.read_exact(&mut len_buf).await.map_err(map_io)?;
        let len = u32::from_be_bytes(len_buf) as usize;
        if len == 0 {
            return Err(ProtocolError::EmptyFrame.into());
        }
        if len > self.max_frame_size {
            return Err(ProtocolError::FrameTooLarge {
                len,
                max: self.max_frame_size,
            }
            .into());
        }
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf).await.map_err(map_io)?;
        Ok(buf)
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> Result<(), TransportError> {
        if self.is_shutdown() {
            return Err(TransportError::Interrupted);
        }
        let payload = msg.encode()?;
        let limit = self.timeout_duration;
        timeout(limit, self.write_frame(&payload))
            .await
            .map_err(|_| TransportError::Timeout(limit))?
    }

    async fn recv(&mut self) -> Result<Message, TransportError> {
        if self.is_shutdown() {
            return Err(TransportError::Interrupted);
        }
        let limit = self.timeout_duration;
        let payload = timeout(limit, self.read_frame())
            .await
            .map_err(|_| TransportError::Timeout(limit))??;
        Ok(Message::decode(&payload)?)
    }

    async fn close(&mut self) {
        self.shutdown();
        if let Err(e) = self.stream.shutdown().await {
            log::debug!("tcp shutdown: {}", e);
        }
    }
}
