//! Byte sink for newline-delimited outbound frames
//!
//! The frame writer hands each encoded frame (terminator included) to a
//! [`FrameSink`] and flushes after every frame, so a sample reaches the vehicle
//! as soon as it is written rather than when a buffer fills.

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;

/// Destination for encoded frames
#[async_trait]
pub trait FrameSink: Send {
    /// Write one complete frame
    async fn write_all(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Push written frames to the peer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Frame sink over the write half of the vehicle TCP connection
pub struct TcpFrameSink {
    stream: OwnedWriteHalf,
}

impl TcpFrameSink {
    pub fn new(stream: OwnedWriteHalf) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl FrameSink for TcpFrameSink {
    async fn write_all(&mut self, frame: &[u8]) -> io::Result<()> {
        self.stream.write_all(frame).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.stream.flush().await
    }
}
