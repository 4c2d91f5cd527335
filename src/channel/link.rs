//! # Frame Link
//!
//! [`ChannelAdapter`] implementation over a byte stream.
//!
//! Outbound frames are queued on a bounded channel and written by a
//! background task, so `send` never waits on the network. When the peer stops
//! reading and the queue fills up, new frames are dropped with a warning.
//! Inbound lines are decoded by a reader task and forwarded as
//! [`InboundEvent`]s.

use serde_json::Value;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::sink::{FrameSink, TcpFrameSink};
use super::ChannelAdapter;
use crate::config::ChannelConfig;
use crate::error::{ConsoleError, Result};
use crate::protocol::decoder::decode_frame;
use crate::protocol::encoder::encode_frame;
use crate::protocol::messages::InboundEvent;

/// Capacity of the inbound event queue
pub const INBOUND_QUEUE_DEPTH: usize = 64;

/// Capacity of the outbound frame queue (about 12s of two-stick samples at 10 Hz)
pub const OUTBOUND_QUEUE_DEPTH: usize = 256;

/// Handle for queuing outbound frames
///
/// Cloning is cheap; all clones feed the same writer task.
#[derive(Debug, Clone)]
pub struct FrameLink {
    frames: mpsc::Sender<String>,
}

impl FrameLink {
    /// Start a writer task draining frames into `sink`
    ///
    /// # Returns
    ///
    /// * `(FrameLink, JoinHandle<u64>)` - Link handle and the writer task,
    ///   which resolves to the number of frames written
    pub fn spawn<S: FrameSink + 'static>(sink: S) -> (Self, JoinHandle<u64>) {
        Self::with_capacity(sink, OUTBOUND_QUEUE_DEPTH)
    }

    /// Like [`FrameLink::spawn`] with an explicit queue capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    pub fn with_capacity<S: FrameSink + 'static>(sink: S, capacity: usize) -> (Self, JoinHandle<u64>) {
        let (frames, queue) = mpsc::channel(capacity);
        let writer = tokio::spawn(write_frames(sink, queue));
        (Self { frames }, writer)
    }

    /// Queue an already encoded frame without waiting
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::QueueFull`] if the writer is behind and
    /// [`ConsoleError::ChannelClosed`] once the writer has stopped
    pub fn send_frame(&self, frame: String) -> Result<()> {
        self.frames.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => ConsoleError::QueueFull(self.frames.max_capacity()),
            TrySendError::Closed(_) => ConsoleError::ChannelClosed,
        })
    }

    /// True once the writer task has stopped accepting frames
    pub fn is_closed(&self) -> bool {
        self.frames.is_closed()
    }
}

impl ChannelAdapter for FrameLink {
    fn send(&self, event: &str, payload: Value) {
        let frame = match encode_frame(event, &payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode {} frame: {}", event, e);
                return;
            }
        };

        match self.send_frame(frame) {
            Ok(()) => {}
            Err(e @ ConsoleError::QueueFull(_)) => warn!("Dropping {} frame: {}", event, e),
            Err(e) => debug!("Dropping {} frame: {}", event, e),
        }
    }
}

/// Live TCP channel to the vehicle
#[derive(Debug)]
pub struct Connection {
    /// Outbound handle
    pub link: FrameLink,
    /// Decoded inbound events; starts with [`InboundEvent::Connect`] and ends
    /// with [`InboundEvent::Disconnect`]
    pub inbound: mpsc::Receiver<InboundEvent>,
    /// Writer task (frames written)
    pub writer: JoinHandle<u64>,
    /// Reader task
    pub reader: JoinHandle<()>,
}

/// Connect to the vehicle over TCP
///
/// # Arguments
///
/// * `config` - Channel address and connect timeout
///
/// # Errors
///
/// Returns error if the connection is refused or not established within
/// `connect_timeout_ms`
///
/// # Examples
///
/// ```no_run
/// use rover_console::channel::link::connect;
/// use rover_console::config::ChannelConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let connection = connect(&ChannelConfig::default()).await?;
///     drop(connection.link);
///     Ok(())
/// }
/// ```
pub async fn connect(config: &ChannelConfig) -> Result<Connection> {
    debug!("Connecting to {}", config.address);

    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let stream = tokio::time::timeout(timeout, TcpStream::connect(config.address.as_str()))
        .await
        .map_err(|_| {
            ConsoleError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("Timed out connecting to {}", config.address),
            ))
        })??;
    stream.set_nodelay(true)?;

    info!("Connected to vehicle at {}", config.address);

    let (read_half, write_half) = stream.into_split();
    let (link, writer) = FrameLink::spawn(TcpFrameSink::new(write_half));
    let (events, inbound) = mpsc::channel(INBOUND_QUEUE_DEPTH);
    let reader = spawn_reader(BufReader::new(read_half), events);

    Ok(Connection {
        link,
        inbound,
        writer,
        reader,
    })
}

/// Start a reader task decoding frames from `reader` into `events`
pub fn spawn_reader<R>(reader: R, events: mpsc::Sender<InboundEvent>) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(read_frames(reader, events))
}

async fn read_frames<R>(reader: R, events: mpsc::Sender<InboundEvent>)
where
    R: AsyncBufRead + Unpin,
{
    if events.send(InboundEvent::Connect).await.is_err() {
        return;
    }

    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match decode_frame(&line) {
                    Ok(event) => {
                        if events.send(event).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => debug!("Skipping inbound frame: {}", e),
                }
            }
            Ok(None) => {
                info!("Vehicle closed the channel");
                break;
            }
            Err(e) => {
                warn!("Failed to read inbound frame: {}", e);
                break;
            }
        }
    }

    let _ = events.send(InboundEvent::Disconnect).await;
}

async fn write_frames<S: FrameSink>(mut sink: S, mut queue: mpsc::Receiver<String>) -> u64 {
    let mut written: u64 = 0;

    while let Some(frame) = queue.recv().await {
        if let Err(e) = sink.write_all(frame.as_bytes()).await {
            warn!("Failed to write frame: {}", e);
            break;
        }
        if let Err(e) = sink.flush().await {
            warn!("Failed to flush channel: {}", e);
            break;
        }
        written += 1;
    }

    debug!("Frame writer stopped after {} frames", written);
    written
}
