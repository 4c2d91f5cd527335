//! # Channel Module
//!
//! The console's bidirectional message channel to the vehicle.
//!
//! This module handles:
//! - The fire-and-forget [`ChannelAdapter`] seam used by the core
//! - Queuing outbound frames to a background writer task
//! - Reading and decoding inbound frames
//! - Connecting over TCP with a timeout

pub mod link;
pub mod sink;

use serde_json::Value;

use crate::protocol::messages::Outbound;

/// Outbound message sink.
///
/// `send` must not block or wait for delivery; failures are the channel's
/// own concern and are never reported back to the caller.
pub trait ChannelAdapter: Send + Sync {
    fn send(&self, event: &str, payload: Value);
}

/// Sends a typed message through `channel`.
pub fn emit(channel: &dyn ChannelAdapter, message: &Outbound) {
    channel.send(message.event_name(), message.payload());
}
