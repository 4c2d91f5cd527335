//! # Console Protocol Module
//!
//! Messages exchanged with the vehicle over the console channel.
//!
//! This module handles:
//! - Event names and payload shapes (`joystick_movement`, `speed_change`, ...)
//! - Encoding outbound events as newline-delimited JSON frames
//! - Decoding inbound frames into typed events

pub mod decoder;
pub mod encoder;
pub mod messages;
