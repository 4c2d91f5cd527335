//! # Rover Console Library
//!
//! Operator console for a remotely driven rover.
//!
//! This library provides the virtual joystick controllers that turn raw
//! pointer input into bounded 2D stick values, the throttled loop that samples
//! those values onto the vehicle channel, and the status reflections shown to
//! the operator.

pub mod channel;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod host;
pub mod protocol;
pub mod sample_loop;
pub mod status;
