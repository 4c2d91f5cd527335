//! # Controller Module
//!
//! On-screen virtual joystick handling.
//!
//! This module handles:
//! - Unifying mouse and touch input into pointer events
//! - Reading control and knob layout
//! - Gesture tracking, clamping and normalization
//! - Knob rendering requests
//! - Owning the left (drive) and right (camera) sticks

pub mod input;
pub mod joystick;
pub mod layout;
pub mod registry;
pub mod render;
pub mod types;
