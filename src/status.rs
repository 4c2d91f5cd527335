//! # Status Module
//!
//! Operator-facing reflections of console state: the drive direction label,
//! camera angle readout, speed slider, autonomous flag and the chat log.
//!
//! ## Direction Classification
//!
//! | Condition | Label |
//! |-----------|-------|
//! | `\|y\| > 0.2` | `Forward` / `Backward`, plus ` Right` / ` Left` when `\|x\| > 0.3` |
//! | `\|x\| > 0.3` | `Right` / `Left` |
//! | otherwise | `Stopped` |
//!
//! The thresholds only classify the label; stick values themselves carry no
//! deadzone.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;
use tracing::info;

use crate::controller::types::{ControllerIdentity, Vector2};
use crate::protocol::messages::MAX_SPEED;

/// Vertical deflection needed to count as driving forward/backward
pub const DIRECTION_Y_THRESHOLD: f64 = 0.2;

/// Horizontal deflection needed to count as turning
pub const DIRECTION_X_THRESHOLD: f64 = 0.3;

/// Camera pan range (degrees)
pub const CAMERA_H_MIN: i32 = 35;
pub const CAMERA_H_MAX: i32 = 125;
pub const CAMERA_H_CENTER: i32 = 80;
pub const CAMERA_H_SPAN: f64 = 45.0;

/// Camera tilt range (degrees)
pub const CAMERA_V_MIN: i32 = 0;
pub const CAMERA_V_MAX: i32 = 80;
pub const CAMERA_V_CENTER: i32 = 40;
pub const CAMERA_V_SPAN: f64 = 40.0;

/// Chat entries kept before the oldest are dropped
pub const CHAT_CAPACITY: usize = 200;

/// Drive direction shown on the status board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Stopped,
    Forward,
    Backward,
    Left,
    Right,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,
}

impl Direction {
    /// Classify a left stick value.
    #[must_use]
    pub fn from_value(value: Vector2) -> Self {
        let (x, y) = (value.x(), value.y());
        let turning = x.abs() > DIRECTION_X_THRESHOLD;

        if y.abs() > DIRECTION_Y_THRESHOLD {
            match (y > 0.0, turning, x > 0.0) {
                (true, false, _) => Direction::Forward,
                (true, true, true) => Direction::ForwardRight,
                (true, true, false) => Direction::ForwardLeft,
                (false, false, _) => Direction::Backward,
                (false, true, true) => Direction::BackwardRight,
                (false, true, false) => Direction::BackwardLeft,
            }
        } else if turning {
            if x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else {
            Direction::Stopped
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Stopped => "Stopped",
            Direction::Forward => "Forward",
            Direction::Backward => "Backward",
            Direction::Left => "Left",
            Direction::Right => "Right",
            Direction::ForwardLeft => "Forward Left",
            Direction::ForwardRight => "Forward Right",
            Direction::BackwardLeft => "Backward Left",
            Direction::BackwardRight => "Backward Right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Camera pan/tilt readout in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraAngles {
    pub horizontal: i32,
    pub vertical: i32,
}

impl CameraAngles {
    pub const CENTER: CameraAngles = CameraAngles {
        horizontal: CAMERA_H_CENTER,
        vertical: CAMERA_V_CENTER,
    };

    /// Map a right stick value to camera angles.
    #[must_use]
    pub fn from_value(value: Vector2) -> Self {
        Self {
            horizontal: (CAMERA_H_CENTER + round_half_up(value.x() * CAMERA_H_SPAN))
                .clamp(CAMERA_H_MIN, CAMERA_H_MAX),
            vertical: (CAMERA_V_CENTER - round_half_up(value.y() * CAMERA_V_SPAN))
                .clamp(CAMERA_V_MIN, CAMERA_V_MAX),
        }
    }
}

impl Default for CameraAngles {
    fn default() -> Self {
        Self::CENTER
    }
}

impl fmt::Display for CameraAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H:{}° V:{}°", self.horizontal, self.vertical)
    }
}

// Halves round toward positive infinity (-2.5 -> -2).
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Direction, camera, speed and autonomous state shown to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBoard {
    direction: Direction,
    camera: CameraAngles,
    speed: u8,
    autonomous: bool,
}

impl StatusBoard {
    #[must_use]
    pub fn new(speed: u8) -> Self {
        Self {
            direction: Direction::Stopped,
            camera: CameraAngles::CENTER,
            speed: speed.min(MAX_SPEED),
            autonomous: false,
        }
    }

    /// Reflect a stick move.
    pub fn on_move(&mut self, identity: ControllerIdentity, value: Vector2) {
        match identity {
            ControllerIdentity::Left => self.direction = Direction::from_value(value),
            ControllerIdentity::Right => self.camera = CameraAngles::from_value(value),
        }
    }

    /// Reflect a stick release. The camera keeps its last angles.
    pub fn on_end(&mut self, identity: ControllerIdentity) {
        if identity == ControllerIdentity::Left {
            self.direction = Direction::Stopped;
        }
    }

    /// Set the speed slider, clamped to `0..=100`. Returns the applied value.
    pub fn set_speed(&mut self, speed: u8) -> u8 {
        self.speed = speed.min(MAX_SPEED);
        self.speed
    }

    /// Flip autonomous mode. Returns the new state.
    pub fn toggle_autonomous(&mut self) -> bool {
        self.autonomous = !self.autonomous;
        self.autonomous
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn camera(&self) -> CameraAngles {
        self.camera
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn is_autonomous(&self) -> bool {
        self.autonomous
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Who a chat line is from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    System,
    User,
    Ai,
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChatKind::System => "system",
            ChatKind::User => "user",
            ChatKind::Ai => "ai",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub kind: ChatKind,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// Bounded chat history, oldest first.
#[derive(Debug, Clone)]
pub struct ChatLog {
    entries: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ChatLog {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "chat log capacity must be positive");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest when full.
    pub fn push(&mut self, kind: ChatKind, text: impl Into<String>) {
        let text = text.into();
        info!("[{}] {}", kind, text);

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ChatMessage {
            kind,
            text,
            timestamp: Local::now(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new(CHAT_CAPACITY)
    }
}
