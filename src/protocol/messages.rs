//! # Console Protocol Constants and Types
//!
//! Event names and payload shapes exchanged with the vehicle.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::controller::types::{ControllerIdentity, Vector2};

/// Outbound: stick sample `{joystick, x, y}`
pub const EVENT_JOYSTICK_MOVEMENT: &str = "joystick_movement";

/// Outbound: speed slider `{speed}`
pub const EVENT_SPEED_CHANGE: &str = "speed_change";

/// Outbound: operator text `{command}`
pub const EVENT_TEXT_COMMAND: &str = "text_command";

/// Inbound: channel established
pub const EVENT_CONNECT: &str = "connect";

/// Inbound: channel lost
pub const EVENT_DISCONNECT: &str = "disconnect";

/// Inbound: transcribed voice command `{command}`
pub const EVENT_VOICE_COMMAND: &str = "voice_command";

/// Inbound: assistant reply `{response}`
pub const EVENT_AI_RESPONSE: &str = "ai_response";

/// Upper bound of the speed slider (percent)
pub const MAX_SPEED: u8 = 100;

/// Text sent when autonomous mode is switched on
pub const AUTONOMOUS_ON_COMMAND: &str = "activate autonomous mode";

/// Text sent when autonomous mode is switched off
pub const AUTONOMOUS_OFF_COMMAND: &str = "deactivate autonomous mode";

/// `joystick_movement` payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoystickMovement {
    pub joystick: ControllerIdentity,
    pub x: f64,
    pub y: f64,
}

impl JoystickMovement {
    #[must_use]
    pub fn new(joystick: ControllerIdentity, value: Vector2) -> Self {
        Self {
            joystick,
            x: value.x(),
            y: value.y(),
        }
    }

    /// Centered sample, sent once when a stick is released.
    #[must_use]
    pub fn neutral(joystick: ControllerIdentity) -> Self {
        Self::new(joystick, Vector2::NEUTRAL)
    }
}

/// Messages originated by the console.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    JoystickMovement(JoystickMovement),
    SpeedChange { speed: u8 },
    TextCommand { command: String },
}

impl Outbound {
    /// Wire event name.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Outbound::JoystickMovement(_) => EVENT_JOYSTICK_MOVEMENT,
            Outbound::SpeedChange { .. } => EVENT_SPEED_CHANGE,
            Outbound::TextCommand { .. } => EVENT_TEXT_COMMAND,
        }
    }

    /// JSON payload carried under the event name.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Outbound::JoystickMovement(m) => json!({
                "joystick": m.joystick.as_str(),
                "x": m.x,
                "y": m.y,
            }),
            Outbound::SpeedChange { speed } => json!({ "speed": speed }),
            Outbound::TextCommand { command } => json!({ "command": command }),
        }
    }
}

/// Events received from the vehicle side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Connect,
    Disconnect,
    VoiceCommand { command: String },
    AiResponse { response: String },
    /// Event name this console does not handle.
    Other(String),
}
