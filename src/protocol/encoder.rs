//! # Frame Encoder
//!
//! Encodes outbound events into newline-delimited JSON frames.

use serde::Serialize;
use serde_json::Value;

use super::messages::Outbound;
use crate::error::Result;

/// Frame terminator
pub const FRAME_DELIMITER: char = '\n';

#[derive(Serialize)]
struct WireFrame<'a> {
    event: &'a str,
    data: &'a Value,
}

/// Encode an event and its payload into one frame
///
/// # Arguments
///
/// * `event` - Event name (e.g. `joystick_movement`)
/// * `payload` - JSON payload
///
/// # Returns
///
/// * `Result<String>` - `{"event":..,"data":..}` followed by a newline
///
/// # Examples
///
/// ```
/// use rover_console::protocol::encoder::encode_frame;
/// use serde_json::json;
///
/// let frame = encode_frame("speed_change", &json!({"speed": 60}))?;
/// assert_eq!(frame, "{\"event\":\"speed_change\",\"data\":{\"speed\":60}}\n");
/// # Ok::<(), rover_console::error::ConsoleError>(())
/// ```
pub fn encode_frame(event: &str, payload: &Value) -> Result<String> {
    let mut frame = serde_json::to_string(&WireFrame { event, data: payload })?;
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

/// Encode a typed outbound message
pub fn encode_message(message: &Outbound) -> Result<String> {
    encode_frame(message.event_name(), &message.payload())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::types::{ControllerIdentity, Vector2};
    use crate::protocol::messages::JoystickMovement;

    #[test]
    fn test_frame_ends_with_single_newline() {
        let frame = encode_frame("connect", &Value::Null).unwrap();
        assert!(frame.ends_with('\n'));
        assert_eq!(frame.matches('\n').count(), 1);
    }

    #[test]
    fn test_frame_structure() {
        let frame = encode_message(&Outbound::JoystickMovement(JoystickMovement::new(
            ControllerIdentity::Right,
            Vector2::new(1.0, 0.0),
        )))
        .unwrap();

        let parsed: Value = serde_json::from_str(frame.trim_end()).unwrap();
        assert_eq!(parsed["event"], "joystick_movement");
        assert_eq!(parsed["data"]["joystick"], "right");
        assert_eq!(parsed["data"]["x"], 1.0);
        assert_eq!(parsed["data"]["y"], 0.0);
    }

    #[test]
    fn test_embedded_newlines_are_escaped() {
        let frame = encode_message(&Outbound::TextCommand {
            command: "go\nstop".to_string(),
        })
        .unwrap();
        assert_eq!(frame.matches('\n').count(), 1);
        assert!(frame.contains("go\\nstop"));
    }
}
