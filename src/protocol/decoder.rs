//! # Frame Decoder
//!
//! Decodes inbound newline-delimited JSON frames (connect, voice commands,
//! assistant replies).

use serde::Deserialize;
use serde_json::Value;

use super::messages::*;
use crate::error::{ConsoleError, Result};

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Decode one inbound frame
///
/// # Arguments
///
/// * `line` - One frame, with or without the trailing newline
///
/// # Returns
///
/// * `Result<InboundEvent>` - Decoded event; unknown event names decode to
///   [`InboundEvent::Other`]
///
/// # Errors
///
/// Returns error if:
/// - The line is blank
/// - The line is not a JSON object with an `event` string
/// - A known event lacks its payload field
pub fn decode_frame(line: &str) -> Result<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ConsoleError::Protocol("Empty frame".to_string()));
    }

    let frame: RawFrame = serde_json::from_str(line)?;

    match frame.event.as_str() {
        EVENT_CONNECT => Ok(InboundEvent::Connect),
        EVENT_DISCONNECT => Ok(InboundEvent::Disconnect),
        EVENT_VOICE_COMMAND => Ok(InboundEvent::VoiceCommand {
            command: string_field(&frame.data, "command", EVENT_VOICE_COMMAND)?,
        }),
        EVENT_AI_RESPONSE => Ok(InboundEvent::AiResponse {
            response: string_field(&frame.data, "response", EVENT_AI_RESPONSE)?,
        }),
        _ => Ok(InboundEvent::Other(frame.event)),
    }
}

fn string_field(data: &Value, field: &str, event: &str) -> Result<String> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ConsoleError::Protocol(format!("{} frame missing string field '{}'", event, field))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_connect_without_data() {
        assert_eq!(decode_frame(r#"{"event":"connect"}"#).unwrap(), InboundEvent::Connect);
    }

    #[test]
    fn test_decode_disconnect_with_trailing_newline() {
        assert_eq!(
            decode_frame("{\"event\":\"disconnect\",\"data\":null}\n").unwrap(),
            InboundEvent::Disconnect
        );
    }

    #[test]
    fn test_decode_voice_command() {
        let event = decode_frame(r#"{"event":"voice_command","data":{"command":"move forward"}}"#)
            .unwrap();
        assert_eq!(event, InboundEvent::VoiceCommand { command: "move forward".to_string() });
    }

    #[test]
    fn test_decode_ai_response() {
        let event =
            decode_frame(r#"{"event":"ai_response","data":{"response":"Moving forward"}}"#).unwrap();
        assert_eq!(event, InboundEvent::AiResponse { response: "Moving forward".to_string() });
    }

    #[test]
    fn test_decode_unknown_event() {
        let event = decode_frame(r#"{"event":"battery","data":{"volts":7.4}}"#).unwrap();
        assert_eq!(event, InboundEvent::Other("battery".to_string()));
    }

    #[test]
    fn test_decode_missing_field() {
        let result = decode_frame(r#"{"event":"ai_response","data":{}}"#);
        match result {
            Err(ConsoleError::Protocol(msg)) => assert!(msg.contains("response")),
            other => panic!("Expected Protocol error, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_line() {
        assert!(matches!(decode_frame("   \n"), Err(ConsoleError::Protocol(_))));
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(matches!(decode_frame("{not json"), Err(ConsoleError::Json(_))));
    }

    #[test]
    fn test_decode_missing_event_name() {
        assert!(decode_frame(r#"{"data":{}}"#).is_err());
    }
}
