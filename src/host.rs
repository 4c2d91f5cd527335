//! # Host Input
//!
//! Input vocabulary of the console binary: pointer events, viewport resizes
//! and operator controls, one JSON object per line.
//!
//! ## Examples
//!
//! ```text
//! {"type":"mouse","target":"left","kind":"down","client_x":120,"client_y":480}
//! {"type":"mouse","kind":"move","client_x":130,"client_y":440}
//! {"type":"touch","kind":"end"}
//! {"type":"resize","left":{"left":0,"top":300,"width":200,"height":200}}
//! {"type":"speed","value":75}
//! {"type":"text","command":"turn left"}
//! {"type":"toggle_autonomous"}
//! ```

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::input::{MouseEventKind, TouchEventKind, TouchPoint};
use crate::controller::layout::Rect;
use crate::controller::types::ControllerIdentity;
use crate::error::Result;

/// Capacity of the host input queue
pub const HOST_QUEUE_DEPTH: usize = 256;

/// One host input event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Mouse event; `target` names the stick under the pointer on `down`.
    /// `up` and `leave` may omit the coordinates.
    Mouse {
        #[serde(default)]
        target: Option<ControllerIdentity>,
        kind: MouseEventKind,
        #[serde(default)]
        client_x: Option<f64>,
        #[serde(default)]
        client_y: Option<f64>,
    },
    /// Touch event; `target` names the stick touched on `start`
    Touch {
        #[serde(default)]
        target: Option<ControllerIdentity>,
        kind: TouchEventKind,
        #[serde(default)]
        touches: Vec<TouchPoint>,
    },
    /// Viewport resize with the new control boxes, if they changed
    Resize {
        #[serde(default)]
        left: Option<Rect>,
        #[serde(default)]
        right: Option<Rect>,
    },
    /// Speed slider moved
    Speed { value: u8 },
    /// Operator typed a command
    Text { command: String },
    /// Autonomous mode button pressed
    ToggleAutonomous,
}

impl HostEvent {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns error if the line is not a valid host event
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Start a task reading host events from stdin.
///
/// The task ends, closing `events`, at end of input.
pub fn spawn_stdin_reader(events: mpsc::Sender<HostEvent>) -> JoinHandle<u64> {
    tokio::spawn(read_host_events(BufReader::new(tokio::io::stdin()), events))
}

/// Forward host events parsed from `reader` until end of input.
///
/// Unparseable lines are logged and skipped.
///
/// # Returns
///
/// * `u64` - Number of events forwarded
pub async fn read_host_events<R>(reader: R, events: mpsc::Sender<HostEvent>) -> u64
where
    R: AsyncBufRead + Unpin,
{
    let mut forwarded: u64 = 0;
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Host input closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read host input: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match HostEvent::parse(&line) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    debug!("Console stopped, dropping host input");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => warn!("Ignoring host input line: {}", e),
        }
    }

    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;

    #[test]
    fn test_parse_mouse_down_with_target() {
        let event = HostEvent::parse(
            r#"{"type":"mouse","target":"left","kind":"down","client_x":120,"client_y":480.5}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            HostEvent::Mouse {
                target: Some(ControllerIdentity::Left),
                kind: MouseEventKind::Down,
                client_x: Some(120.0),
                client_y: Some(480.5),
            }
        );
    }

    #[test]
    fn test_parse_mouse_up_without_coordinates() {
        let event = HostEvent::parse(r#"{"type":"mouse","kind":"up"}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::Mouse { target: None, kind: MouseEventKind::Up, client_x: None, client_y: None }
        );
    }

    #[test]
    fn test_parse_mouse_down_keeps_missing_coordinates() {
        let event = HostEvent::parse(r#"{"type":"mouse","target":"left","kind":"down"}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::Mouse {
                target: Some(ControllerIdentity::Left),
                kind: MouseEventKind::Down,
                client_x: None,
                client_y: None,
            }
        );
    }

    #[test]
    fn test_parse_target_accepts_element_ids() {
        let event = HostEvent::parse(
            r#"{"type":"touch","target":"rightJoystick","kind":"start","touches":[{"identifier":3,"client_x":1,"client_y":2}]}"#,
        )
        .unwrap();

        match &event {
            HostEvent::Touch { target, kind, touches } => {
                assert_eq!(*target, Some(ControllerIdentity::Right));
                assert_eq!(*kind, TouchEventKind::Start);
                assert_eq!(touches.len(), 1);
                assert_eq!(touches[0].identifier, 3);
            }
            other => panic!("Expected touch event, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_touch_end_without_points() {
        let event = HostEvent::parse(r#"{"type":"touch","kind":"end"}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::Touch { target: None, kind: TouchEventKind::End, touches: vec![] }
        );
    }

    #[test]
    fn test_parse_resize() {
        let event = HostEvent::parse(
            r#"{"type":"resize","right":{"left":10,"top":20,"width":200,"height":150}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            HostEvent::Resize { left: None, right: Some(Rect::new(10.0, 20.0, 200.0, 150.0)) }
        );
    }

    #[test]
    fn test_parse_operator_controls() {
        assert_eq!(
            HostEvent::parse(r#"{"type":"speed","value":75}"#).unwrap(),
            HostEvent::Speed { value: 75 }
        );
        assert_eq!(
            HostEvent::parse(r#"{"type":"text","command":"turn left"}"#).unwrap(),
            HostEvent::Text { command: "turn left".to_string() }
        );
        assert_eq!(
            HostEvent::parse(r#"{"type":"toggle_autonomous"}"#).unwrap(),
            HostEvent::ToggleAutonomous
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(HostEvent::parse("{"), Err(ConsoleError::Json(_))));
        assert!(HostEvent::parse(r#"{"type":"jump"}"#).is_err());
        assert!(HostEvent::parse(r#"{"type":"speed","value":300}"#).is_err());
        assert!(HostEvent::parse(r#"{"type":"mouse","target":"middle","kind":"down"}"#).is_err());
    }

    #[tokio::test]
    async fn test_reader_forwards_valid_lines() {
        let input: &[u8] = b"{\"type\":\"speed\",\"value\":10}\n\
            garbage\n\
            \n\
            {\"type\":\"toggle_autonomous\"}\n";
        let (tx, mut rx) = mpsc::channel(HOST_QUEUE_DEPTH);

        let forwarded = read_host_events(input, tx).await;

        assert_eq!(forwarded, 2);
        assert_eq!(rx.recv().await, Some(HostEvent::Speed { value: 10 }));
        assert_eq!(rx.recv().await, Some(HostEvent::ToggleAutonomous));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_reader_stops_when_console_gone() {
        let input: &[u8] = b"{\"type\":\"speed\",\"value\":10}\n{\"type\":\"speed\",\"value\":20}\n";
        let (tx, rx) = mpsc::channel(HOST_QUEUE_DEPTH);
        drop(rx);

        assert_eq!(read_host_events(input, tx).await, 0);
    }
}
