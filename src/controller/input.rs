//! # Pointer Input Module
//!
//! Unifies mouse and touch events into a single [`PointerEvent`] so the
//! joystick logic never branches on input modality.
//!
//! ## Event Mapping
//!
//! | Source | Kind | PointerEvent |
//! |--------|------|--------------|
//! | Mouse | `down` | `Down(client point)` |
//! | Mouse | `move` | `Move(client point)` |
//! | Mouse | `up` | `Up` |
//! | Mouse | `leave` | `Cancel` |
//! | Touch | `start` | `Down(first touch)` |
//! | Touch | `move` | `Move(first touch)` |
//! | Touch | `end` | `Up` |
//! | Touch | `cancel` | `Cancel` |
//!
//! Only the first touch point of a touch event is used. A mouse `down` or
//! `move` without coordinates, and a touch `start` or `move` without any touch
//! points, are rejected with [`ConsoleError::InputDataMissing`]; callers treat
//! that as a no-op.
//!
//! ## Usage
//!
//! ```
//! use rover_console::controller::input::{from_mouse, MouseEvent, MouseEventKind, PointerEvent};
//! use rover_console::controller::types::Point;
//!
//! let event = MouseEvent { kind: MouseEventKind::Down, client_x: Some(120.0), client_y: Some(80.0) };
//! assert_eq!(from_mouse(&event)?, PointerEvent::Down(Point::new(120.0, 80.0)));
//! # Ok::<(), rover_console::error::ConsoleError>(())
//! ```

use serde::Deserialize;

use super::types::Point;
use crate::error::{ConsoleError, Result};

/// Modality-independent pointer event consumed by the joystick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Press started at the given client point.
    Down(Point),
    /// Pointer moved to the given client point.
    Move(Point),
    /// Explicit release.
    Up,
    /// Tracking lost without a release (pointer left the area, touch cancelled).
    Cancel,
}

/// Input modality a pointer event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// Mouse event kinds the console listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseEventKind {
    Down,
    Move,
    Up,
    Leave,
}

/// Raw mouse event in client (viewport) coordinates.
///
/// Coordinates are only required for `down` and `move`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    #[serde(default)]
    pub client_x: Option<f64>,
    #[serde(default)]
    pub client_y: Option<f64>,
}

/// Touch event kinds the console listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchEventKind {
    Start,
    Move,
    End,
    Cancel,
}

/// One contact point of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TouchPoint {
    #[serde(default)]
    pub identifier: i64,
    pub client_x: f64,
    pub client_y: f64,
}

/// Raw touch event with every active contact point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TouchEvent {
    pub kind: TouchEventKind,
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
}

/// Converts a mouse event into a [`PointerEvent`].
///
/// # Errors
///
/// Returns [`ConsoleError::InputDataMissing`] if a `down`/`move` event is
/// missing a coordinate or carries a non-finite one.
pub fn from_mouse(event: &MouseEvent) -> Result<PointerEvent> {
    match event.kind {
        MouseEventKind::Down => Ok(PointerEvent::Down(mouse_position(event)?)),
        MouseEventKind::Move => Ok(PointerEvent::Move(mouse_position(event)?)),
        MouseEventKind::Up => Ok(PointerEvent::Up),
        MouseEventKind::Leave => Ok(PointerEvent::Cancel),
    }
}

/// Converts a touch event into a [`PointerEvent`], using only the first touch.
///
/// # Errors
///
/// Returns [`ConsoleError::InputDataMissing`] if a `start`/`move` event has
/// no touch points or the first point is not finite.
pub fn from_touch(event: &TouchEvent) -> Result<PointerEvent> {
    match event.kind {
        TouchEventKind::Start => Ok(PointerEvent::Down(first_touch(event)?)),
        TouchEventKind::Move => Ok(PointerEvent::Move(first_touch(event)?)),
        // The lifted finger is no longer listed, so releases need no points.
        TouchEventKind::End => Ok(PointerEvent::Up),
        TouchEventKind::Cancel => Ok(PointerEvent::Cancel),
    }
}

fn mouse_position(event: &MouseEvent) -> Result<Point> {
    match (event.client_x, event.client_y) {
        (Some(x), Some(y)) => finite(Point::new(x, y)),
        _ => Err(ConsoleError::InputDataMissing("mouse event without coordinates")),
    }
}

fn first_touch(event: &TouchEvent) -> Result<Point> {
    let touch = event
        .touches
        .first()
        .ok_or(ConsoleError::InputDataMissing("touch event without touch points"))?;
    finite(Point::new(touch.client_x, touch.client_y))
}

fn finite(point: Point) -> Result<Point> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(ConsoleError::InputDataMissing("non-finite pointer coordinates"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, x: f64, y: f64) -> MouseEvent {
        MouseEvent { kind, client_x: Some(x), client_y: Some(y) }
    }

    fn mouse_without_position(kind: MouseEventKind) -> MouseEvent {
        MouseEvent { kind, client_x: None, client_y: None }
    }

    fn touch(kind: TouchEventKind, points: &[(f64, f64)]) -> TouchEvent {
        TouchEvent {
            kind,
            touches: points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| TouchPoint { identifier: i as i64, client_x: x, client_y: y })
                .collect(),
        }
    }

    // ==================== Mouse Tests ====================

    #[test]
    fn test_mouse_down_and_move_carry_position() {
        assert_eq!(
            from_mouse(&mouse(MouseEventKind::Down, 10.0, 20.0)).unwrap(),
            PointerEvent::Down(Point::new(10.0, 20.0))
        );
        assert_eq!(
            from_mouse(&mouse(MouseEventKind::Move, 11.5, 19.0)).unwrap(),
            PointerEvent::Move(Point::new(11.5, 19.0))
        );
    }

    #[test]
    fn test_mouse_up_is_release() {
        assert_eq!(from_mouse(&mouse(MouseEventKind::Up, 0.0, 0.0)).unwrap(), PointerEvent::Up);
    }

    #[test]
    fn test_mouse_leave_is_tracking_loss() {
        assert_eq!(
            from_mouse(&mouse(MouseEventKind::Leave, 0.0, 0.0)).unwrap(),
            PointerEvent::Cancel
        );
    }

    #[test]
    fn test_mouse_nan_position_rejected() {
        let result = from_mouse(&mouse(MouseEventKind::Move, f64::NAN, 3.0));
        assert!(matches!(result, Err(ConsoleError::InputDataMissing(_))));
    }

    #[test]
    fn test_mouse_down_and_move_without_position_are_missing_data() {
        for kind in [MouseEventKind::Down, MouseEventKind::Move] {
            let result = from_mouse(&mouse_without_position(kind));
            assert!(matches!(result, Err(ConsoleError::InputDataMissing(_))));
        }

        let half = MouseEvent { kind: MouseEventKind::Down, client_x: Some(10.0), client_y: None };
        assert!(matches!(from_mouse(&half), Err(ConsoleError::InputDataMissing(_))));
    }

    #[test]
    fn test_mouse_release_needs_no_position() {
        assert_eq!(from_mouse(&mouse_without_position(MouseEventKind::Up)).unwrap(), PointerEvent::Up);
        assert_eq!(
            from_mouse(&mouse_without_position(MouseEventKind::Leave)).unwrap(),
            PointerEvent::Cancel
        );
    }

    #[test]
    fn test_mouse_up_ignores_bad_coordinates() {
        assert_eq!(
            from_mouse(&mouse(MouseEventKind::Up, f64::NAN, f64::NAN)).unwrap(),
            PointerEvent::Up
        );
    }

    // ==================== Touch Tests ====================

    #[test]
    fn test_touch_uses_first_point_only() {
        let event = touch(TouchEventKind::Move, &[(50.0, 60.0), (300.0, 400.0)]);
        assert_eq!(from_touch(&event).unwrap(), PointerEvent::Move(Point::new(50.0, 60.0)));
    }

    #[test]
    fn test_touch_start_without_points_is_missing_data() {
        let event = touch(TouchEventKind::Start, &[]);
        assert!(matches!(from_touch(&event), Err(ConsoleError::InputDataMissing(_))));
    }

    #[test]
    fn test_touch_move_without_points_is_missing_data() {
        let event = touch(TouchEventKind::Move, &[]);
        assert!(matches!(from_touch(&event), Err(ConsoleError::InputDataMissing(_))));
    }

    #[test]
    fn test_touch_end_without_points_is_release() {
        let event = touch(TouchEventKind::End, &[]);
        assert_eq!(from_touch(&event).unwrap(), PointerEvent::Up);
    }

    #[test]
    fn test_touch_cancel_is_tracking_loss() {
        let event = touch(TouchEventKind::Cancel, &[(1.0, 1.0)]);
        assert_eq!(from_touch(&event).unwrap(), PointerEvent::Cancel);
    }

    #[test]
    fn test_touch_event_deserializes_without_identifier() {
        let event: TouchEvent =
            serde_json::from_str(r#"{"kind":"start","touches":[{"client_x":5.0,"client_y":6.0}]}"#)
                .unwrap();
        assert_eq!(event.touches[0].identifier, 0);
        assert_eq!(from_touch(&event).unwrap(), PointerEvent::Down(Point::new(5.0, 6.0)));
    }
}
