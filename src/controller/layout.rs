//! # Layout Module
//!
//! Bounding boxes of a joystick control and its knob, and the [`Geometry`]
//! derived from them.
//!
//! The joystick asks its [`ElementLayout`] for fresh boxes on construction, on
//! every press-start and on viewport resize. A failed query never breaks the
//! joystick: it keeps its last known geometry.

use serde::Deserialize;
use std::sync::{Arc, RwLock};

use super::types::Point;
use crate::error::{ConsoleError, Result};

/// Screen-space bounding box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Where a joystick sits on screen and how far its knob may travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Center of the control in screen pixels.
    pub center: Point,
    /// Knob travel radius in pixels. Always finite and greater than zero.
    pub max_distance: f64,
}

impl Geometry {
    /// Geometry used before any layout query has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::GeometryUnavailable`] if `radius` is not a
    /// positive finite number.
    pub fn fallback(radius: f64) -> Result<Self> {
        Self::checked(Point::ZERO, radius)
    }

    /// Computes geometry from the control and knob boxes.
    ///
    /// `max_distance` is half the control width minus half the knob width.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::GeometryUnavailable`] if the knob is at least as
    /// wide as the control, or any input is non-finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use rover_console::controller::layout::{Geometry, Rect};
    ///
    /// let control = Rect::new(50.0, 50.0, 160.0, 160.0);
    /// let knob = Rect::new(100.0, 100.0, 60.0, 60.0);
    /// let geometry = Geometry::from_rects(&control, &knob)?;
    /// assert_eq!(geometry.max_distance, 50.0);
    /// assert_eq!((geometry.center.x, geometry.center.y), (130.0, 130.0));
    /// # Ok::<(), rover_console::error::ConsoleError>(())
    /// ```
    pub fn from_rects(control: &Rect, knob: &Rect) -> Result<Self> {
        Self::checked(control.center(), control.width / 2.0 - knob.width / 2.0)
    }

    fn checked(center: Point, max_distance: f64) -> Result<Self> {
        if !center.is_finite() {
            return Err(ConsoleError::GeometryUnavailable(
                "control center is not finite".to_string(),
            ));
        }
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(ConsoleError::GeometryUnavailable(format!(
                "knob travel radius must be positive, got {}",
                max_distance
            )));
        }
        Ok(Self { center, max_distance })
    }
}

/// Source of a single joystick element's on-screen boxes.
#[cfg_attr(test, mockall::automock)]
pub trait ElementLayout: Send {
    /// Bounding box of the whole control (the travel area).
    fn control_bounds(&self) -> Result<Rect>;

    /// Bounding box of the knob at its current visual position.
    fn knob_bounds(&self) -> Result<Rect>;
}

#[derive(Debug, Clone, Copy)]
struct LayoutBox {
    control: Rect,
    knob_size: f64,
}

/// Layout handle shared between the host (which applies resizes) and the
/// joystick that reads it.
///
/// The knob is reported at rest, centered in the control; presses only start
/// from rest, which is when the joystick reads the knob box.
#[derive(Debug, Clone)]
pub struct SharedLayout {
    inner: Arc<RwLock<LayoutBox>>,
}

impl SharedLayout {
    #[must_use]
    pub fn new(control: Rect, knob_size: f64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LayoutBox { control, knob_size })),
        }
    }

    /// Replaces the control box, e.g. after a viewport resize.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::GeometryUnavailable`] if the lock is poisoned.
    pub fn set_control(&self, control: Rect) -> Result<()> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        guard.control = control;
        Ok(())
    }

    fn snapshot(&self) -> Result<LayoutBox> {
        self.inner.read().map(|guard| *guard).map_err(|_| poisoned())
    }
}

fn poisoned() -> ConsoleError {
    ConsoleError::GeometryUnavailable("layout lock poisoned".to_string())
}

impl ElementLayout for SharedLayout {
    fn control_bounds(&self) -> Result<Rect> {
        Ok(self.snapshot()?.control)
    }

    fn knob_bounds(&self) -> Result<Rect> {
        let layout = self.snapshot()?;
        let center = layout.control.center();
        let half = layout.knob_size / 2.0;
        Ok(Rect::new(center.x - half, center.y - half, layout.knob_size, layout.knob_size))
    }
}
