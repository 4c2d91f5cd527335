//! # Virtual Joystick Module
//!
//! Turns pointer gestures on one on-screen stick into a normalized
//! [`Vector2`].
//!
//! ## State Machine
//!
//! | Phase | Event | Next | Side effects |
//! |-------|-------|------|--------------|
//! | Idle | `Down` | Tracking | Refresh geometry, record press offset, cancel knob return |
//! | Tracking | `Down` | Tracking | None (the running gesture owns input) |
//! | Tracking | `Move` | Tracking | Clamp, translate knob, update value, `on_move` |
//! | Tracking | `Up` / `Cancel` | Idle | Value neutral, eased knob return, `on_end` |
//! | Idle | `Move` / `Up` / `Cancel` | Idle | None |
//!
//! The knob's return animation is tracked separately as [`KnobMotion`]; it
//! ends at [`JoystickController::settle`] once its deadline has passed, or
//! early when a new gesture starts.
//!
//! ## Geometry
//!
//! The contact point is the raw pointer position minus the press offset, so a
//! press that misses the knob center does not make the knob jump. Deflection
//! beyond `max_distance` is projected onto the travel circle along
//! `atan2(dy, dx)`. The reported value is the clamped deflection divided by
//! `max_distance`, with `y` negated so that up is positive.
//!
//! ## Usage
//!
//! ```
//! use rover_console::controller::input::PointerEvent;
//! use rover_console::controller::joystick::{JoystickController, JoystickObserver, JoystickSettings};
//! use rover_console::controller::layout::{Rect, SharedLayout};
//! use rover_console::controller::render::TracingRenderer;
//! use rover_console::controller::types::{ControllerIdentity, Point, Vector2};
//!
//! struct Ignore;
//! impl JoystickObserver for Ignore {
//!     fn on_move(&mut self, _: ControllerIdentity, _: Vector2) {}
//!     fn on_end(&mut self, _: ControllerIdentity) {}
//! }
//!
//! let id = ControllerIdentity::Left;
//! let mut stick = JoystickController::new(
//!     id,
//!     Box::new(SharedLayout::new(Rect::new(50.0, 50.0, 100.0, 100.0), 0.0)),
//!     Box::new(TracingRenderer::new(id)),
//!     JoystickSettings::default(),
//! )?;
//!
//! stick.handle(PointerEvent::Down(Point::new(100.0, 100.0)), &mut Ignore);
//! stick.handle(PointerEvent::Move(Point::new(120.0, 100.0)), &mut Ignore);
//! assert_eq!(stick.value().x(), 0.4);
//! # Ok::<(), rover_console::error::ConsoleError>(())
//! ```

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::input::PointerEvent;
use super::layout::{ElementLayout, Geometry};
use super::render::KnobRenderer;
use super::types::{ControllerIdentity, Point, Vector2};
use crate::error::Result;

/// Duration of the eased knob return after release.
pub const DEFAULT_RETURN_DURATION: Duration = Duration::from_millis(200);

/// Travel radius assumed until the first layout query succeeds.
pub const DEFAULT_FALLBACK_RADIUS: f64 = 50.0;

/// Receives gesture notifications from a joystick.
#[cfg_attr(test, mockall::automock)]
pub trait JoystickObserver {
    /// Called for every processed move while tracking.
    fn on_move(&mut self, identity: ControllerIdentity, value: Vector2);

    /// Called exactly once per gesture, on the transition back to idle.
    fn on_end(&mut self, identity: ControllerIdentity);
}

/// Tunables for a joystick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickSettings {
    /// Length of the knob return animation.
    pub return_duration: Duration,
    /// Initial travel radius in pixels, used until layout is known.
    pub fallback_radius: f64,
}

impl Default for JoystickSettings {
    fn default() -> Self {
        Self {
            return_duration: DEFAULT_RETURN_DURATION,
            fallback_radius: DEFAULT_FALLBACK_RADIUS,
        }
    }
}

/// One press-to-release interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    press_offset: Point,
}

impl Gesture {
    /// Initial contact point minus the knob's visual center at press time.
    #[must_use]
    pub fn press_offset(&self) -> Point {
        self.press_offset
    }
}

/// Gesture lifecycle of a joystick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Tracking(Gesture),
}

/// Visual state of the knob outside of tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnobMotion {
    /// No transition installed; moves render immediately.
    Resting,
    /// Eased return in progress until `deadline`.
    Returning { deadline: Instant },
}

/// Gesture state and normalized output of one on-screen stick.
pub struct JoystickController {
    identity: ControllerIdentity,
    layout: Box<dyn ElementLayout>,
    renderer: Box<dyn KnobRenderer>,
    settings: JoystickSettings,
    geometry: Geometry,
    phase: GesturePhase,
    value: Vector2,
    knob_offset: Point,
    motion: KnobMotion,
}

impl fmt::Debug for JoystickController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoystickController")
            .field("identity", &self.identity)
            .field("geometry", &self.geometry)
            .field("phase", &self.phase)
            .field("value", &self.value)
            .field("motion", &self.motion)
            .finish_non_exhaustive()
    }
}

impl JoystickController {
    /// Creates an idle joystick and reads its initial geometry.
    ///
    /// A failing layout query is not an error here: the joystick starts with
    /// the fallback radius and retries on the next press or resize.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryUnavailable`](crate::error::ConsoleError::GeometryUnavailable)
    /// if `settings.fallback_radius` is not a positive finite number.
    pub fn new(
        identity: ControllerIdentity,
        layout: Box<dyn ElementLayout>,
        renderer: Box<dyn KnobRenderer>,
        settings: JoystickSettings,
    ) -> Result<Self> {
        let geometry = Geometry::fallback(settings.fallback_radius)?;
        let mut controller = Self {
            identity,
            layout,
            renderer,
            settings,
            geometry,
            phase: GesturePhase::Idle,
            value: Vector2::NEUTRAL,
            knob_offset: Point::ZERO,
            motion: KnobMotion::Resting,
        };
        controller.recompute_geometry();
        controller.renderer.translate(0.0, 0.0);
        Ok(controller)
    }

    #[must_use]
    pub fn identity(&self) -> ControllerIdentity {
        self.identity
    }

    /// Current normalized value. Neutral whenever the stick is not tracking.
    #[must_use]
    pub fn value(&self) -> Vector2 {
        self.value
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, GesturePhase::Tracking(_))
    }

    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Knob displacement from rest in pixels, already clamped.
    #[must_use]
    pub fn knob_offset(&self) -> Point {
        self.knob_offset
    }

    #[must_use]
    pub fn knob_motion(&self) -> KnobMotion {
        self.motion
    }

    /// Applies one pointer event to the gesture state machine.
    pub fn handle(&mut self, event: PointerEvent, observer: &mut dyn JoystickObserver) {
        match event {
            PointerEvent::Down(point) => self.press(point),
            PointerEvent::Move(point) => self.track(point, observer),
            PointerEvent::Up | PointerEvent::Cancel => self.release(observer),
        }
    }

    /// Re-reads center and travel radius from the layout.
    ///
    /// Returns `false` and keeps the previous geometry if the layout cannot be
    /// read or yields an unusable geometry.
    pub fn recompute_geometry(&mut self) -> bool {
        let measured = self.layout.control_bounds().and_then(|control| {
            let knob = self.layout.knob_bounds()?;
            Geometry::from_rects(&control, &knob)
        });

        match measured {
            Ok(geometry) => {
                if geometry != self.geometry {
                    debug!(
                        "{} geometry: center ({:.1}, {:.1}), radius {:.1}",
                        self.identity, geometry.center.x, geometry.center.y, geometry.max_distance
                    );
                }
                self.geometry = geometry;
                true
            }
            Err(e) => {
                warn!("{} keeping last known geometry: {}", self.identity, e);
                false
            }
        }
    }

    /// Finishes the knob return once its deadline has passed.
    ///
    /// Returns `true` if the transition was cleared by this call.
    pub fn settle(&mut self, now: Instant) -> bool {
        match self.motion {
            KnobMotion::Returning { deadline } if now >= deadline => {
                self.renderer.clear_transition();
                self.motion = KnobMotion::Resting;
                true
            }
            _ => false,
        }
    }

    fn press(&mut self, contact: Point) {
        if self.is_tracking() {
            debug!("{} already tracking, ignoring press", self.identity);
            return;
        }

        self.recompute_geometry();
        self.cancel_return();

        let knob_center = match self.layout.knob_bounds() {
            Ok(knob) => knob.center(),
            Err(e) => {
                debug!("{} knob bounds unavailable, using last offset: {}", self.identity, e);
                self.geometry.center + self.knob_offset
            }
        };

        let press_offset = contact - knob_center;
        self.phase = GesturePhase::Tracking(Gesture { press_offset });
        debug!(
            "{} gesture started (press offset {:.1}, {:.1})",
            self.identity, press_offset.x, press_offset.y
        );
    }

    fn track(&mut self, raw: Point, observer: &mut dyn JoystickObserver) {
        let GesturePhase::Tracking(gesture) = self.phase else {
            return;
        };

        let radius = self.geometry.max_distance;
        let contact = raw - gesture.press_offset;
        let delta = clamp_to_radius(contact - self.geometry.center, radius);

        self.knob_offset = delta;
        self.renderer.translate(delta.x, delta.y);

        // Screen y grows downward; pushing up is forward.
        self.value = Vector2::new(delta.x / radius, -delta.y / radius);
        observer.on_move(self.identity, self.value);
    }

    fn release(&mut self, observer: &mut dyn JoystickObserver) {
        if !self.is_tracking() {
            return;
        }

        self.phase = GesturePhase::Idle;
        self.value = Vector2::NEUTRAL;
        self.knob_offset = Point::ZERO;

        let duration = self.settings.return_duration;
        self.renderer.begin_return(duration);
        self.motion = KnobMotion::Returning {
            deadline: Instant::now() + duration,
        };

        debug!("{} gesture ended", self.identity);
        observer.on_end(self.identity);
    }

    fn cancel_return(&mut self) {
        if let KnobMotion::Returning { .. } = self.motion {
            self.renderer.clear_transition();
            self.motion = KnobMotion::Resting;
        }
    }
}

/// Projects `delta` onto the circle of `radius` if it lies outside it.
///
/// # Examples
///
/// ```
/// use rover_console::controller::joystick::clamp_to_radius;
/// use rover_console::controller::types::Point;
///
/// assert_eq!(clamp_to_radius(Point::new(20.0, 0.0), 50.0), Point::new(20.0, 0.0));
/// assert_eq!(clamp_to_radius(Point::new(100.0, 0.0), 50.0), Point::new(50.0, 0.0));
/// ```
#[must_use]
pub fn clamp_to_radius(delta: Point, radius: f64) -> Point {
    if delta.length() <= radius {
        return delta;
    }
    let angle = delta.y.atan2(delta.x);
    Point::new(angle.cos() * radius, angle.sin() * radius)
}
