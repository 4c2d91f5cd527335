//! # Joystick Value Types
//!
//! Pixel-space points, the normalized stick vector, and stick identities.
//!
//! ## Coordinate Spaces
//!
//! | Type | Space | Range | Y direction |
//! |------|-------|-------|-------------|
//! | [`Point`] | Screen pixels | Unbounded | Down is positive |
//! | [`Vector2`] | Normalized deflection | -1.0 to 1.0 | Up is positive |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConsoleError;

/// Lower bound of a normalized axis.
pub const AXIS_MIN: f64 = -1.0;
/// Upper bound of a normalized axis.
pub const AXIS_MAX: f64 = 1.0;

/// A position or offset in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin / zero offset.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of this point taken as an offset.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// True when both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Normalized stick deflection.
///
/// Both components are always within `[-1.0, 1.0]`; the constructor clamps.
/// `y` is positive when the stick is pushed up (forward).
///
/// # Examples
///
/// ```
/// use rover_console::controller::types::Vector2;
///
/// let v = Vector2::new(1.5, -0.25);
/// assert_eq!(v.x(), 1.0);
/// assert_eq!(v.y(), -0.25);
/// assert!(Vector2::NEUTRAL.is_neutral());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    x: f64,
    y: f64,
}

impl Vector2 {
    /// Centered stick.
    pub const NEUTRAL: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    /// Creates a vector, clamping each component into `[-1.0, 1.0]`.
    ///
    /// NaN components collapse to zero.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Self::clamp_axis(x),
            y: Self::clamp_axis(y),
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Magnitude of the deflection (0.0 at rest, 1.0 at the rim).
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    #[inline]
    fn clamp_axis(value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        // + 0.0 turns -0.0 into 0.0
        value.clamp(AXIS_MIN, AXIS_MAX) + 0.0
    }
}

/// Which on-screen stick produced a value.
///
/// The left stick drives the vehicle, the right stick aims the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerIdentity {
    #[serde(alias = "leftJoystick")]
    Left,
    #[serde(alias = "rightJoystick")]
    Right,
}

impl ControllerIdentity {
    /// Every identity, in registry order.
    pub const ALL: [ControllerIdentity; 2] = [ControllerIdentity::Left, ControllerIdentity::Right];

    /// Wire name used in `joystick_movement` payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerIdentity::Left => "left",
            ControllerIdentity::Right => "right",
        }
    }
}

impl fmt::Display for ControllerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerIdentity {
    type Err = ConsoleError;

    /// Accepts both wire names and the page element ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" | "leftJoystick" => Ok(ControllerIdentity::Left),
            "right" | "rightJoystick" => Ok(ControllerIdentity::Right),
            other => Err(ConsoleError::Protocol(format!(
                "unknown joystick identity: {}",
                other
            ))),
        }
    }
}
