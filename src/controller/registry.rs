//! # Joystick Registry
//!
//! Owns the named on-screen sticks and routes pointer events to them.
//!
//! Press events only reach the stick they landed on. Moves and releases are
//! delivered to every stick whose gesture was started by the same input
//! modality, the way document-level listeners see them; each stick ignores
//! events unless it is tracking. A mouse leaving the page therefore never ends
//! a gesture held by a finger on the other stick.

use tokio::time::Instant;
use tracing::debug;

use super::input::{PointerEvent, PointerSource};
use super::joystick::{JoystickController, JoystickObserver};
use super::types::ControllerIdentity;

/// The left (drive) and right (camera) sticks.
#[derive(Debug)]
pub struct JoystickRegistry {
    left: JoystickController,
    right: JoystickController,
    /// Modality that started each stick's current gesture
    left_source: Option<PointerSource>,
    right_source: Option<PointerSource>,
}

impl JoystickRegistry {
    /// Builds a registry from the two sticks.
    ///
    /// # Panics
    ///
    /// Panics if the controllers' identities do not match their slots.
    #[must_use]
    pub fn new(left: JoystickController, right: JoystickController) -> Self {
        assert_eq!(left.identity(), ControllerIdentity::Left, "left slot needs the left stick");
        assert_eq!(right.identity(), ControllerIdentity::Right, "right slot needs the right stick");
        Self {
            left,
            right,
            left_source: None,
            right_source: None,
        }
    }

    #[must_use]
    pub fn get(&self, identity: ControllerIdentity) -> &JoystickController {
        match identity {
            ControllerIdentity::Left => &self.left,
            ControllerIdentity::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, identity: ControllerIdentity) -> &mut JoystickController {
        match identity {
            ControllerIdentity::Left => &mut self.left,
            ControllerIdentity::Right => &mut self.right,
        }
    }

    /// Iterates the sticks in registry order (left, then right).
    pub fn iter(&self) -> impl Iterator<Item = &JoystickController> {
        [&self.left, &self.right].into_iter()
    }

    /// Delivers a pointer event from `source`.
    ///
    /// `target` is the stick under the pointer for press events; presses
    /// without a target are dropped. Other events skip sticks whose gesture
    /// was started by a different modality.
    pub fn dispatch(
        &mut self,
        source: PointerSource,
        target: Option<ControllerIdentity>,
        event: PointerEvent,
        observer: &mut dyn JoystickObserver,
    ) {
        match event {
            PointerEvent::Down(_) => match target {
                Some(identity) => {
                    self.get_mut(identity).handle(event, observer);
                    let tracking = self.get(identity).is_tracking();
                    *self.source_mut(identity) = tracking.then_some(source);
                }
                None => debug!("Press outside any joystick ignored"),
            },
            _ => {
                for identity in ControllerIdentity::ALL {
                    if self.source_mut(identity).is_some_and(|owner| owner != source) {
                        continue;
                    }
                    self.get_mut(identity).handle(event, observer);
                    if !self.get(identity).is_tracking() {
                        *self.source_mut(identity) = None;
                    }
                }
            }
        }
    }

    fn source_mut(&mut self, identity: ControllerIdentity) -> &mut Option<PointerSource> {
        match identity {
            ControllerIdentity::Left => &mut self.left_source,
            ControllerIdentity::Right => &mut self.right_source,
        }
    }

    /// Recomputes geometry of every stick, tracking or not.
    ///
    /// Returns the number of sticks whose geometry could be read.
    pub fn resize(&mut self) -> usize {
        [&mut self.left, &mut self.right]
            .into_iter()
            .map(|stick| stick.recompute_geometry())
            .filter(|&ok| ok)
            .count()
    }

    /// Finishes knob return animations whose deadline has passed.
    pub fn settle(&mut self, now: Instant) {
        self.left.settle(now);
        self.right.settle(now);
    }
}
