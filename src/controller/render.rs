//! Knob rendering sink.

use std::time::Duration;
use tracing::trace;

use super::types::ControllerIdentity;

/// Receives visual updates for one joystick knob.
#[cfg_attr(test, mockall::automock)]
pub trait KnobRenderer: Send {
    /// Move the knob by `(dx, dy)` pixels from its rest position, without animation.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Start an eased return to the rest position lasting `duration`.
    fn begin_return(&mut self, duration: Duration);

    /// Drop the return transition so later moves are applied immediately.
    fn clear_transition(&mut self);
}

/// Renderer for headless hosts: reports knob motion to the trace log.
#[derive(Debug, Clone, Copy)]
pub struct TracingRenderer {
    identity: ControllerIdentity,
}

impl TracingRenderer {
    #[must_use]
    pub fn new(identity: ControllerIdentity) -> Self {
        Self { identity }
    }
}

impl KnobRenderer for TracingRenderer {
    fn translate(&mut self, dx: f64, dy: f64) {
        trace!("{} knob at ({:.1}, {:.1})", self.identity, dx, dy);
    }

    fn begin_return(&mut self, duration: Duration) {
        trace!("{} knob returning over {:?}", self.identity, duration);
    }

    fn clear_transition(&mut self) {
        trace!("{} knob at rest", self.identity);
    }
}
