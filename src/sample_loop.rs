//! # Sample Loop
//!
//! Fixed-cadence sampler that forwards the value of every tracking stick as a
//! `joystick_movement` message.
//!
//! ## Rules
//!
//! - At most one message per stick per tick
//! - Idle sticks send nothing; their single neutral message is sent by the
//!   console when the gesture ends
//! - Missed ticks are delayed, never burst
//! - Sends are fire-and-forget; a tick never waits on the channel

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::channel::{emit, ChannelAdapter};
use crate::controller::registry::JoystickRegistry;
use crate::protocol::messages::{JoystickMovement, Outbound};

/// Default sample period
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// Default number of ticks between summary log lines (one minute at 10Hz)
pub const DEFAULT_LOG_INTERVAL_TICKS: u64 = 600;

/// Periodic joystick sampler with tick/sample counters.
#[derive(Debug, Clone)]
pub struct SampleLoop {
    period: Duration,
    log_interval_ticks: u64,
    ticks: u64,
    samples: u64,
    last_log_tick: u64,
}

impl SampleLoop {
    /// # Arguments
    ///
    /// * `period` - Time between ticks
    /// * `log_interval_ticks` - Ticks between `info!` summaries (0 disables)
    #[must_use]
    pub fn new(period: Duration, log_interval_ticks: u64) -> Self {
        Self {
            period,
            log_interval_ticks,
            ticks: 0,
            samples: 0,
            last_log_tick: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks processed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Messages sent so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Ticker for this loop's period.
    ///
    /// The first tick fires one period from now. Must be called inside a
    /// tokio runtime.
    pub fn ticker(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Run one tick: send the value of each tracking stick.
    ///
    /// # Returns
    ///
    /// * `usize` - Number of messages sent on this tick
    pub fn sample(&mut self, registry: &JoystickRegistry, channel: &dyn ChannelAdapter) -> usize {
        self.ticks += 1;

        let mut sent = 0;
        for stick in registry.iter().filter(|stick| stick.is_tracking()) {
            let movement = JoystickMovement::new(stick.identity(), stick.value());
            emit(channel, &Outbound::JoystickMovement(movement));
            sent += 1;
        }
        self.samples += sent as u64;

        if sent > 0 {
            debug!("Tick {}: sampled {} joystick(s)", self.ticks, sent);
        }

        if self.log_interval_ticks > 0 && self.ticks - self.last_log_tick >= self.log_interval_ticks {
            info!(
                "Sample loop: {} ticks, {} joystick samples sent ({}ms period)",
                self.ticks,
                self.samples,
                self.period.as_millis()
            );
            self.last_log_tick = self.ticks;
        }

        sent
    }
}

impl Default for SampleLoop {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_PERIOD, DEFAULT_LOG_INTERVAL_TICKS)
    }
}
