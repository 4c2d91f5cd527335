//! # Console
//!
//! Ties the sticks, status board, chat log and sample loop to the vehicle
//! channel.
//!
//! Everything runs on one task: host input, inbound frames and sample ticks
//! are interleaved by a single `select!` loop, so the registry is owned and
//! never locked.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::{emit, ChannelAdapter};
use crate::config::Config;
use crate::controller::input::{
    from_mouse, from_touch, MouseEvent, PointerEvent, PointerSource, TouchEvent,
};
use crate::controller::joystick::{JoystickController, JoystickObserver};
use crate::controller::layout::{Rect, SharedLayout};
use crate::controller::registry::JoystickRegistry;
use crate::controller::render::TracingRenderer;
use crate::controller::types::{ControllerIdentity, Vector2};
use crate::error::Result;
use crate::host::HostEvent;
use crate::protocol::messages::{
    InboundEvent, JoystickMovement, Outbound, AUTONOMOUS_OFF_COMMAND, AUTONOMOUS_ON_COMMAND,
};
use crate::sample_loop::SampleLoop;
use crate::status::{ChatKind, ChatLog, StatusBoard, CHAT_CAPACITY};

/// Layout handles the host updates on resize.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub left: SharedLayout,
    pub right: SharedLayout,
}

impl Viewport {
    pub fn new(left: Rect, right: Rect, knob_size: f64) -> Self {
        Self {
            left: SharedLayout::new(left, knob_size),
            right: SharedLayout::new(right, knob_size),
        }
    }

    pub fn get(&self, identity: ControllerIdentity) -> &SharedLayout {
        match identity {
            ControllerIdentity::Left => &self.left,
            ControllerIdentity::Right => &self.right,
        }
    }
}

/// Totals reported when the console stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleStats {
    pub ticks: u64,
    pub samples: u64,
    pub host_events: u64,
    pub inbound_events: u64,
}

/// Reflects gestures on the status board; a released stick sends one
/// neutral sample immediately.
struct GestureObserver<'a> {
    status: &'a mut StatusBoard,
    channel: &'a dyn ChannelAdapter,
}

impl JoystickObserver for GestureObserver<'_> {
    fn on_move(&mut self, identity: ControllerIdentity, value: Vector2) {
        self.status.on_move(identity, value);
    }

    fn on_end(&mut self, identity: ControllerIdentity) {
        self.status.on_end(identity);
        emit(
            self.channel,
            &Outbound::JoystickMovement(JoystickMovement::neutral(identity)),
        );
    }
}

/// Operator console state and event handling.
pub struct Console {
    registry: JoystickRegistry,
    viewport: Viewport,
    channel: Arc<dyn ChannelAdapter>,
    status: StatusBoard,
    chat: ChatLog,
    sampler: SampleLoop,
    host_events: u64,
    inbound_events: u64,
}

impl Console {
    pub fn new(
        registry: JoystickRegistry,
        viewport: Viewport,
        channel: Arc<dyn ChannelAdapter>,
        sampler: SampleLoop,
        status: StatusBoard,
    ) -> Self {
        Self {
            registry,
            viewport,
            channel,
            status,
            chat: ChatLog::new(CHAT_CAPACITY),
            sampler,
            host_events: 0,
            inbound_events: 0,
        }
    }

    /// Build both sticks and the sample loop from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a stick cannot be created (invalid fallback radius)
    pub fn from_config(config: &Config, channel: Arc<dyn ChannelAdapter>) -> Result<Self> {
        let viewport = Viewport::new(config.layout.left, config.layout.right, config.layout.knob_size);
        let settings = config.joystick.settings();

        let stick = |identity: ControllerIdentity| {
            JoystickController::new(
                identity,
                Box::new(viewport.get(identity).clone()),
                Box::new(TracingRenderer::new(identity)),
                settings,
            )
        };
        let registry = JoystickRegistry::new(
            stick(ControllerIdentity::Left)?,
            stick(ControllerIdentity::Right)?,
        );

        let sampler = SampleLoop::new(config.sample.period(), config.sample.log_interval_ticks);
        let status = StatusBoard::new(config.session.default_speed);

        Ok(Self::new(registry, viewport, channel, sampler, status))
    }

    pub fn registry(&self) -> &JoystickRegistry {
        &self.registry
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn stats(&self) -> ConsoleStats {
        ConsoleStats {
            ticks: self.sampler.ticks(),
            samples: self.sampler.samples(),
            host_events: self.host_events,
            inbound_events: self.inbound_events,
        }
    }

    /// Apply one host input event.
    pub fn handle_host_event(&mut self, event: HostEvent) {
        self.host_events += 1;

        match event {
            HostEvent::Mouse { target, kind, client_x, client_y } => {
                let pointer = from_mouse(&MouseEvent { kind, client_x, client_y });
                self.apply_pointer(PointerSource::Mouse, target, pointer);
            }
            HostEvent::Touch { target, kind, touches } => {
                let pointer = from_touch(&TouchEvent { kind, touches });
                self.apply_pointer(PointerSource::Touch, target, pointer);
            }
            HostEvent::Resize { left, right } => self.resize(left, right),
            HostEvent::Speed { value } => self.set_speed(value),
            HostEvent::Text { command } => self.send_text_command(&command),
            HostEvent::ToggleAutonomous => self.toggle_autonomous(),
        }
    }

    /// Apply one inbound channel event to the chat log.
    pub fn handle_inbound(&mut self, event: InboundEvent) {
        self.inbound_events += 1;

        match event {
            InboundEvent::Connect => self.chat.push(ChatKind::System, "Connected to server"),
            InboundEvent::Disconnect => self.chat.push(ChatKind::System, "Disconnected from server"),
            InboundEvent::VoiceCommand { command } => {
                self.chat.push(ChatKind::User, format!("You said: {}", command))
            }
            InboundEvent::AiResponse { response } => self.chat.push(ChatKind::Ai, response),
            InboundEvent::Other(name) => debug!("Ignoring inbound event '{}'", name),
        }
    }

    /// Run one sample tick.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.registry.settle(now);
        self.sampler.sample(&self.registry, self.channel.as_ref())
    }

    /// Send an operator text command; blank commands are dropped.
    pub fn send_text_command(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            debug!("Ignoring empty text command");
            return;
        }

        self.chat.push(ChatKind::User, command);
        emit(
            self.channel.as_ref(),
            &Outbound::TextCommand { command: command.to_string() },
        );
    }

    pub fn set_speed(&mut self, speed: u8) {
        let speed = self.status.set_speed(speed);
        emit(self.channel.as_ref(), &Outbound::SpeedChange { speed });
    }

    pub fn toggle_autonomous(&mut self) {
        let (line, command) = if self.status.toggle_autonomous() {
            ("Autonomous mode activated", AUTONOMOUS_ON_COMMAND)
        } else {
            ("Autonomous mode deactivated", AUTONOMOUS_OFF_COMMAND)
        };

        self.chat.push(ChatKind::System, line);
        emit(
            self.channel.as_ref(),
            &Outbound::TextCommand { command: command.to_string() },
        );
    }

    fn apply_pointer(
        &mut self,
        source: PointerSource,
        target: Option<ControllerIdentity>,
        pointer: Result<PointerEvent>,
    ) {
        match pointer {
            Ok(pointer) => self.dispatch(source, target, pointer),
            Err(e) => debug!("Ignoring pointer event: {}", e),
        }
    }

    fn dispatch(&mut self, source: PointerSource, target: Option<ControllerIdentity>, pointer: PointerEvent) {
        let mut observer = GestureObserver {
            status: &mut self.status,
            channel: self.channel.as_ref(),
        };
        self.registry.dispatch(source, target, pointer, &mut observer);
    }

    fn resize(&mut self, left: Option<Rect>, right: Option<Rect>) {
        for (identity, rect) in [(ControllerIdentity::Left, left), (ControllerIdentity::Right, right)] {
            if let Some(rect) = rect {
                if let Err(e) = self.viewport.get(identity).set_control(rect) {
                    warn!("Failed to apply {} layout: {}", identity, e);
                }
            }
        }

        let measured = self.registry.resize();
        debug!("Viewport resized, {} of 2 joysticks measured", measured);
    }

    /// Run until cancelled or host input ends.
    ///
    /// Due ticks take priority over queued input, so a flood of host events
    /// cannot starve sampling.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Host input events; the console stops when this closes
    /// * `inbound` - Decoded channel events; closing it only stops reading it
    /// * `shutdown` - Cancellation token; stops the loop before the next tick
    ///
    /// # Returns
    ///
    /// * `ConsoleStats` - Totals at shutdown
    pub async fn run(
        &mut self,
        inputs: mpsc::Receiver<HostEvent>,
        inbound: mpsc::Receiver<InboundEvent>,
        shutdown: CancellationToken,
    ) -> ConsoleStats {
        info!(
            "Console running, sampling every {}ms",
            self.sampler.period().as_millis()
        );

        let ticker = self.sampler.ticker();
        self.drive(ticker, inputs, inbound, shutdown).await
    }

    async fn drive(
        &mut self,
        mut ticker: Interval,
        mut inputs: mpsc::Receiver<HostEvent>,
        mut inbound: mpsc::Receiver<InboundEvent>,
        shutdown: CancellationToken,
    ) -> ConsoleStats {
        let mut inbound_open = true;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }

                now = ticker.tick() => {
                    self.tick(now);
                }

                input = inputs.recv() => match input {
                    Some(event) => self.handle_host_event(event),
                    None => {
                        info!("Host input ended");
                        break;
                    }
                },

                event = inbound.recv(), if inbound_open => match event {
                    Some(event) => self.handle_inbound(event),
                    None => {
                        debug!("Inbound channel closed");
                        inbound_open = false;
                    }
                },
            }
        }

        self.stats()
    }
}
