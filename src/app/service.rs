//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the [`FanContext`] and exposes the three entry
//! points that can change the fan: a completed sampling cycle, an inbound
//! mode change and an inbound threshold change.  All I/O flows through
//! port traits injected at call sites, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ StatePublisher
//!                 │       AppService       │ ──▶ EventSink
//!     FanPort ◀── │  FSM · Thresholds      │
//!                 └────────────────────────┘
//! ```

use core::fmt::Write as _;

use heapless::String;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::thresholds::Thresholds;
use crate::display::DisplayModel;
use crate::fsm::context::{FanContext, VALUE_CAP, WeatherCache, WeatherField};
use crate::fsm::{FanMode, FanState, Transition};
use crate::sensors;

use super::commands::AppCommand;
use super::events::{AppEvent, Publication, StateSnapshot};
use super::ports::{ClockPort, EventSink, FanPort, SensorPort, StatePublisher};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    ctx: FanContext,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the relay — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            ctx: FanContext::new(config),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the relay to the cold-start state (off) and announce it.
    pub fn start(&mut self, hw: &mut impl FanPort, sink: &mut impl EventSink) {
        let state = self.ctx.fan.state();
        if let Err(e) = hw.set_fan(state.is_on()) {
            warn!("Relay init write failed: {}", e);
            sink.emit(&AppEvent::ActuatorFault(e));
        }
        sink.emit(&AppEvent::Started {
            mode: self.ctx.fan.mode(),
            state,
        });
        info!("AppService started: mode={} fan={:?}", self.ctx.fan.mode().name(), state);
    }

    // ── Entry point (a): sampling cycle ───────────────────────

    /// Run one sampling cycle: read and validate the probe, publish an
    /// accepted reading, then evaluate the fan.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`FanPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn on_sample(
        &mut self,
        hw: &mut (impl SensorPort + FanPort),
        publisher: &mut impl StatePublisher,
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        match sensors::try_sample(hw, &self.ctx.validator) {
            Ok(reading) => {
                self.ctx.last_valid = Some(reading);
                self.ctx.mark_dirty();
                sink.emit(&AppEvent::SampleAccepted(reading.celsius));
                publisher.publish(&Publication::LocalTemperature(reading.celsius));
            }
            // Last known good value stays in place.
            Err(e) => sink.emit(&AppEvent::SampleRejected(e)),
        }
        self.evaluate(hw, publisher, sink)
    }

    // ── Entry points (b) and (c): inbound commands ────────────

    /// Process a decoded inbound command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl FanPort,
        publisher: &mut impl StatePublisher,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        match cmd {
            AppCommand::SetMode(mode) => {
                let from = self.ctx.fan.mode();
                self.ctx.fan.set_mode(mode);
                self.ctx.mark_dirty();
                sink.emit(&AppEvent::ModeChanged { from, to: mode });
                publisher.publish(&Publication::Mode(mode));
                self.evaluate(hw, publisher, sink)
            }
            AppCommand::SetActivate(requested) => {
                self.ctx.thresholds.set_activate(requested);
                self.after_threshold_change(requested, hw, publisher, sink)
            }
            AppCommand::SetDeactivate(requested) => {
                self.ctx.thresholds.set_deactivate(requested);
                self.after_threshold_change(requested, hw, publisher, sink)
            }
            AppCommand::Weather { field, value } => {
                self.update_weather(field, value, clock, sink);
                None
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Retained state for the reconnect replay.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            mode: self.ctx.fan.mode(),
            thresholds: self.ctx.thresholds.get(),
            state: self.ctx.fan.state(),
            last_valid_c: self.ctx.last_valid_c(),
        }
    }

    /// Read-only view for the display presenter.
    pub fn display_model(&self) -> DisplayModel {
        DisplayModel::from_context(&self.ctx)
    }

    pub fn mode(&self) -> FanMode {
        self.ctx.fan.mode()
    }

    pub fn fan_state(&self) -> FanState {
        self.ctx.fan.state()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.ctx.thresholds.get()
    }

    pub fn last_valid_c(&self) -> Option<f32> {
        self.ctx.last_valid_c()
    }

    pub fn weather(&self) -> &WeatherCache {
        &self.ctx.weather
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    pub fn is_dirty(&self) -> bool {
        self.ctx.dirty
    }

    /// Consume the redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        self.ctx.take_dirty()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Evaluate the state machine and, on a change only, write the relay
    /// and publish the new state.  Without a change, a relay left behind by
    /// a failed write is driven again.
    fn evaluate(
        &mut self,
        hw: &mut impl FanPort,
        publisher: &mut impl StatePublisher,
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        let last_valid_c = self.ctx.last_valid_c();
        let Some(transition) = self.ctx.fan.evaluate(last_valid_c, self.ctx.thresholds.get())
        else {
            self.reconcile_relay(hw, sink);
            return None;
        };

        if let Err(e) = hw.set_fan(transition.to.is_on()) {
            warn!("Relay write failed: {}", e);
            sink.emit(&AppEvent::ActuatorFault(e));
        }
        self.ctx.mark_dirty();
        sink.emit(&AppEvent::FanSwitched {
            from: transition.from,
            to: transition.to,
            mode: self.ctx.fan.mode(),
            celsius: last_valid_c,
        });
        publisher.publish(&Publication::FanState(transition.to));
        Some(transition)
    }

    fn reconcile_relay(&self, hw: &mut impl FanPort, sink: &mut impl EventSink) {
        let state = self.ctx.fan.state();
        if hw.is_fan_on() == state.is_on() {
            return;
        }
        match hw.set_fan(state.is_on()) {
            Ok(()) => info!("Relay re-driven to {}", state.as_payload()),
            Err(e) => {
                warn!("Relay retry failed: {}", e);
                sink.emit(&AppEvent::ActuatorFault(e));
            }
        }
    }

    fn after_threshold_change(
        &mut self,
        requested: f32,
        hw: &mut impl FanPort,
        publisher: &mut impl StatePublisher,
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        let thresholds = self.ctx.thresholds.get();
        self.ctx.mark_dirty();
        sink.emit(&AppEvent::ThresholdsChanged {
            thresholds,
            requested,
        });
        // Both values, so a clamp on one side is visible to subscribers.
        publisher.publish(&Publication::ActivateThreshold(thresholds.activate_c));
        publisher.publish(&Publication::DeactivateThreshold(thresholds.deactivate_c));

        if self.ctx.fan.mode() == FanMode::Auto {
            self.evaluate(hw, publisher, sink)
        } else {
            None
        }
    }

    fn update_weather(
        &mut self,
        field: WeatherField,
        value: f32,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let mut text: String<VALUE_CAP> = String::new();
        if write!(text, "{:.*}", field.decimals(), value).is_err() {
            warn!("Weather {:?} value {} does not fit the display", field, value);
            return;
        }
        *self.ctx.weather.slot_mut(field) = Some(text);
        self.ctx.weather.updated = true;
        if let Some(stamp) = clock.now_label() {
            self.ctx.weather.last_update = Some(stamp);
        }
        self.ctx.mark_dirty();
        sink.emit(&AppEvent::WeatherUpdated { field, value });
    }
}
