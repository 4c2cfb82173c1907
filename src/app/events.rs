//! Outbound application events and publications.
//!
//! The [`AppService`](super::service::AppService) emits [`AppEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port for logging,
//! and [`Publication`]s through the
//! [`StatePublisher`](super::ports::StatePublisher) port for the broker.

use heapless::Vec;

use crate::control::thresholds::Thresholds;
use crate::error::{ActuatorError, SensorError};
use crate::fsm::context::WeatherField;
use crate::fsm::{FanMode, FanState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started { mode: FanMode, state: FanState },

    /// The relay changed state.
    FanSwitched {
        from: FanState,
        to: FanState,
        mode: FanMode,
        celsius: Option<f32>,
    },

    /// An inbound command selected a mode (possibly the current one).
    ModeChanged { from: FanMode, to: FanMode },

    /// A threshold command took effect.  `requested` differs from the
    /// stored value when it was clamped.
    ThresholdsChanged {
        thresholds: Thresholds,
        requested: f32,
    },

    /// A probe reading was accepted.
    SampleAccepted(f32),

    /// A probe reading was discarded.
    SampleRejected(SensorError),

    /// A weather field was updated for the display.
    WeatherUpdated { field: WeatherField, value: f32 },

    /// Writing the relay output failed.
    ActuatorFault(ActuatorError),
}

/// A retained state item destined for the broker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Publication {
    /// `online` / `offline`.
    Availability(bool),
    Mode(FanMode),
    ActivateThreshold(f32),
    DeactivateThreshold(f32),
    FanState(FanState),
    LocalTemperature(f32),
}

/// Everything the broker must hold after a (re)connect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSnapshot {
    pub mode: FanMode,
    pub thresholds: Thresholds,
    pub state: FanState,
    pub last_valid_c: Option<f32>,
}

impl StateSnapshot {
    /// Replay order: mode, activate, deactivate, fan state, then the local
    /// temperature if one was ever measured.
    pub fn publications(&self) -> Vec<Publication, 5> {
        let mut out = Vec::new();
        // Capacity is exactly the number of pushes below.
        let _ = out.push(Publication::Mode(self.mode));
        let _ = out.push(Publication::ActivateThreshold(self.thresholds.activate_c));
        let _ = out.push(Publication::DeactivateThreshold(self.thresholds.deactivate_c));
        let _ = out.push(Publication::FanState(self.state));
        if let Some(c) = self.last_valid_c {
            let _ = out.push(Publication::LocalTemperature(c));
        }
        out
    }
}
