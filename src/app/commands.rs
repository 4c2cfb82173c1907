//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the broker,
//! via [`crate::mqtt::codec::decode`]) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.
//! Payloads are already parsed and checked by the time they get here.

use crate::fsm::FanMode;
use crate::fsm::context::WeatherField;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Select the control strategy.
    SetMode(FanMode),

    /// Propose a new activation threshold (°C).  May be clamped.
    SetActivate(f32),

    /// Propose a new deactivation threshold (°C).  May be clamped.
    SetDeactivate(f32),

    /// Remote weather value for the display.
    Weather { field: WeatherField, value: f32 },
}
