//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the DS18B20 probe and the fan relay, exposing them through
//! [`SensorPort`] and [`FanPort`].  This is the only module in the system
//! that touches the probe and relay.  On non-espidf targets, the underlying
//! drivers use cfg-gated simulation stubs.

use crate::app::ports::{FanPort, SensorPort};
use crate::drivers::fan_relay::FanRelay;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::temperature::TemperatureProbe;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    probe: TemperatureProbe,
    relay: FanRelay,
}

impl HardwareAdapter {
    pub fn new(probe: TemperatureProbe, relay: FanRelay) -> Self {
        Self { probe, relay }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_probe(&mut self) -> Result<f32, SensorError> {
        self.probe.read()
    }
}

// ── FanPort implementation ────────────────────────────────────

impl FanPort for HardwareAdapter {
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.relay.set(on)
    }

    fn is_fan_on(&self) -> bool {
        self.relay.is_on()
    }
}
