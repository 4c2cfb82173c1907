//! Sensor subsystem — reading validation and the DS18B20 probe driver.
//!
//! The probe driver only knows how to run a bus transaction.  Whether the
//! number it hands back is believable is decided here, once, so the
//! control core only ever sees validated [`Temperature`]s.

pub mod temperature;

use crate::app::ports::SensorPort;
use crate::config::SystemConfig;
use crate::error::SensorError;

/// Where a temperature value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Measured by the on-board probe.
    Local,
    /// Received from the broker (weather feed).
    Remote,
}

impl Provenance {
    /// Panel label for a temperature of this origin.
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "Room",
            Self::Remote => "Out",
        }
    }
}

/// A temperature value in °C tagged with its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub celsius: f32,
    pub provenance: Provenance,
}

impl Temperature {
    pub fn local(celsius: f32) -> Self {
        Self {
            celsius,
            provenance: Provenance::Local,
        }
    }
}

/// Acceptance envelope for probe readings.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    min_c: f32,
    max_c: f32,
    sentinel_c: f32,
    epsilon: f32,
}

impl Validator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            min_c: config.sensor_min_c,
            max_c: config.sensor_max_c,
            sentinel_c: config.sensor_sentinel_c,
            epsilon: config.sensor_sentinel_epsilon,
        }
    }

    /// Classify a raw reading.  Bounds are exclusive: the envelope edges
    /// themselves are rejected.
    pub fn check(&self, celsius: f32) -> Result<f32, SensorError> {
        if !celsius.is_finite() {
            return Err(SensorError::NotFinite);
        }
        if celsius <= self.min_c || celsius >= self.max_c {
            return Err(SensorError::OutOfRange);
        }
        if (celsius - self.sentinel_c).abs() < self.epsilon {
            return Err(SensorError::PowerOnSentinel);
        }
        Ok(celsius)
    }

    pub fn is_valid(&self, celsius: f32) -> bool {
        self.check(celsius).is_ok()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&SystemConfig::default())
    }
}

/// `true` if a local probe reading is usable with the default envelope.
pub fn is_valid(celsius: f32) -> bool {
    Validator::default().is_valid(celsius)
}

/// One sampling cycle: run the bus transaction and classify the result.
pub fn try_sample(port: &mut impl SensorPort, validator: &Validator) -> Result<Temperature, SensorError> {
    let raw = port.read_probe()?;
    validator.check(raw).map(Temperature::local)
}
