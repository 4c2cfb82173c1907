//! Shared mutable context owned by the application service.
//!
//! `FanContext` is the single struct the control loop reads from and writes
//! to: fan mode and actuator state, thresholds, the last valid local
//! reading, the display-only weather cache and the redraw dirty flag.
//! Think of it as the "blackboard" in a blackboard architecture.

use heapless::String;

use crate::config::SystemConfig;
use crate::control::thresholds::ThresholdStore;
use crate::sensors::{Temperature, Validator};

use super::FanController;

/// Capacity of a formatted reading (`-1013.25` fits comfortably).
pub const VALUE_CAP: usize = 16;
/// Capacity of a clock label (`HH:MM`).
pub const STAMP_CAP: usize = 8;

// ---------------------------------------------------------------------------
// Weather cache (display only, never published)
// ---------------------------------------------------------------------------

/// Remote weather quantities mirrored from the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherField {
    Temperature,
    Humidity,
    Pressure,
}

impl WeatherField {
    /// Fixed display precision per quantity.
    pub fn decimals(self) -> usize {
        match self {
            Self::Temperature => 1,
            Self::Humidity | Self::Pressure => 0,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "C",
            Self::Humidity => "%",
            Self::Pressure => "hPa",
        }
    }
}

/// Last formatted value per weather field plus when any of them changed.
#[derive(Debug, Clone, Default)]
pub struct WeatherCache {
    pub temperature: Option<String<VALUE_CAP>>,
    pub humidity: Option<String<VALUE_CAP>>,
    pub pressure: Option<String<VALUE_CAP>>,
    /// Wall-clock label of the last update, `None` before the clock syncs.
    pub last_update: Option<String<STAMP_CAP>>,
    /// Set once any field was received, even before the clock syncs.
    pub updated: bool,
}

impl WeatherCache {
    pub fn slot_mut(&mut self, field: WeatherField) -> &mut Option<String<VALUE_CAP>> {
        match field {
            WeatherField::Temperature => &mut self.temperature,
            WeatherField::Humidity => &mut self.humidity,
            WeatherField::Pressure => &mut self.pressure,
        }
    }

    pub fn get(&self, field: WeatherField) -> Option<&str> {
        match field {
            WeatherField::Temperature => self.temperature.as_deref(),
            WeatherField::Humidity => self.humidity.as_deref(),
            WeatherField::Pressure => self.pressure.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// FanContext
// ---------------------------------------------------------------------------

pub struct FanContext {
    // -- Control --
    pub fan: FanController,
    pub thresholds: ThresholdStore,
    /// Last validated local reading.  `None` until the first valid sample
    /// after cold start; never cleared afterwards.
    pub last_valid: Option<Temperature>,
    pub validator: Validator,

    // -- Display --
    pub weather: WeatherCache,
    /// Set by every mutation; cleared when the display redraws.
    pub dirty: bool,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FanContext {
    /// Cold-start context: automatic mode, fan off, default thresholds,
    /// no reading.  Dirty so the first loop iteration draws the screen.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            fan: FanController::new(),
            thresholds: ThresholdStore::new(&config),
            last_valid: None,
            validator: Validator::new(&config),
            weather: WeatherCache::default(),
            dirty: true,
            config,
        }
    }

    /// Last valid local reading in °C.
    pub fn last_valid_c(&self) -> Option<f32> {
        self.last_valid.map(|t| t.celsius)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Consume the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }
}
