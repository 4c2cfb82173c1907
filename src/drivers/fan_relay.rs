//! Fan relay driver.
//!
//! Binary on/off output through a relay module on a single GPIO.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real GPIO via hw_init helpers.
//! On host/test: the same helpers record the level in memory.

use log::debug;

use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Released,
    Energised,
}

pub struct FanRelay {
    gpio: i32,
    state: RelayState,
}

impl Default for FanRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl FanRelay {
    /// Relay on the board's fan GPIO.  `hw_init::init_peripherals` has
    /// already released it.
    pub fn new() -> Self {
        Self::on_gpio(pins::FAN_RELAY_GPIO)
    }

    pub fn on_gpio(gpio: i32) -> Self {
        Self {
            gpio,
            state: RelayState::Released,
        }
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        hw_init::gpio_write(self.gpio, hw_init::relay_level(on)).map_err(|rc| {
            log::error!("Relay GPIO{} write failed (rc={})", self.gpio, rc);
            ActuatorError::GpioWriteFailed
        })?;
        self.state = if on {
            RelayState::Energised
        } else {
            RelayState::Released
        };
        debug!("Relay GPIO{} -> {:?}", self.gpio, self.state);
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == RelayState::Energised
    }
}
