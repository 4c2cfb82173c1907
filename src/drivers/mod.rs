//! Actuator drivers and hardware initialisation.

pub mod fan_relay;
pub mod hw_init;
