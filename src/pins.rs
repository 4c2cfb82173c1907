//! GPIO / peripheral pin assignments for the ThermoFan board (ESP32 DevKit).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Fan relay
// ---------------------------------------------------------------------------

/// Digital output driving the fan relay module.
pub const FAN_RELAY_GPIO: i32 = 26;
/// Relay modules on this board are active HIGH.
pub const FAN_RELAY_ACTIVE_HIGH: bool = true;

// ---------------------------------------------------------------------------
// DS18B20 temperature probe (1-Wire, external 4.7 kΩ pull-up)
// ---------------------------------------------------------------------------

pub const ONE_WIRE_GPIO: i32 = 4;

