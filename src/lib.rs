//! ThermoFan firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod fsm;
pub mod mqtt;
pub mod pins;
pub mod runtime;
pub mod scheduler;
pub mod sensors;

// Hardware-facing modules; the ESP-IDF implementations are guarded by cfg
// attributes inside, host builds get simulation stubs.
pub mod adapters;
pub mod drivers;
