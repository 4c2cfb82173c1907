//! Unified error types for the ThermoFan firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! pass through ports and log lines without allocation.
//!
//! Nothing in here is fatal: the control loop logs, keeps its last known
//! good state and carries on.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The probe could not be read or returned an implausible value.
    Sensor(SensorError),
    /// An actuator output could not be driven.
    Actuator(ActuatorError),
    /// The messaging transport failed.
    Comms(CommsError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No DS18B20 answered on the 1-Wire bus.
    NoDevice,
    /// The bus transaction failed (reset, CRC, timing).
    BusFault,
    /// Reading is NaN or infinite.
    NotFinite,
    /// Reading is outside the probe's physical envelope.
    OutOfRange,
    /// Reading equals the power-on default (no conversion happened).
    PowerOnSentinel,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDevice => write!(f, "no probe on bus"),
            Self::BusFault => write!(f, "1-Wire transaction failed"),
            Self::NotFinite => write!(f, "reading not finite"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::PowerOnSentinel => write!(f, "power-on sentinel value"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    BrokerUnreachable,
    NotConnected,
    MqttPublishFailed,
    MqttSubscribeFailed,
    TopicTooLong,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokerUnreachable => write!(f, "MQTT broker unreachable"),
            Self::NotConnected => write!(f, "MQTT session not connected"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
            Self::MqttSubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::TopicTooLong => write!(f, "topic exceeds buffer"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}
