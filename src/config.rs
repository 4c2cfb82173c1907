//! System configuration parameters
//!
//! All tunable parameters for the ThermoFan controller.  Everything here is
//! compiled in: thresholds and mode are volatile and come back from the
//! broker's retained state after a reconnect, never from flash.

use serde::{Deserialize, Serialize};

/// Core control-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Hysteresis ---
    /// Cold-start activation threshold (°C).
    pub default_activate_c: f32,
    /// Cold-start deactivation threshold (°C).
    pub default_deactivate_c: f32,
    /// Minimum distance kept between activate and deactivate (°C).
    pub min_gap_c: f32,

    // --- Sensor validation ---
    /// Readings at or below this are rejected (°C).
    pub sensor_min_c: f32,
    /// Readings at or above this are rejected (°C).
    pub sensor_max_c: f32,
    /// Value the probe reports before its first conversion (°C).
    pub sensor_sentinel_c: f32,
    /// Tolerance around the sentinel.
    pub sensor_sentinel_epsilon: f32,

    // --- Timing ---
    /// Local temperature sample interval (milliseconds).
    pub sample_interval_ms: u32,
    /// Redraw safety interval: the display never goes stale for longer.
    pub redraw_interval_ms: u32,
    /// Wall-clock resynchronisation interval (milliseconds).
    pub clock_resync_interval_ms: u32,
    /// Fixed delay between broker reconnect attempts (milliseconds).
    pub reconnect_backoff_ms: u32,
    /// Idle sleep between control-loop iterations (milliseconds).
    pub loop_idle_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Hysteresis
            default_activate_c: 30.0,
            default_deactivate_c: 25.0,
            min_gap_c: 0.5,

            // DS18B20 envelope and power-on value
            sensor_min_c: -55.0,
            sensor_max_c: 125.0,
            sensor_sentinel_c: 85.0,
            sensor_sentinel_epsilon: 0.01,

            // Timing
            sample_interval_ms: 5_000,
            redraw_interval_ms: 30_000,
            clock_resync_interval_ms: 3_600_000,
            reconnect_backoff_ms: 5_000,
            loop_idle_ms: 50,
        }
    }
}

/// Network and broker settings.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkConfig {
    pub wifi_ssid: &'static str,
    #[serde(skip_serializing)]
    pub wifi_password: &'static str,
    /// Broker URL, e.g. `mqtt://192.168.1.10:1883`.
    pub broker_url: &'static str,
    pub client_id: &'static str,
    pub mqtt_user: Option<&'static str>,
    #[serde(skip_serializing)]
    pub mqtt_password: Option<&'static str>,
    /// Topic namespace prepended to every topic suffix.
    pub topic_prefix: &'static str,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: "thermofan",
            wifi_password: "change-me-please",
            broker_url: "mqtt://192.168.1.10:1883",
            client_id: "esp32-thermofan",
            mqtt_user: None,
            mqtt_password: None,
            topic_prefix: "esp32/",
        }
    }
}
