//! ThermoFan Firmware — Main Entry Point
//!
//! Hexagonal architecture around a cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   LogDisplay   Esp32TimeAdapter│
//! │  (Sensor+Fan)      (EventSink)    (Display)    (Clock + SNTP)  │
//! │  WifiAdapter       EspMqttTransport                            │
//! │  (Connectivity)    (MqttTransport under MessagingGateway)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Thresholds · Weather cache                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ControlLoop: Scheduler (delegate-driven) · RedrawPolicy       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::IOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info};

use thermofan::adapters::hardware::HardwareAdapter;
use thermofan::adapters::log_display::LogDisplay;
use thermofan::adapters::log_sink::LogEventSink;
use thermofan::adapters::mqtt_client::EspMqttTransport;
use thermofan::adapters::time::Esp32TimeAdapter;
use thermofan::adapters::wifi::{self, WifiAdapter};
use thermofan::config::{NetworkConfig, SystemConfig};
use thermofan::drivers::fan_relay::FanRelay;
use thermofan::drivers::hw_init;
use thermofan::mqtt::MessagingGateway;
use thermofan::runtime::ControlLoop;
use thermofan::sensors::temperature::TemperatureProbe;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ThermoFan v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    let network = NetworkConfig::default();
    info!("Config: {}", serde_json::to_string(&config)?);
    info!("Network: {}", serde_json::to_string(&network)?);

    // ── 2. Relay output, released before anything else runs ───
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 3. Construct adapters ─────────────────────────────────
    // gpio4 is pins::ONE_WIRE_GPIO.
    let probe = TemperatureProbe::new(peripherals.pins.gpio4.downgrade())?;
    let mut hw = HardwareAdapter::new(probe, FanRelay::new());
    let mut sink = LogEventSink::new();
    let mut display = LogDisplay::new();
    let mut clock = Esp32TimeAdapter::new();
    let mut delay = FreeRtos;

    // ── 4. Control loop (relay written before the network is up) ──
    let mut control = ControlLoop::new(config.clone());
    control.start(&mut hw, &mut sink);

    // ── 5. Network ────────────────────────────────────────────
    let mut link = WifiAdapter::new(peripherals.modem, sys_loop, nvs, &network)?;
    wifi::ensure_up(&mut link, config.reconnect_backoff_ms, &mut delay);

    let transport = EspMqttTransport::new(&network)?;
    let mut gateway =
        MessagingGateway::new(transport, network.topic_prefix, config.reconnect_backoff_ms);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        wifi::ensure_up(&mut link, config.reconnect_backoff_ms, &mut delay);

        let report = control.iterate(
            clock.uptime_ms(),
            &mut hw,
            &mut gateway,
            &mut clock,
            &mut display,
            &mut sink,
            &mut delay,
        );
        if report.reconnected {
            info!(
                "MQTT: session {:?} announced",
                gateway.transport().acknowledged_session()
            );
        }

        FreeRtos::delay_ms(config.loop_idle_ms);
    }
}
