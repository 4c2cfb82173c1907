//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! connectivity.  The broker session rides on top of this link, so the
//! control loop brings the link back before it retries the broker.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! Blocking retry with a fixed backoff and no attempt limit, the same
//! policy as the broker session.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::NetworkConfig;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

pub trait ConnectivityPort {
    /// One connection attempt.
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
}

/// Block until the link is up.  Returns the number of failed attempts.
pub fn ensure_up(
    link: &mut impl ConnectivityPort,
    backoff_ms: u32,
    delay: &mut impl DelayNs,
) -> u32 {
    let mut failures: u32 = 0;
    while !link.is_connected() {
        match link.connect() {
            Ok(()) => break,
            Err(e) => {
                failures = failures.wrapping_add(1);
                warn!("WiFi: {} (attempt {}); retrying in {} ms", e, failures, backoff_ms);
                delay.delay_ms(backoff_ms);
            }
        }
    }
    failures
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter (ESP-IDF)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiAdapter {
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    ssid: &'static str,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    /// Configure the station interface and start the driver.  Does not
    /// connect; call [`ensure_up`] for that.
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sys_loop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
        network: &NetworkConfig,
    ) -> anyhow::Result<Self> {
        use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
        use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

        validate_ssid(network.wifi_ssid)?;
        validate_password(network.wifi_password)?;

        let esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs))?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop)?;

        let auth_method = if network.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: network
                .wifi_ssid
                .try_into()
                .map_err(|_| anyhow::anyhow!("wifi ssid too long"))?,
            password: network
                .wifi_password
                .try_into()
                .map_err(|_| anyhow::anyhow!("wifi password too long"))?,
            auth_method,
            ..Default::default()
        }))?;
        wifi.start()?;
        info!("WiFi: started, station '{}'", network.wifi_ssid);

        Ok(Self {
            wifi,
            ssid: network.wifi_ssid,
        })
    }
}

#[cfg(target_os = "espidf")]
impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        let result = self.wifi.connect().and_then(|()| self.wifi.wait_netif_up());
        match result {
            Ok(()) => {
                info!("WiFi: connected, netif up");
                Ok(())
            }
            Err(e) => {
                warn!("WiFi: connect failed: {}", e);
                let _ = self.wifi.disconnect();
                Err(ConnectivityError::ConnectionFailed)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter (host simulation)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct WifiAdapter {
    ssid: &'static str,
    connected: bool,
    /// Simulation: number of upcoming connect attempts that fail.
    fail_next: u32,
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new(network: &NetworkConfig) -> Result<Self, ConnectivityError> {
        validate_ssid(network.wifi_ssid)?;
        validate_password(network.wifi_password)?;
        Ok(Self {
            ssid: network.wifi_ssid,
            connected: false,
            fail_next: 0,
        })
    }

    pub fn sim_fail_next(&mut self, attempts: u32) {
        self.fail_next = attempts;
    }

    pub fn sim_drop_link(&mut self) {
        self.connected = false;
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.connected = true;
        info!("WiFi(sim): connected to '{}'", self.ssid);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
