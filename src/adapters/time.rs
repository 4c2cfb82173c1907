//! ESP32 time adapter.
//!
//! Provides the monotonic millisecond counter for the scheduler and the
//! wall-clock label for the display.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` for uptime
//!   and SNTP + `localtime_r` for wall-clock time.
//! - **`not(target_os = "espidf")`** — uses `std::time` for host-side
//!   testing and simulation (UTC).

use core::fmt::Write as _;

use heapless::String;
use log::info;

use crate::app::ports::ClockPort;
use crate::fsm::context::STAMP_CAP;

/// Anything before 2020-01-01 means the clock was never set.
const EPOCH_2020: i64 = 1_577_836_800;

/// `HH:MM` for the given hour and minute.
pub fn format_label(hour: u32, minute: u32) -> Option<String<STAMP_CAP>> {
    if hour > 23 || minute > 59 {
        return None;
    }
    let mut label = String::new();
    write!(label, "{hour:02}:{minute:02}").ok()?;
    Some(label)
}

/// UTC `HH:MM` for a Unix timestamp, `None` if the clock looks unsynced.
pub fn utc_label(epoch_secs: i64) -> Option<String<STAMP_CAP>> {
    if epoch_secs < EPOCH_2020 {
        return None;
    }
    let secs_of_day = epoch_secs.rem_euclid(86_400);
    format_label((secs_of_day / 3600) as u32, (secs_of_day % 3600 / 60) as u32)
}

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(target_os = "espidf")]
            sntp: None,
        }
    }

    /// Milliseconds since boot.  Wraps after ~49 days; consumers use
    /// wrapping arithmetic.
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u32 {
        // SAFETY: esp_timer_get_time has no preconditions once the
        // scheduler is running.
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }

    /// Milliseconds since boot.  Wraps after ~49 days; consumers use
    /// wrapping arithmetic.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    #[cfg(target_os = "espidf")]
    fn wall_label(&self) -> Option<String<STAMP_CAP>> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        if (tv.tv_sec as i64) < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        format_label(u32::try_from(tm.tm_hour).ok()?, u32::try_from(tm.tm_min).ok()?)
    }

    #[cfg(not(target_os = "espidf"))]
    fn wall_label(&self) -> Option<String<STAMP_CAP>> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?;
        utc_label(i64::try_from(now.as_secs()).ok()?)
    }
}

impl ClockPort for Esp32TimeAdapter {
    fn now_label(&self) -> Option<String<STAMP_CAP>> {
        self.wall_label()
    }

    #[cfg(target_os = "espidf")]
    fn resync(&mut self) {
        use esp_idf_svc::sntp::{EspSntp, SyncStatus};

        if let Some(sntp) = &self.sntp {
            match sntp.get_sync_status() {
                SyncStatus::Completed => info!("Clock: synchronised"),
                status => info!("Clock: sync pending ({:?})", status),
            }
            return;
        }
        // Default pool servers.
        match EspSntp::new_default() {
            Ok(sntp) => {
                info!("Clock: SNTP started");
                self.sntp = Some(sntp);
            }
            Err(e) => log::warn!("Clock: SNTP start failed: {}", e),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn resync(&mut self) {
        info!("Clock(sim): using host time");
    }
}
