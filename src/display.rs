//! Display presenter.
//!
//! Builds a read-only [`DisplayModel`] from the context, lays it out as a
//! fixed set of text lines and decides when a redraw is due.  Pixels are
//! the [`DisplayPort`](crate::app::ports::DisplayPort) adapter's problem.
//!
//! ```text
//!  Weather @ 14:05
//!   Out   21.5 C
//!   Hum   48 %
//!   Pres  1013 hPa
//!  Room  23.4 C
//!  Fan ON  AUTO 30.0/25.0
//! ```

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::control::thresholds::Thresholds;
use crate::fsm::context::{FanContext, STAMP_CAP, VALUE_CAP, WeatherField};
use crate::fsm::{FanMode, FanState};
use crate::sensors::Provenance;

/// Longest line the panel can show.
pub const LINE_CAP: usize = 32;
/// Number of laid-out lines.
pub const LINE_COUNT: usize = 6;

/// Placeholder for a value that was never received.
const MISSING: &str = "--";

pub type DisplayLine = String<LINE_CAP>;
pub type DisplayLines = Vec<DisplayLine, LINE_COUNT>;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Everything the panel shows, copied out of the context.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
    pub outdoor_temperature: Option<String<VALUE_CAP>>,
    pub humidity: Option<String<VALUE_CAP>>,
    pub pressure: Option<String<VALUE_CAP>>,
    pub last_update: Option<String<STAMP_CAP>>,
    pub local_c: Option<f32>,
    pub fan: FanState,
    pub mode: FanMode,
    pub thresholds: Thresholds,
}

impl DisplayModel {
    pub fn from_context(ctx: &FanContext) -> Self {
        Self {
            outdoor_temperature: ctx.weather.temperature.clone(),
            humidity: ctx.weather.humidity.clone(),
            pressure: ctx.weather.pressure.clone(),
            last_update: ctx.weather.last_update.clone(),
            local_c: ctx.last_valid_c(),
            fan: ctx.fan.state(),
            mode: ctx.fan.mode(),
            thresholds: ctx.thresholds.get(),
        }
    }

    /// Fixed text layout, one entry per panel row.
    pub fn layout(&self) -> DisplayLines {
        let stamp = self.last_update.as_deref().unwrap_or("--:--");
        let mut lines = DisplayLines::new();

        push_line(&mut lines, format_args!("Weather @ {stamp}"));
        push_line(
            &mut lines,
            format_args!(
                " {:<5} {} {}",
                Provenance::Remote.label(),
                or_missing(&self.outdoor_temperature),
                WeatherField::Temperature.unit()
            ),
        );
        push_line(
            &mut lines,
            format_args!(" Hum   {} {}", or_missing(&self.humidity), WeatherField::Humidity.unit()),
        );
        push_line(
            &mut lines,
            format_args!(" Pres  {} {}", or_missing(&self.pressure), WeatherField::Pressure.unit()),
        );
        let room = Provenance::Local.label();
        match self.local_c {
            Some(c) => push_line(&mut lines, format_args!("{room:<5} {c:.1} C")),
            None => push_line(&mut lines, format_args!("{room:<5} {MISSING} C")),
        }
        push_line(
            &mut lines,
            format_args!(
                "Fan {}  {} {:.1}/{:.1}",
                self.fan.as_payload(),
                self.mode.as_payload(),
                self.thresholds.activate_c,
                self.thresholds.deactivate_c
            ),
        );
        lines
    }
}

fn or_missing<const N: usize>(value: &Option<String<N>>) -> &str {
    value.as_deref().unwrap_or(MISSING)
}

/// Format one line; text past [`LINE_CAP`] is cut off.
fn push_line(lines: &mut DisplayLines, args: core::fmt::Arguments<'_>) {
    let mut line = DisplayLine::new();
    let _ = line.write_fmt(args);
    let _ = lines.push(line);
}

// ---------------------------------------------------------------------------
// Redraw policy
// ---------------------------------------------------------------------------

/// Redraw when something changed, or when the safety interval has passed
/// since the last redraw.  Millisecond timestamps wrap.
#[derive(Debug, Clone, Copy)]
pub struct RedrawPolicy {
    interval_ms: u32,
    last_redraw_ms: Option<u32>,
}

impl RedrawPolicy {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_redraw_ms: None,
        }
    }

    pub fn should_redraw(&self, now_ms: u32, dirty: bool) -> bool {
        match self.last_redraw_ms {
            None => true,
            Some(last) => dirty || now_ms.wrapping_sub(last) >= self.interval_ms,
        }
    }

    pub fn mark_drawn(&mut self, now_ms: u32) {
        self.last_redraw_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;

    #[test]
    fn cold_start_layout_shows_placeholders() {
        let ctx = FanContext::new(SystemConfig::default());
        let lines = DisplayModel::from_context(&ctx).layout();
        assert_eq!(lines.len(), LINE_COUNT);
        assert_eq!(lines[0].as_str(), "Weather @ --:--");
        assert_eq!(lines[1].as_str(), " Out   -- C");
        assert_eq!(lines[4].as_str(), "Room  -- C");
        assert_eq!(lines[5].as_str(), "Fan OFF  AUTO 30.0/25.0");
    }

    #[test]
    fn layout_reflects_context() {
        let mut ctx = FanContext::new(SystemConfig::default());
        ctx.weather.humidity = Some(String::try_from("48").unwrap());
        ctx.weather.last_update = Some(String::try_from("14:05").unwrap());
        ctx.last_valid = Some(crate::sensors::Temperature::local(23.44));
        let lines = DisplayModel::from_context(&ctx).layout();
        assert_eq!(lines[0].as_str(), "Weather @ 14:05");
        assert_eq!(lines[2].as_str(), " Hum   48 %");
        assert_eq!(lines[4].as_str(), "Room  23.4 C");
    }

    #[test]
    fn redraw_policy_first_dirty_and_interval() {
        let mut p = RedrawPolicy::new(30_000);
        assert!(p.should_redraw(0, false));
        p.mark_drawn(0);
        assert!(!p.should_redraw(10_000, false));
        assert!(p.should_redraw(10_000, true));
        assert!(p.should_redraw(30_000, false));
    }

    #[test]
    fn redraw_policy_survives_wraparound() {
        let mut p = RedrawPolicy::new(30_000);
        p.mark_drawn(u32::MAX - 5_000);
        assert!(!p.should_redraw(10_000, false));
        assert!(p.should_redraw(25_000, false));
    }
}
