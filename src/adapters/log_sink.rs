//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { mode, state } => {
                info!("START | mode={} fan={}", mode.as_payload(), state.as_payload());
            }
            AppEvent::FanSwitched {
                from,
                to,
                mode,
                celsius,
            } => match celsius {
                Some(c) => info!(
                    "FAN   | {} -> {} | mode={} | T={:.2}\u{00b0}C",
                    from.as_payload(),
                    to.as_payload(),
                    mode.as_payload(),
                    c
                ),
                None => info!(
                    "FAN   | {} -> {} | mode={} | T=unknown",
                    from.as_payload(),
                    to.as_payload(),
                    mode.as_payload()
                ),
            },
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {} -> {}", from.as_payload(), to.as_payload());
            }
            AppEvent::ThresholdsChanged {
                thresholds,
                requested,
            } => {
                info!(
                    "THRSH | on={:.2} off={:.2} (requested {:.2})",
                    thresholds.activate_c, thresholds.deactivate_c, requested
                );
            }
            AppEvent::SampleAccepted(c) => {
                info!("TEMP  | {:.2}\u{00b0}C", c);
            }
            AppEvent::SampleRejected(e) => {
                warn!("TEMP  | rejected: {}", e);
            }
            AppEvent::WeatherUpdated { field, value } => {
                info!("WTHR  | {:?}={}", field, value);
            }
            AppEvent::ActuatorFault(e) => {
                warn!("FAULT | relay: {}", e);
            }
        }
    }
}
