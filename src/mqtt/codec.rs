//! Payload codec.
//!
//! Inbound payloads become [`AppCommand`]s; [`Publication`]s become a
//! topic plus a UTF-8 payload.  Numbers go out with fixed precision and
//! come in as plain decimals.  A payload that does not parse is dropped
//! here and never reaches the application core.

use core::fmt::Write as _;

use heapless::String;
use log::warn;

use crate::app::commands::AppCommand;
use crate::app::events::Publication;
use crate::fsm::FanMode;

use super::topics::{InboundTopic, OutboundTopic};

/// Longest payload we produce.
pub const PAYLOAD_CAP: usize = 16;

/// Decimals for published temperatures and thresholds.
pub const PUBLISH_DECIMALS: usize = 2;

pub type Payload = String<PAYLOAD_CAP>;

/// Fixed-precision decimal.  `None` if the text does not fit.
pub fn format_fixed(value: f32, decimals: usize) -> Option<Payload> {
    let mut out = Payload::new();
    write!(out, "{:.*}", decimals, value).ok()?;
    Some(out)
}

/// Parse a decimal payload.  Surrounding whitespace is ignored; NaN and
/// infinities are refused even though `f32::from_str` accepts them.
pub fn parse_decimal(payload: &[u8]) -> Option<f32> {
    let text = core::str::from_utf8(payload).ok()?.trim();
    let value: f32 = text.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Turn an inbound message into a command.  Malformed payloads yield
/// `None` and are logged.
pub fn decode(topic: InboundTopic, payload: &[u8]) -> Option<AppCommand> {
    let cmd = match topic {
        InboundTopic::FanCommand => core::str::from_utf8(payload)
            .ok()
            .and_then(FanMode::parse)
            .map(AppCommand::SetMode),
        InboundTopic::ActivateSet => parse_decimal(payload).map(AppCommand::SetActivate),
        InboundTopic::DeactivateSet => parse_decimal(payload).map(AppCommand::SetDeactivate),
        InboundTopic::Weather(field) => {
            parse_decimal(payload).map(|value| AppCommand::Weather { field, value })
        }
    };
    if cmd.is_none() {
        warn!(
            "Ignoring malformed payload on {}: {:?}",
            topic.suffix(),
            core::str::from_utf8(payload).unwrap_or("<binary>")
        );
    }
    cmd
}

/// Topic, payload and retain flag for a publication.
pub fn encode(publication: &Publication) -> Option<(OutboundTopic, Payload)> {
    let fixed = |v: f32| format_fixed(v, PUBLISH_DECIMALS);
    let word = |w: &str| Payload::try_from(w).ok();
    match *publication {
        Publication::Availability(online) => Some((
            OutboundTopic::Availability,
            word(if online { "online" } else { "offline" })?,
        )),
        Publication::Mode(mode) => Some((OutboundTopic::FanMode, word(mode.as_payload())?)),
        Publication::FanState(state) => Some((OutboundTopic::FanState, word(state.as_payload())?)),
        Publication::ActivateThreshold(c) => Some((OutboundTopic::ActivateThreshold, fixed(c)?)),
        Publication::DeactivateThreshold(c) => {
            Some((OutboundTopic::DeactivateThreshold, fixed(c)?))
        }
        Publication::LocalTemperature(c) => Some((OutboundTopic::LocalTemperature, fixed(c)?)),
    }
}
