//! Topic namespace.
//!
//! Every topic is `<prefix><suffix>`.  Inbound topics decode into a closed
//! enum; anything that does not match exactly is not ours.

use heapless::String;

use crate::error::CommsError;
use crate::fsm::context::WeatherField;

/// Longest full topic we build or accept.
pub const TOPIC_CAP: usize = 64;

pub type Topic = String<TOPIC_CAP>;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic {
    /// `weather/temperature`, `weather/humidity`, `weather/pressure`
    Weather(WeatherField),
    /// `fan/cmd`
    FanCommand,
    /// `fan/config/on_c/set`
    ActivateSet,
    /// `fan/config/off_c/set`
    DeactivateSet,
}

impl InboundTopic {
    /// Every topic subscribed after a (re)connect.
    pub const ALL: [InboundTopic; 6] = [
        InboundTopic::Weather(WeatherField::Temperature),
        InboundTopic::Weather(WeatherField::Humidity),
        InboundTopic::Weather(WeatherField::Pressure),
        InboundTopic::FanCommand,
        InboundTopic::ActivateSet,
        InboundTopic::DeactivateSet,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Weather(WeatherField::Temperature) => "weather/temperature",
            Self::Weather(WeatherField::Humidity) => "weather/humidity",
            Self::Weather(WeatherField::Pressure) => "weather/pressure",
            Self::FanCommand => "fan/cmd",
            Self::ActivateSet => "fan/config/on_c/set",
            Self::DeactivateSet => "fan/config/off_c/set",
        }
    }

    /// Exact match against `<prefix><suffix>`.
    pub fn decode(prefix: &str, topic: &str) -> Option<Self> {
        let suffix = topic.strip_prefix(prefix)?;
        Self::ALL.into_iter().find(|t| t.suffix() == suffix)
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Retained state topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundTopic {
    Availability,
    LocalTemperature,
    FanState,
    FanMode,
    ActivateThreshold,
    DeactivateThreshold,
}

impl OutboundTopic {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::LocalTemperature => "fan/temperature",
            Self::FanState => "fan/state",
            Self::FanMode => "fan/mode",
            Self::ActivateThreshold => "fan/config/on_c",
            Self::DeactivateThreshold => "fan/config/off_c",
        }
    }
}

/// Join prefix and suffix into a bounded topic string.
pub fn full_topic(prefix: &str, suffix: &str) -> Result<Topic, CommsError> {
    let mut topic = Topic::new();
    topic.push_str(prefix).map_err(|_| CommsError::TopicTooLong)?;
    topic.push_str(suffix).map_err(|_| CommsError::TopicTooLong)?;
    Ok(topic)
}
