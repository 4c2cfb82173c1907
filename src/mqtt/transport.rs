//! Broker session abstraction.
//!
//! The gateway speaks to the broker only through [`MqttTransport`].  The
//! ESP-IDF client implements it in `adapters::mqtt_client`; tests use a
//! recording mock.

use heapless::Vec;

use crate::error::CommsError;

use super::topics::Topic;

/// Largest inbound payload kept; longer payloads are truncated by the
/// adapter and will then fail to parse.
pub const INBOUND_PAYLOAD_CAP: usize = 64;

/// An owned inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: Topic,
    pub payload: Vec<u8, INBOUND_PAYLOAD_CAP>,
}

impl InboundMessage {
    /// Build from borrowed parts.  `None` if the topic does not fit.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let topic = Topic::try_from(topic).ok()?;
        let keep = payload.len().min(INBOUND_PAYLOAD_CAP);
        let payload = Vec::from_slice(&payload[..keep]).ok()?;
        Some(Self { topic, payload })
    }
}

/// Publish/subscribe session with a broker.
///
/// All outbound messages use at-least-once delivery.  The last will
/// (`availability` = `offline`, retained) is registered by the
/// implementation when the session is configured.
pub trait MqttTransport {
    /// Attempt to (re)establish the session.  Must not block for longer
    /// than one connection attempt.
    fn connect(&mut self) -> Result<(), CommsError>;

    /// `true` while a session acknowledged by [`connect`](Self::connect)
    /// is up.
    fn is_connected(&self) -> bool;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    /// Next received message, if any.  Never blocks.
    fn poll(&mut self) -> Option<InboundMessage>;
}
