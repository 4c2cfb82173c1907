//! Messaging gateway.
//!
//! Sits between the application core and an [`MqttTransport`]:
//!
//! - keeps the session up (blocking retry with a fixed backoff),
//! - on every (re)connect announces `online`, resubscribes and replays the
//!   retained state snapshot,
//! - decodes inbound messages into [`AppCommand`]s,
//! - encodes outbound [`Publication`]s as retained messages.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::commands::AppCommand;
use crate::app::events::{Publication, StateSnapshot};
use crate::app::ports::StatePublisher;
use crate::error::CommsError;

use super::codec;
use super::topics::{self, InboundTopic, OutboundTopic, Topic};
use super::transport::MqttTransport;

/// Payload of the last-will message.
pub const OFFLINE_PAYLOAD: &[u8] = b"offline";

/// Topic and payload to register as the session's last will.
pub fn last_will(prefix: &str) -> Result<(Topic, &'static [u8]), CommsError> {
    Ok((
        topics::full_topic(prefix, OutboundTopic::Availability.suffix())?,
        OFFLINE_PAYLOAD,
    ))
}

pub struct MessagingGateway<T: MqttTransport> {
    transport: T,
    prefix: &'static str,
    backoff_ms: u32,
    /// The current session has been announced and replayed.
    online: bool,
}

impl<T: MqttTransport> MessagingGateway<T> {
    pub fn new(transport: T, prefix: &'static str, backoff_ms: u32) -> Self {
        Self {
            transport,
            prefix,
            backoff_ms,
            online: false,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online && self.transport.is_connected()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Block until a session is up.  Returns `true` if a new session was
    /// established (and the snapshot replayed) during this call.
    ///
    /// There is no attempt limit: the loop only returns once connected.
    pub fn ensure_connected(&mut self, snapshot: &StateSnapshot, delay: &mut impl DelayNs) -> bool {
        if self.is_online() {
            return false;
        }
        if self.online {
            warn!("MQTT: session lost");
            self.online = false;
        }

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.wrapping_add(1);
            match self.transport.connect() {
                Ok(()) => break,
                Err(e) => {
                    warn!(
                        "MQTT: connect attempt {} failed: {}; retrying in {} ms",
                        attempt, e, self.backoff_ms
                    );
                    delay.delay_ms(self.backoff_ms);
                }
            }
        }
        info!("MQTT: connected after {} attempt(s)", attempt);

        self.online = true;
        self.send(&Publication::Availability(true));
        self.subscribe_all();
        for publication in snapshot.publications() {
            self.send(&publication);
        }
        true
    }

    /// Drain the transport until a message decodes to a command.
    /// Messages on foreign topics and malformed payloads are skipped.
    pub fn poll(&mut self) -> Option<AppCommand> {
        while let Some(msg) = self.transport.poll() {
            let Some(topic) = InboundTopic::decode(self.prefix, &msg.topic) else {
                debug!("MQTT: ignoring message on {}", msg.topic);
                continue;
            };
            if let Some(cmd) = codec::decode(topic, &msg.payload) {
                return Some(cmd);
            }
        }
        None
    }

    // ── Internal ──────────────────────────────────────────────

    fn subscribe_all(&mut self) {
        for inbound in InboundTopic::ALL {
            let result = topics::full_topic(self.prefix, inbound.suffix())
                .and_then(|topic| self.transport.subscribe(&topic));
            if let Err(e) = result {
                warn!("MQTT: subscribe {} failed: {}", inbound.suffix(), e);
            }
        }
    }

    /// Encode and publish, retained.
    fn send(&mut self, publication: &Publication) {
        let Some((outbound, payload)) = codec::encode(publication) else {
            warn!("MQTT: cannot encode {:?}", publication);
            return;
        };
        let result = topics::full_topic(self.prefix, outbound.suffix())
            .and_then(|topic| self.transport.publish(&topic, payload.as_bytes(), true));
        if let Err(e) = result {
            warn!("MQTT: publish {} failed: {}", outbound.suffix(), e);
        }
    }
}

impl<T: MqttTransport> StatePublisher for MessagingGateway<T> {
    fn publish(&mut self, publication: &Publication) {
        if !self.is_online() {
            // The reconnect snapshot carries the current state.
            warn!("MQTT: offline, dropping {:?}", publication);
            return;
        }
        self.send(publication);
    }
}
