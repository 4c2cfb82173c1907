//! ESP-IDF MQTT transport.
//!
//! Implements [`MqttTransport`] on top of `EspMqttClient`.  The client runs
//! its own connection task; a poll thread drains the connection's events
//! and hands owned messages to the control loop through a
//! `std::sync::mpsc` channel, so no domain state is touched off the loop.
//!
//! ```text
//!  esp-mqtt task ──▶ poll thread ──▶ mpsc ──▶ EspMqttTransport::poll()
//!                         │
//!                         └──▶ SessionFlags (connected, generation)
//! ```
//!
//! The ESP client reconnects by itself.  [`SessionFlags`] counts sessions
//! so the gateway still sees every reconnect: a new session stays
//! "not connected" until `connect()` acknowledges it, which is what
//! triggers the availability + resubscribe + snapshot replay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

// ───────────────────────────────────────────────────────────────
// Session tracking (shared with the poll thread)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SessionFlags {
    connected: AtomicBool,
    generation: AtomicU32,
}

impl SessionFlags {
    /// Poll thread: broker acknowledged a connection.
    pub fn on_connected(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.connected.store(true, Ordering::Release);
    }

    /// Poll thread: session dropped.
    pub fn on_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }

    pub fn is_up(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Control-loop view of the session: which generation has been
/// acknowledged (announced and replayed).
#[derive(Debug)]
pub struct SessionTracker {
    flags: Arc<SessionFlags>,
    acked: Option<u32>,
}

impl SessionTracker {
    pub fn new(flags: Arc<SessionFlags>) -> Self {
        Self { flags, acked: None }
    }

    /// Acknowledge the current session if one is up.
    pub fn acknowledge(&mut self) -> bool {
        if self.flags.is_up() {
            self.acked = Some(self.flags.generation());
            true
        } else {
            false
        }
    }

    pub fn acknowledged(&self) -> Option<u32> {
        self.acked
    }

    /// Up, and no reconnect happened since the last acknowledgement.
    pub fn is_current(&self) -> bool {
        self.flags.is_up() && self.acked == Some(self.flags.generation())
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF transport
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspMqttTransport;

#[cfg(target_os = "espidf")]
mod esp {
    use std::sync::Arc;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;
    use std::time::Duration;

    use embedded_svc::mqtt::client::{Details, EventPayload, QoS};
    use esp_idf_svc::mqtt::client::{
        EspMqttClient, EspMqttConnection, LwtConfiguration, MqttClientConfiguration,
    };
    use log::{debug, info, warn};

    use super::{SessionFlags, SessionTracker};
    use crate::config::NetworkConfig;
    use crate::error::CommsError;
    use crate::mqtt::gateway;
    use crate::mqtt::transport::{InboundMessage, MqttTransport};

    pub struct EspMqttTransport {
        client: EspMqttClient<'static>,
        inbox: Receiver<InboundMessage>,
        session: SessionTracker,
    }

    impl EspMqttTransport {
        /// Create the client with its last will and start the poll thread.
        pub fn new(network: &NetworkConfig) -> anyhow::Result<Self> {
            let (will_topic, will_payload) = gateway::last_will(network.topic_prefix)
                .map_err(|e| anyhow::anyhow!("last-will topic: {e}"))?;

            let conf = MqttClientConfiguration {
                client_id: Some(network.client_id),
                username: network.mqtt_user,
                password: network.mqtt_password,
                lwt: Some(LwtConfiguration {
                    topic: &will_topic,
                    payload: will_payload,
                    qos: QoS::AtLeastOnce,
                    retain: true,
                }),
                ..Default::default()
            };
            let (client, conn) = EspMqttClient::new(network.broker_url, &conf)?;
            info!("MQTT: client created for {}", network.broker_url);

            let flags = Arc::new(SessionFlags::default());
            let (tx, inbox) = mpsc::channel();
            spawn_poll_thread(conn, tx, flags.clone())?;

            Ok(Self {
                client,
                inbox,
                session: SessionTracker::new(flags),
            })
        }

        /// Generation of the session the gateway last announced.
        pub fn acknowledged_session(&self) -> Option<u32> {
            self.session.acknowledged()
        }
    }

    fn spawn_poll_thread(
        mut conn: EspMqttConnection,
        tx: Sender<InboundMessage>,
        flags: Arc<SessionFlags>,
    ) -> anyhow::Result<()> {
        thread::Builder::new()
            .name("mqtt-poll".to_string())
            .stack_size(8192)
            .spawn(move || {
                loop {
                    match conn.next() {
                        Ok(event) => match event.payload() {
                            EventPayload::Connected(_) => {
                                info!("MQTT: broker session up");
                                flags.on_connected();
                            }
                            EventPayload::Disconnected => {
                                warn!("MQTT: broker session down");
                                flags.on_disconnected();
                            }
                            EventPayload::Received {
                                topic: Some(topic),
                                data,
                                details: Details::Complete,
                                ..
                            } => match InboundMessage::new(topic, data) {
                                Some(msg) => {
                                    if tx.send(msg).is_err() {
                                        // Control loop gone; nothing left to feed.
                                        return;
                                    }
                                }
                                None => warn!("MQTT: topic too long, dropped"),
                            },
                            EventPayload::Received { .. } => {
                                warn!("MQTT: fragmented or topic-less message dropped");
                            }
                            other => debug!("MQTT: event {:?}", other),
                        },
                        Err(e) => {
                            warn!("MQTT: connection poll error: {:?}", e);
                            flags.on_disconnected();
                            thread::sleep(Duration::from_secs(2));
                        }
                    }
                }
            })?;
        Ok(())
    }

    impl MqttTransport for EspMqttTransport {
        fn connect(&mut self) -> Result<(), CommsError> {
            if self.session.acknowledge() {
                Ok(())
            } else {
                Err(CommsError::BrokerUnreachable)
            }
        }

        fn is_connected(&self) -> bool {
            self.session.is_current()
        }

        fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError> {
            self.client
                .publish(topic, QoS::AtLeastOnce, retain, payload)
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: publish error: {}", e);
                    CommsError::MqttPublishFailed
                })
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
            self.client
                .subscribe(topic, QoS::AtLeastOnce)
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: subscribe error: {}", e);
                    CommsError::MqttSubscribeFailed
                })
        }

        fn poll(&mut self) -> Option<InboundMessage> {
            self.inbox.try_recv().ok()
        }
    }
}
