//! Mock adapters for integration tests.
//!
//! Each mock records what the domain did to it so tests can assert on the
//! full history without touching GPIO, the 1-Wire bus or a broker.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use heapless::String as HString;

use thermofan::app::events::{AppEvent, Publication};
use thermofan::app::ports::{
    ClockPort, DisplayPort, EventSink, FanPort, SensorPort, StatePublisher,
};
use thermofan::display::DisplayLines;
use thermofan::error::{ActuatorError, CommsError, SensorError};
use thermofan::fsm::context::STAMP_CAP;
use thermofan::mqtt::{InboundMessage, MqttTransport};

// ── MockHardware ──────────────────────────────────────────────

/// Probe + relay.  `probe` is what the next read returns.
pub struct MockHardware {
    pub probe: Result<f32, SensorError>,
    pub relay: bool,
    /// Every level written to the relay, in order.
    pub writes: Vec<bool>,
    pub fail_writes: bool,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            probe: Err(SensorError::NoDevice),
            relay: false,
            writes: Vec::new(),
            fail_writes: false,
            reads: 0,
        }
    }

    pub fn with_probe(celsius: f32) -> Self {
        Self {
            probe: Ok(celsius),
            ..Self::new()
        }
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_probe(&mut self) -> Result<f32, SensorError> {
        self.reads += 1;
        self.probe
    }
}

impl FanPort for MockHardware {
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.fail_writes {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.relay = on;
        self.writes.push(on);
        Ok(())
    }

    fn is_fan_on(&self) -> bool {
        self.relay
    }
}

// ── Publisher / sink ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Vec<Publication>,
}

impl StatePublisher for RecordingPublisher {
    fn publish(&mut self, publication: &Publication) {
        self.published.push(*publication);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct FixedClock {
    pub label: Option<&'static str>,
    pub resyncs: u32,
}

#[allow(dead_code)]
impl FixedClock {
    pub fn synced(label: &'static str) -> Self {
        Self {
            label: Some(label),
            resyncs: 0,
        }
    }
}

impl ClockPort for FixedClock {
    fn now_label(&self) -> Option<HString<STAMP_CAP>> {
        self.label.and_then(|l| HString::try_from(l).ok())
    }

    fn resync(&mut self) {
        self.resyncs += 1;
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn last(&self) -> Option<&Vec<String>> {
        self.frames.last()
    }
}

impl DisplayPort for RecordingDisplay {
    fn render(&mut self, lines: &DisplayLines) {
        self.frames
            .push(lines.iter().map(|l| l.as_str().to_owned()).collect());
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Records requested sleeps instead of sleeping.
#[derive(Default)]
pub struct CountingDelay {
    pub calls: u32,
    pub total_ms: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
    }
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// In-memory broker session.
#[derive(Default)]
pub struct MockTransport {
    up: bool,
    /// Number of upcoming `connect()` calls that fail.
    pub fail_connects: u32,
    pub connect_calls: u32,
    pub sent: Vec<Sent>,
    pub subscribed: Vec<String>,
    pub inbox: VecDeque<InboundMessage>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound message.
    pub fn inject(&mut self, topic: &str, payload: &[u8]) {
        let msg = InboundMessage::new(topic, payload).expect("topic fits");
        self.inbox.push_back(msg);
    }

    /// Broker went away.
    pub fn drop_session(&mut self) {
        self.up = false;
    }

    pub fn clear(&mut self) {
        self.sent.clear();
        self.subscribed.clear();
    }

    pub fn topics(&self) -> Vec<&str> {
        self.sent.iter().map(|s| s.topic.as_str()).collect()
    }

    /// Last payload published on `topic`.
    pub fn last_on(&self, topic: &str) -> Option<&str> {
        self.sent
            .iter()
            .rev()
            .find(|s| s.topic == topic)
            .map(|s| s.payload.as_str())
    }
}

impl MqttTransport for MockTransport {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.connect_calls += 1;
        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            return Err(CommsError::BrokerUnreachable);
        }
        self.up = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.up
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError> {
        if !self.up {
            return Err(CommsError::NotConnected);
        }
        self.sent.push(Sent {
            topic: topic.to_owned(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            retain,
        });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.up {
            return Err(CommsError::NotConnected);
        }
        self.subscribed.push(topic.to_owned());
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.inbox.pop_front()
    }
}
