//! Messaging gateway against an in-memory broker session.

use thermofan::app::commands::AppCommand;
use thermofan::app::events::{Publication, StateSnapshot};
use thermofan::app::ports::StatePublisher;
use thermofan::control::thresholds::Thresholds;
use thermofan::fsm::context::WeatherField;
use thermofan::fsm::{FanMode, FanState};
use thermofan::mqtt::MessagingGateway;
use thermofan::mqtt::gateway::last_will;

use crate::mock_hw::{CountingDelay, MockTransport};

const PREFIX: &str = "esp32/";

fn snapshot(last_valid_c: Option<f32>) -> StateSnapshot {
    StateSnapshot {
        mode: FanMode::Auto,
        thresholds: Thresholds {
            activate_c: 30.0,
            deactivate_c: 25.0,
        },
        state: FanState::Off,
        last_valid_c,
    }
}

fn online_gateway() -> MessagingGateway<MockTransport> {
    let mut gw = MessagingGateway::new(MockTransport::new(), PREFIX, 5_000);
    gw.ensure_connected(&snapshot(None), &mut CountingDelay::default());
    gw.transport_mut().clear();
    gw
}

// ── Connect / replay ──────────────────────────────────────────

#[test]
fn connect_announces_then_replays_in_order() {
    let mut gw = MessagingGateway::new(MockTransport::new(), PREFIX, 5_000);
    let mut delay = CountingDelay::default();

    assert!(gw.ensure_connected(&snapshot(Some(22.5)), &mut delay));

    let t = gw.transport();
    assert_eq!(
        t.topics(),
        vec![
            "esp32/availability",
            "esp32/fan/mode",
            "esp32/fan/config/on_c",
            "esp32/fan/config/off_c",
            "esp32/fan/state",
            "esp32/fan/temperature",
        ]
    );
    let payloads: Vec<&str> = t.sent.iter().map(|s| s.payload.as_str()).collect();
    assert_eq!(payloads, vec!["online", "AUTO", "30.00", "25.00", "OFF", "22.50"]);
    assert!(t.sent.iter().all(|s| s.retain), "state topics are retained");
    assert_eq!(delay.calls, 0);
}

#[test]
fn replay_omits_temperature_before_first_valid_reading() {
    let mut gw = MessagingGateway::new(MockTransport::new(), PREFIX, 5_000);
    gw.ensure_connected(&snapshot(None), &mut CountingDelay::default());
    assert!(!gw.transport().topics().contains(&"esp32/fan/temperature"));
    assert_eq!(gw.transport().sent.len(), 5);
}

#[test]
fn connect_subscribes_every_inbound_topic() {
    let mut gw = MessagingGateway::new(MockTransport::new(), PREFIX, 5_000);
    gw.ensure_connected(&snapshot(None), &mut CountingDelay::default());
    assert_eq!(
        gw.transport().subscribed,
        vec![
            "esp32/weather/temperature",
            "esp32/weather/humidity",
            "esp32/weather/pressure",
            "esp32/fan/cmd",
            "esp32/fan/config/on_c/set",
            "esp32/fan/config/off_c/set",
        ]
    );
}

#[test]
fn connect_retries_with_fixed_backoff() {
    let mut transport = MockTransport::new();
    transport.fail_connects = 4;
    let mut gw = MessagingGateway::new(transport, PREFIX, 5_000);
    let mut delay = CountingDelay::default();

    assert!(gw.ensure_connected(&snapshot(None), &mut delay));
    assert_eq!(gw.transport().connect_calls, 5);
    assert_eq!(delay.calls, 4);
    assert_eq!(delay.total_ms, 20_000);
    assert!(gw.is_online());
}

#[test]
fn ensure_connected_is_noop_while_online() {
    let mut gw = online_gateway();
    let mut delay = CountingDelay::default();
    assert!(!gw.ensure_connected(&snapshot(None), &mut delay));
    assert!(gw.transport().sent.is_empty());
    assert!(gw.transport().subscribed.is_empty());
    assert_eq!(gw.transport().connect_calls, 1);
}

#[test]
fn reconnect_resubscribes_and_replays_current_state() {
    let mut gw = online_gateway();
    gw.transport_mut().drop_session();
    assert!(!gw.is_online());

    let mut current = snapshot(Some(31.0));
    current.mode = FanMode::ForcedOn;
    current.state = FanState::On;
    assert!(gw.ensure_connected(&current, &mut CountingDelay::default()));

    let t = gw.transport();
    assert_eq!(t.subscribed.len(), 6);
    assert_eq!(t.last_on("esp32/availability"), Some("online"));
    assert_eq!(t.last_on("esp32/fan/mode"), Some("ON"));
    assert_eq!(t.last_on("esp32/fan/state"), Some("ON"));
    assert_eq!(t.last_on("esp32/fan/temperature"), Some("31.00"));
}

// ── Publishing ────────────────────────────────────────────────

#[test]
fn publish_while_online_is_retained() {
    let mut gw = online_gateway();
    gw.publish(&Publication::FanState(FanState::On));
    let sent = &gw.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].topic, "esp32/fan/state");
    assert_eq!(sent[0].payload, "ON");
    assert!(sent[0].retain);
}

#[test]
fn publish_while_offline_is_dropped() {
    let mut gw = MessagingGateway::new(MockTransport::new(), PREFIX, 5_000);
    gw.publish(&Publication::LocalTemperature(21.0));
    assert!(gw.transport().sent.is_empty());

    let mut gw = online_gateway();
    gw.transport_mut().drop_session();
    gw.publish(&Publication::LocalTemperature(21.0));
    assert!(gw.transport().sent.is_empty());
}

#[test]
fn last_will_is_offline_on_availability() {
    let (topic, payload) = last_will(PREFIX).unwrap();
    assert_eq!(topic.as_str(), "esp32/availability");
    assert_eq!(payload, b"offline");
}

// ── Inbound ───────────────────────────────────────────────────

#[test]
fn poll_decodes_known_topics() {
    let mut gw = online_gateway();
    let t = gw.transport_mut();
    t.inject("esp32/fan/cmd", b"auto");
    t.inject("esp32/fan/config/on_c/set", b"28.5");
    t.inject("esp32/weather/humidity", b"55");

    assert_eq!(gw.poll(), Some(AppCommand::SetMode(FanMode::Auto)));
    assert_eq!(gw.poll(), Some(AppCommand::SetActivate(28.5)));
    assert_eq!(
        gw.poll(),
        Some(AppCommand::Weather {
            field: WeatherField::Humidity,
            value: 55.0
        })
    );
    assert_eq!(gw.poll(), None);
}

#[test]
fn poll_skips_foreign_topics_and_malformed_payloads() {
    let mut gw = online_gateway();
    let t = gw.transport_mut();
    t.inject("other/fan/cmd", b"ON");
    t.inject("esp32/fan/cmd/extra", b"ON");
    t.inject("esp32/fan/config/off_c/set", b"warm");
    t.inject("esp32/fan/cmd", b"SPIN");
    t.inject("esp32/fan/cmd", b"OFF");

    assert_eq!(gw.poll(), Some(AppCommand::SetMode(FanMode::ForcedOff)));
    assert_eq!(gw.poll(), None);
}
