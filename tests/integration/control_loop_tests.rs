//! One-iteration-at-a-time tests of the cooperative control loop.

use thermofan::config::SystemConfig;
use thermofan::fsm::{FanMode, FanState};
use thermofan::mqtt::MessagingGateway;
use thermofan::runtime::ControlLoop;

use crate::mock_hw::{
    CountingDelay, FixedClock, MockHardware, MockTransport, RecordingDisplay, RecordingSink,
};

const PREFIX: &str = "esp32/";

struct Bench {
    control: ControlLoop,
    hw: MockHardware,
    gateway: MessagingGateway<MockTransport>,
    clock: FixedClock,
    display: RecordingDisplay,
    sink: RecordingSink,
    delay: CountingDelay,
}

impl Bench {
    fn new(probe_c: f32) -> Self {
        let config = SystemConfig::default();
        let mut bench = Self {
            gateway: MessagingGateway::new(MockTransport::new(), PREFIX, config.reconnect_backoff_ms),
            control: ControlLoop::new(config),
            hw: MockHardware::with_probe(probe_c),
            clock: FixedClock::synced("07:30"),
            display: RecordingDisplay::default(),
            sink: RecordingSink::default(),
            delay: CountingDelay::default(),
        };
        bench.control.start(&mut bench.hw, &mut bench.sink);
        bench
    }

    fn iterate(&mut self, now_ms: u32) -> thermofan::runtime::IterationReport {
        self.control.iterate(
            now_ms,
            &mut self.hw,
            &mut self.gateway,
            &mut self.clock,
            &mut self.display,
            &mut self.sink,
            &mut self.delay,
        )
    }
}

#[test]
fn first_iteration_connects_samples_and_draws() {
    let mut bench = Bench::new(31.0);
    let report = bench.iterate(0);

    assert!(report.reconnected);
    assert_eq!(report.samples, 1);
    assert!(report.redrawn);
    assert_eq!(bench.clock.resyncs, 1);
    assert_eq!(bench.control.app().fan_state(), FanState::On);

    let t = bench.gateway.transport();
    assert_eq!(t.last_on("esp32/fan/temperature"), Some("31.00"));
    assert_eq!(t.last_on("esp32/fan/state"), Some("ON"));

    let frame = bench.display.last().unwrap();
    assert_eq!(frame[4], "Room  31.0 C");
    assert_eq!(frame[5], "Fan ON  AUTO 30.0/25.0");
}

#[test]
fn sampling_follows_the_configured_interval() {
    let mut bench = Bench::new(22.0);
    bench.iterate(0);

    assert_eq!(bench.iterate(1_000).samples, 0);
    assert_eq!(bench.iterate(4_999).samples, 0);
    assert_eq!(bench.iterate(5_000).samples, 1);
    assert_eq!(bench.hw.reads, 2);
}

#[test]
fn idle_iterations_do_not_redraw_until_the_safety_interval() {
    let mut bench = Bench::new(22.0);
    bench.iterate(0);
    assert!(!bench.iterate(1_000).redrawn);
    assert!(!bench.iterate(2_000).redrawn);

    let frames = bench.display.frames.len();
    bench.hw.probe = Err(thermofan::error::SensorError::NoDevice);
    bench.iterate(5_000);
    assert_eq!(bench.display.frames.len(), frames, "rejected sample changes nothing");

    assert!(bench.iterate(30_000).redrawn);
}

#[test]
fn inbound_command_is_applied_and_published() {
    let mut bench = Bench::new(22.0);
    bench.iterate(0);
    bench.gateway.transport_mut().clear();
    bench.gateway.transport_mut().inject("esp32/fan/cmd", b"on");

    let report = bench.iterate(100);

    assert_eq!(report.commands, 1);
    assert!(report.redrawn);
    assert_eq!(bench.control.app().mode(), FanMode::ForcedOn);
    assert!(bench.hw.relay);
    assert_eq!(
        bench.gateway.transport().topics(),
        vec!["esp32/fan/mode", "esp32/fan/state"]
    );
}

#[test]
fn weather_message_reaches_the_display() {
    let mut bench = Bench::new(22.0);
    bench.iterate(0);
    bench
        .gateway
        .transport_mut()
        .inject("esp32/weather/temperature", b"8.26");

    bench.iterate(200);

    let frame = bench.display.last().unwrap();
    assert_eq!(frame[0], "Weather @ 07:30");
    assert_eq!(frame[1], " Out   8.3 C");
}

#[test]
fn lost_session_is_restored_with_full_state() {
    let mut bench = Bench::new(31.0);
    bench.iterate(0);

    bench.gateway.transport_mut().drop_session();
    bench.gateway.transport_mut().fail_connects = 2;
    bench.gateway.transport_mut().clear();

    let report = bench.iterate(1_000);

    assert!(report.reconnected);
    assert_eq!(bench.delay.calls, 2);
    let t = bench.gateway.transport();
    assert_eq!(t.subscribed.len(), 6);
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
    assert_eq!(t.last_on("esp32/fan/state"), Some("ON"));
}
