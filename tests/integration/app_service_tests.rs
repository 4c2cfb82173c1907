//! AppService against the shared mocks: weather cache, events and relay
//! faults.

use thermofan::app::commands::AppCommand;
use thermofan::app::events::{AppEvent, Publication};
use thermofan::app::service::AppService;
use thermofan::config::SystemConfig;
use thermofan::error::ActuatorError;
use thermofan::fsm::context::WeatherField;
use thermofan::fsm::{FanMode, FanState};

use crate::mock_hw::{FixedClock, MockHardware, RecordingPublisher, RecordingSink};

fn make_app() -> (AppService, MockHardware, RecordingPublisher, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::default();
    app.start(&mut hw, &mut sink);
    (app, hw, RecordingPublisher::default(), sink)
}

#[test]
fn start_releases_relay_and_announces() {
    let (_app, hw, _out, sink) = make_app();
    assert_eq!(hw.writes, vec![false]);
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            mode: FanMode::Auto,
            state: FanState::Off
        }]
    );
}

#[test]
fn weather_update_is_stamped_when_clock_is_synced() {
    let (mut app, mut hw, mut out, mut sink) = make_app();
    let clock = FixedClock::synced("14:05");

    app.handle_command(
        AppCommand::Weather {
            field: WeatherField::Temperature,
            value: 12.34,
        },
        &mut hw,
        &mut out,
        &clock,
        &mut sink,
    );

    let weather = app.weather();
    assert_eq!(weather.get(WeatherField::Temperature), Some("12.3"));
    assert_eq!(weather.last_update.as_deref(), Some("14:05"));
    assert!(weather.updated);
    assert!(out.published.is_empty(), "weather is display-only");
    assert!(hw.writes.len() == 1, "weather never touches the relay");
}

#[test]
fn unsynced_clock_keeps_previous_stamp() {
    let (mut app, mut hw, mut out, mut sink) = make_app();
    let weather = |value| AppCommand::Weather {
        field: WeatherField::Humidity,
        value,
    };

    app.handle_command(weather(40.0), &mut hw, &mut out, &FixedClock::synced("09:00"), &mut sink);
    app.handle_command(weather(41.0), &mut hw, &mut out, &FixedClock::default(), &mut sink);

    assert_eq!(app.weather().get(WeatherField::Humidity), Some("41"));
    assert_eq!(app.weather().last_update.as_deref(), Some("09:00"));
}

#[test]
fn weather_marks_display_dirty() {
    let (mut app, mut hw, mut out, mut sink) = make_app();
    app.take_dirty();
    app.handle_command(
        AppCommand::Weather {
            field: WeatherField::Pressure,
            value: 1009.0,
        },
        &mut hw,
        &mut out,
        &FixedClock::default(),
        &mut sink,
    );
    assert!(app.is_dirty());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::WeatherUpdated { .. })),
        1
    );
}

#[test]
fn accepted_sample_is_published_and_kept() {
    let (mut app, _, mut out, mut sink) = make_app();
    let mut hw = MockHardware::with_probe(23.456);
    app.on_sample(&mut hw, &mut out, &mut sink);
    assert_eq!(out.published, vec![Publication::LocalTemperature(23.456)]);
    assert_eq!(app.snapshot().last_valid_c, Some(23.456));
}

#[test]
fn relay_fault_is_reported_but_state_advances() {
    let (mut app, _, mut out, mut sink) = make_app();
    let mut hw = MockHardware::with_probe(33.0);
    hw.fail_writes = true;

    let transition = app.on_sample(&mut hw, &mut out, &mut sink);

    assert!(transition.is_some());
    assert_eq!(app.fan_state(), FanState::On);
    assert!(
        sink.events
            .contains(&AppEvent::ActuatorFault(ActuatorError::GpioWriteFailed))
    );
    assert_eq!(out.published.last(), Some(&Publication::FanState(FanState::On)));
}

#[test]
fn threshold_event_carries_requested_and_effective_values() {
    let (mut app, mut hw, mut out, mut sink) = make_app();
    app.handle_command(
        AppCommand::SetDeactivate(32.0),
        &mut hw,
        &mut out,
        &FixedClock::default(),
        &mut sink,
    );
    let Some(AppEvent::ThresholdsChanged {
        thresholds,
        requested,
    }) = sink.events.last()
    else {
        panic!("expected ThresholdsChanged, got {:?}", sink.events.last());
    };
    assert_eq!(*requested, 32.0);
    assert_eq!(thresholds.deactivate_c, 29.5);
    assert_eq!(thresholds.activate_c, 30.0);
}

#[test]
fn failed_relay_write_in_forced_mode_is_retried_on_next_sample() {
    let (mut app, mut hw, mut out, mut sink) = make_app();
    hw.fail_writes = true;
    app.handle_command(
        AppCommand::SetMode(FanMode::ForcedOn),
        &mut hw,
        &mut out,
        &FixedClock::default(),
        &mut sink,
    );
    assert_eq!(app.fan_state(), FanState::On);
    assert!(!hw.relay);

    // Still failing: every pass reports the fault again.
    app.on_sample(&mut hw, &mut out, &mut sink);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuatorFault(_))),
        2
    );

    hw.fail_writes = false;
    out.published.clear();
    let transition = app.on_sample(&mut hw, &mut out, &mut sink);

    assert!(transition.is_none());
    assert!(hw.relay);
    assert_eq!(hw.writes, vec![false, true]);
    assert!(out.published.is_empty(), "state was already published");
}

#[test]
fn matching_relay_is_not_rewritten() {
    let (mut app, _, mut out, mut sink) = make_app();
    let mut hw = MockHardware::with_probe(22.0);
    for _ in 0..3 {
        app.on_sample(&mut hw, &mut out, &mut sink);
    }
    assert!(hw.writes.is_empty());
}
