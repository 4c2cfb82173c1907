//! Fuzz target: inbound topic + payload decoding
//!
//! The input is a sequence of newline-separated records.  Each record is
//! split at its first NUL into a topic and a payload and run through topic
//! matching and payload decoding; every threshold command lands in the same
//! store.  Must never panic, never yield a non-finite value and never break
//! the threshold gap or leave a threshold that cannot be republished.
//!
//! cargo fuzz run fuzz_inbound_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermofan::app::commands::AppCommand;
use thermofan::app::events::Publication;
use thermofan::config::SystemConfig;
use thermofan::control::thresholds::ThresholdStore;
use thermofan::mqtt::codec;
use thermofan::mqtt::topics::InboundTopic;
use thermofan::mqtt::InboundMessage;

const PREFIX: &str = "esp32/";

fn decode_record(record: &[u8]) -> Option<AppCommand> {
    let split = record.iter().position(|&b| b == 0).unwrap_or(record.len());
    let (topic, rest) = record.split_at(split);
    let payload = rest.get(1..).unwrap_or(&[]);

    let topic = core::str::from_utf8(topic).ok()?;
    let msg = InboundMessage::new(topic, payload)?;
    let inbound = InboundTopic::decode(PREFIX, &msg.topic)?;
    codec::decode(inbound, &msg.payload)
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let mut store = ThresholdStore::new(&config);

    for record in data.split(|&b| b == b'\n') {
        match decode_record(record) {
            Some(AppCommand::SetActivate(v)) => {
                assert!(v.is_finite());
                store.set_activate(v);
            }
            Some(AppCommand::SetDeactivate(v)) => {
                assert!(v.is_finite());
                store.set_deactivate(v);
            }
            Some(AppCommand::Weather { value, .. }) => assert!(value.is_finite()),
            Some(AppCommand::SetMode(_)) | None => {}
        }

        let t = store.get();
        assert!(t.activate_c - t.deactivate_c >= config.min_gap_c - 1e-4);
        assert!(codec::encode(&Publication::ActivateThreshold(t.activate_c)).is_some());
        assert!(codec::encode(&Publication::DeactivateThreshold(t.deactivate_c)).is_some());
    }
});
