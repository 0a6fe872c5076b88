//! Fuzz target: `Dispatcher::on_message_at`
//!
//! Splits the input into (time gap, topic selector, payload) records and
//! drives them through a two-rule dispatcher.  Publishes must only ever
//! land on a rule's destination with one of its two payloads.
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use schmitt_bridge::app::ports::{Clock, NullSink, Publisher};
use schmitt_bridge::app::service::Dispatcher;
use schmitt_bridge::error::PublishError;
use schmitt_bridge::rules::{RuleDefinition, RuleTable};
use schmitt_bridge::store::TopicStateStore;

struct Zero;

impl Clock for Zero {
    fn now_ms(&self) -> u64 {
        0
    }
}

struct Check;

impl Publisher for Check {
    fn publish(&mut self, topic: &str, payload: &[u8], _qos: u8) -> Result<(), PublishError> {
        assert!(topic == "r/a" || topic == "r/b", "unexpected destination {topic}");
        assert!(payload == b"on" || payload == b"off", "unexpected payload");
        Ok(())
    }
}

fn rule(from: &str, to: &str, threshold: f64) -> RuleDefinition {
    RuleDefinition {
        qos: 0,
        topic_from: from.into(),
        topic_to: to.into(),
        threshold,
        payload_on: "on".into(),
        payload_off: "off".into(),
        delay_on_ms: 100,
        delay_off_ms: 250,
    }
}

fuzz_target!(|data: &[u8]| {
    let defs = [rule("s/a", "r/a", 5.0), rule("s/b", "r/b", 0.5)];
    let mut d = Dispatcher::new(RuleTable::build(&defs), TopicStateStore::with_capacity_limit(1), Zero);
    let topics = ["s/a", "s/b", "x/y"];
    let mut now = 0u64;

    for record in data.split(|b| *b == b'|') {
        let Some((&head, payload)) = record.split_first() else {
            continue;
        };
        now += u64::from(head >> 2) * 10;
        let topic = topics[usize::from(head & 0b11) % topics.len()];
        d.on_message_at(topic, payload, now, &mut Check, &mut NullSink);
    }
});
