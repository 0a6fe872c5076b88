//! Dispatcher behaviour across rules, destinations and transport failures.

use schmitt_bridge::app::ports::NullSink;
use schmitt_bridge::app::service::{DispatchOutcome, Dispatcher};
use schmitt_bridge::error::PublishError;
use schmitt_bridge::fsm::Status;
use schmitt_bridge::rules::{RuleDefinition, RuleTable};
use schmitt_bridge::store::TopicStateStore;

use crate::mock_bus::{
    ManualClock, MockPublisher, Recorded, RecordingSink, dispatcher, reference_rule,
};

#[test]
fn start_reports_rule_counts() {
    let defs = [
        reference_rule("a", "x"),
        RuleDefinition::default(),
        reference_rule("b", "y"),
    ];
    let (d, _) = dispatcher(&defs);
    let mut sink = RecordingSink::new();
    d.start(&mut sink);
    assert_eq!(sink.events, [Recorded::Started(2, 1)]);
}

#[test]
fn on_message_reads_time_from_clock() {
    let (mut d, clock) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();

    clock.set(10_000);
    d.on_message("sensor", b"7", &mut bus, &mut NullSink);
    clock.set(10_999);
    d.on_message("sensor", b"7", &mut bus, &mut NullSink);
    assert!(bus.sent.is_empty());

    clock.set(11_000);
    d.on_message("sensor", b"7", &mut bus, &mut NullSink);
    assert_eq!(bus.payloads(), [&b"1"[..]]);
}

#[test]
fn destinations_are_independent() {
    let (mut d, _) = dispatcher(&[reference_rule("s1", "r1"), reference_rule("s2", "r2")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    d.on_message_at("s1", b"9", 0, &mut bus, &mut sink);
    d.on_message_at("s2", b"1", 0, &mut bus, &mut sink);
    d.on_message_at("s1", b"9", 1000, &mut bus, &mut sink);

    assert_eq!(d.status_of("r1"), Some(Status::On));
    assert_eq!(d.status_of("r2"), Some(Status::Deactivating));
    assert_eq!(bus.sent.len(), 1);
    assert_eq!(bus.sent[0].topic, "r1");
}

#[test]
fn two_sources_sharing_a_destination_share_its_state() {
    let mut second = reference_rule("s2", "shared");
    second.threshold = 50.0;
    let (mut d, _) = dispatcher(&[reference_rule("s1", "shared"), second]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    d.on_message_at("s1", b"9", 0, &mut bus, &mut sink);
    assert_eq!(d.status_of("shared"), Some(Status::Activating));
    // Below the second rule's threshold: breaks the dwell started by s1.
    d.on_message_at("s2", b"9", 100, &mut bus, &mut sink);
    assert_eq!(d.status_of("shared"), Some(Status::Off));
    assert_eq!(d.tracked_topics().count(), 1);
}

#[test]
fn publish_failure_is_reported_and_state_advances() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    bus.fail_with = Some(PublishError::Disconnected);
    let mut sink = RecordingSink::new();

    d.on_message_at("sensor", b"7", 0, &mut bus, &mut sink);
    let out = d.on_message_at("sensor", b"7", 1000, &mut bus, &mut sink);

    assert_eq!(
        out,
        DispatchOutcome::Evaluated {
            status: Status::On,
            published: true
        }
    );
    assert!(sink.events.contains(&Recorded::PublishFailed(
        "relay".into(),
        PublishError::Disconnected
    )));

    // No retry on the next confirming message.
    bus.fail_with = None;
    d.on_message_at("sensor", b"7", 5000, &mut bus, &mut sink);
    assert!(bus.sent.is_empty());
}

#[test]
fn successful_publish_is_reported() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();
    d.on_message_at("sensor", b"7", 0, &mut bus, &mut sink);
    d.on_message_at("sensor", b"7", 1000, &mut bus, &mut sink);
    assert_eq!(sink.events.last(), Some(&Recorded::Published("relay".into())));
}

#[test]
fn redelivery_in_steady_state_is_a_no_op() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();
    d.on_message_at("sensor", b"1", 0, &mut bus, &mut sink);
    d.on_message_at("sensor", b"1", 2000, &mut bus, &mut sink);
    let events_before = sink.events.len();

    for t in [2000, 2000, 3000, 60_000] {
        d.on_message_at("sensor", b"1", t, &mut bus, &mut sink);
    }
    assert_eq!(bus.payloads(), [&b"0"[..]]);
    assert_eq!(sink.events.len(), events_before);
}

#[test]
fn bounded_store_restarts_evicted_destinations() {
    let defs = [reference_rule("s1", "r1"), reference_rule("s2", "r2")];
    let mut d = Dispatcher::new(
        RuleTable::build(&defs),
        TopicStateStore::with_capacity_limit(1),
        ManualClock::new(),
    );
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    d.on_message_at("s1", b"9", 0, &mut bus, &mut sink);
    d.on_message_at("s1", b"9", 1000, &mut bus, &mut sink);
    assert_eq!(d.status_of("r1"), Some(Status::On));

    d.on_message_at("s2", b"9", 1100, &mut bus, &mut sink);
    assert!(d.status_of("r1").is_none());

    let out = d.on_message_at("s1", b"9", 1200, &mut bus, &mut sink);
    assert_eq!(
        out,
        DispatchOutcome::Evaluated {
            status: Status::Activating,
            published: false
        }
    );
}
