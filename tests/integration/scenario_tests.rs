//! Reference scenarios for a single rule:
//! threshold 5.0, on-delay 1000 ms, off-delay 2000 ms, payloads "1"/"0".

use schmitt_bridge::app::service::DispatchOutcome;
use schmitt_bridge::fsm::Status;

use crate::mock_bus::{MockPublisher, RecordingSink, dispatcher, reference_rule};

fn evaluated(status: Status, published: bool) -> DispatchOutcome {
    DispatchOutcome::Evaluated { status, published }
}

// ── Scenario A: dwell then fire once ──────────────────────────

#[test]
fn scenario_a_activation_fires_after_dwell() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    let steps = [
        (0, evaluated(Status::Activating, false)),
        (500, evaluated(Status::Activating, false)),
        (1100, evaluated(Status::On, true)),
        (1100, evaluated(Status::On, false)),
    ];
    for (t, expected) in steps {
        let out = d.on_message_at("sensor", b"7", t, &mut bus, &mut sink);
        assert_eq!(out, expected, "at t={t}");
    }

    assert_eq!(bus.sent.len(), 1);
    assert_eq!(bus.sent[0].topic, "relay");
    assert_eq!(bus.sent[0].payload, b"1");
    assert_eq!(bus.sent[0].qos, 1);
}

// ── Scenario B: dwell broken ──────────────────────────────────

#[test]
fn scenario_b_sub_threshold_value_breaks_dwell() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    d.on_message_at("sensor", b"7", 0, &mut bus, &mut sink);
    let out = d.on_message_at("sensor", b"2", 200, &mut bus, &mut sink);

    assert_eq!(out, evaluated(Status::Off, false));
    assert!(bus.sent.is_empty());
    assert_eq!(
        sink.transitions(),
        [
            (Status::Uninitialized, Status::Activating),
            (Status::Activating, Status::Off)
        ]
    );
}

// ── Scenario C: malformed payload reads as zero ──────────────

#[test]
fn scenario_c_malformed_payload_behaves_like_zero() {
    let starts: [&[&[u8]]; 3] = [&[], &[&b"7"[..]], &[&b"7"[..], &b"7"[..]]];
    for prefix in starts {
        let (mut with_abc, _) = dispatcher(&[reference_rule("sensor", "relay")]);
        let (mut with_zero, _) = dispatcher(&[reference_rule("sensor", "relay")]);
        let mut bus_a = MockPublisher::new();
        let mut bus_b = MockPublisher::new();
        let mut sink = RecordingSink::new();

        for (i, p) in prefix.iter().enumerate() {
            let t = i as u64 * 1500;
            with_abc.on_message_at("sensor", p, t, &mut bus_a, &mut sink);
            with_zero.on_message_at("sensor", p, t, &mut bus_b, &mut sink);
        }
        let a = with_abc.on_message_at("sensor", b"abc", 5000, &mut bus_a, &mut sink);
        let b = with_zero.on_message_at("sensor", b"0", 5000, &mut bus_b, &mut RecordingSink::new());

        assert_eq!(a, b, "prefix {prefix:?}");
        assert_eq!(bus_a.sent, bus_b.sent);
    }
}

#[test]
fn scenario_c_malformed_payload_is_reported() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut sink = RecordingSink::new();
    d.on_message_at("sensor", b"abc", 0, &mut MockPublisher::new(), &mut sink);
    assert!(
        sink.events
            .contains(&crate::mock_bus::Recorded::Malformed("sensor".into()))
    );
    assert_eq!(d.status_of("relay"), Some(Status::Deactivating));
}

// ── Scenario D: unroutable topic ──────────────────────────────

#[test]
fn scenario_d_unroutable_topic_touches_nothing() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    for payload in [&b"7"[..], b"0", b"abc", b""] {
        let out = d.on_message_at("x/y", payload, 0, &mut bus, &mut sink);
        assert_eq!(out, DispatchOutcome::Unroutable);
    }

    assert!(bus.sent.is_empty());
    assert_eq!(d.tracked_topics().count(), 0);
    assert!(d.status_of("x/y").is_none());
    assert_eq!(d.unroutable_count(), 4);
}

// ── Full cycle ────────────────────────────────────────────────

#[test]
fn full_on_off_cycle_publishes_each_payload_once() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    let feed = [
        (0, "9"),
        (1000, "9"), // -> On, "1"
        (1500, "9"),
        (2000, "1"), // -> Deactivating
        (3000, "1"),
        (4000, "1"), // -> Off, "0"
        (4100, "-1"),
        (9000, "0"),
    ];
    for (t, v) in feed {
        d.on_message_at("sensor", v.as_bytes(), t, &mut bus, &mut sink);
    }

    assert_eq!(bus.payloads(), [&b"1"[..], &b"0"[..]]);
    assert_eq!(d.status_of("relay"), Some(Status::Off));
}

#[test]
fn negative_readings_use_their_magnitude() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    d.on_message_at("sensor", b"-8", 0, &mut bus, &mut sink);
    d.on_message_at("sensor", b"-8.5", 1000, &mut bus, &mut sink);
    assert_eq!(d.status_of("relay"), Some(Status::On));
    assert_eq!(bus.payloads(), [&b"1"[..]]);
}

#[test]
fn out_of_range_reading_counts_as_above_threshold() {
    let mut rule = reference_rule("sensor", "relay");
    rule.delay_on_ms = 0;
    rule.delay_off_ms = 0;
    let (mut d, _) = dispatcher(&[rule]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    d.on_message_at("sensor", b"9", 0, &mut bus, &mut sink);
    d.on_message_at("sensor", b"9", 0, &mut bus, &mut sink);
    assert_eq!(d.status_of("relay"), Some(Status::On));

    for t in [10, 20] {
        let out = d.on_message_at("sensor", b"1e999", t, &mut bus, &mut sink);
        assert_eq!(out, evaluated(Status::On, false), "at t={t}");
    }

    assert_eq!(bus.payloads(), [&b"1"[..]]);
    assert!(
        !sink
            .events
            .contains(&crate::mock_bus::Recorded::Malformed("sensor".into()))
    );
}

// ── Dwell reset ───────────────────────────────────────────────

#[test]
fn re_entering_activation_restarts_the_dwell() {
    let (mut d, _) = dispatcher(&[reference_rule("sensor", "relay")]);
    let mut bus = MockPublisher::new();
    let mut sink = RecordingSink::new();

    let steps: [(u64, &[u8], DispatchOutcome); 5] = [
        (0, &b"7"[..], evaluated(Status::Activating, false)),
        (200, &b"2"[..], evaluated(Status::Off, false)),
        (300, &b"7"[..], evaluated(Status::Activating, false)),
        // 1100 ms since the first rise, only 800 ms since the second.
        (1100, &b"7"[..], evaluated(Status::Activating, false)),
        (1300, &b"7"[..], evaluated(Status::On, true)),
    ];
    for (t, payload, expected) in steps {
        let out = d.on_message_at("sensor", payload, t, &mut bus, &mut sink);
        assert_eq!(out, expected, "at t={t}");
    }

    assert_eq!(bus.payloads(), [&b"1"[..]]);
}
