//! Message dispatcher — the hexagonal core.
//!
//! [`Dispatcher`] owns the rule table, the per-destination state store and
//! a clock.  Each inbound message runs one full cycle:
//!
//! ```text
//!  (topic, payload)
//!        │
//!        ▼
//!  RuleTable ──none──▶ Unroutable (dropped)
//!        │ rule
//!        ▼
//!  TopicStateStore[rule.destination] ──▶ fsm::evaluate ──▶ commit
//!                                                    │
//!                                           action?  ▼
//!                                              Publisher
//! ```
//!
//! The transition is committed before the publish is attempted; a failed
//! publish is reported and the state machine keeps going.

use log::{debug, info, warn};

use crate::fsm::{self, Status};
use crate::payload::parse_reading;
use crate::rules::RuleTable;
use crate::store::TopicStateStore;

use super::events::BridgeEvent;
use super::ports::{Clock, EventSink, Publisher};

// ───────────────────────────────────────────────────────────────
// Outcome
// ───────────────────────────────────────────────────────────────

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No rule listens to the topic; nothing was touched.
    Unroutable,
    /// The rule was evaluated.
    Evaluated {
        /// Status of the destination after this message.
        status: Status,
        /// An on/off payload was produced (whether or not the transport
        /// accepted it).
        published: bool,
    },
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

pub struct Dispatcher<C> {
    rules: RuleTable,
    states: TopicStateStore,
    clock: C,
    messages: u64,
    unroutable: u64,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(rules: RuleTable, states: TopicStateStore, clock: C) -> Self {
        Self {
            rules,
            states,
            clock,
            messages: 0,
            unroutable: 0,
        }
    }

    /// Announce readiness on `sink`.
    pub fn start(&self, sink: &mut impl EventSink) {
        info!(
            "Dispatcher started with {} rule(s), {} rejected",
            self.rules.len(),
            self.rules.rejected_count()
        );
        sink.emit(&BridgeEvent::Started {
            rules: self.rules.len(),
            rejected: self.rules.rejected_count(),
        });
    }

    /// Handle one inbound message stamped with the dispatcher's clock.
    pub fn on_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        publisher: &mut impl Publisher,
        sink: &mut impl EventSink,
    ) -> DispatchOutcome {
        let now_ms = self.clock.now_ms();
        self.on_message_at(topic, payload, now_ms, publisher, sink)
    }

    /// Handle one inbound message at an explicit monotonic time.
    pub fn on_message_at(
        &mut self,
        topic: &str,
        payload: &[u8],
        now_ms: u64,
        publisher: &mut impl Publisher,
        sink: &mut impl EventSink,
    ) -> DispatchOutcome {
        self.messages += 1;

        // 1. Route
        let Some(rule) = self.rules.find_by_source_topic(topic) else {
            self.unroutable += 1;
            warn!("No rule found for topic: {}", topic);
            sink.emit(&BridgeEvent::Unroutable { topic });
            return DispatchOutcome::Unroutable;
        };

        // 2. Read value
        let reading = parse_reading(payload);
        if reading.malformed {
            debug!(
                "Malformed payload on {} ({:?}), reading as 0",
                topic,
                String::from_utf8_lossy(payload)
            );
            sink.emit(&BridgeEvent::MalformedValue { topic, payload });
        }

        // 3. Evaluate and commit
        let state = self.states.get_or_create(&rule.destination_topic, now_ms);
        let eval = fsm::evaluate(rule, state, reading.magnitude, now_ms);
        eval.apply_to(state);

        if eval.changed() {
            sink.emit(&BridgeEvent::StateChanged {
                destination: &rule.destination_topic,
                value: reading.magnitude,
                from: eval.previous,
                to: eval.status,
            });
        } else {
            debug!(
                "{}: {:.3} holds {}",
                rule.destination_topic,
                reading.magnitude,
                eval.status.name()
            );
        }

        // 4. Act
        let published = eval.action.is_some();
        if let Some(action) = eval.action {
            match publisher.publish(action.topic, action.payload, action.qos) {
                Ok(()) => {
                    debug!(
                        "Published {:?} to {} (qos {})",
                        String::from_utf8_lossy(action.payload),
                        action.topic,
                        action.qos
                    );
                    sink.emit(&BridgeEvent::Published {
                        destination: action.topic,
                        payload: action.payload,
                        qos: action.qos,
                    });
                }
                Err(error) => {
                    warn!("Publish to {} failed: {}", action.topic, error);
                    sink.emit(&BridgeEvent::PublishFailed {
                        destination: action.topic,
                        error,
                    });
                }
            }
        }

        DispatchOutcome::Evaluated {
            status: eval.status,
            published,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Current status of a destination, if it has seen a message.
    pub fn status_of(&self, destination: &str) -> Option<Status> {
        self.states.get(destination).map(|s| s.status)
    }

    /// Destination topics with live state.
    pub fn tracked_topics(&self) -> impl Iterator<Item = &str> {
        self.states.topics()
    }

    /// Messages handled since construction, routable or not.
    pub fn message_count(&self) -> u64 {
        self.messages
    }

    pub fn unroutable_count(&self) -> u64 {
        self.unroutable
    }
}
