//! Rule definitions and the immutable rule table.
//!
//! A [`RuleDefinition`] is what the configuration layer hands over: every
//! field is optional-ish and unchecked.  [`RuleTable::build`] turns the list
//! into the active set of [`Rule`]s, keyed by source topic.  Definitions with
//! an empty source or destination topic are dropped (they are unused slots,
//! not errors) but each one is logged and counted so a stricter host can
//! refuse to start.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

/// One candidate rule as supplied by configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDefinition {
    /// Delivery quality for both the subscription and the derived publish.
    pub qos: u8,
    /// Topic carrying numeric readings.
    pub topic_from: String,
    /// Topic receiving the on/off payloads.
    pub topic_to: String,
    /// Magnitudes at or above this value count as "on".
    pub threshold: f64,
    pub payload_on: String,
    pub payload_off: String,
    /// Dwell before `payload_on` is sent (milliseconds).
    pub delay_on_ms: u64,
    /// Dwell before `payload_off` is sent (milliseconds).
    pub delay_off_ms: u64,
}

/// A validated rule.  Immutable once the table is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub qos: u8,
    pub source_topic: String,
    pub destination_topic: String,
    pub threshold: f64,
    pub on_payload: Vec<u8>,
    pub off_payload: Vec<u8>,
    pub on_delay_ms: u64,
    pub off_delay_ms: u64,
}

impl Rule {
    /// Validate a definition.  Returns `None` when either topic is empty.
    pub fn from_definition(def: &RuleDefinition) -> Option<Self> {
        if def.topic_from.is_empty() || def.topic_to.is_empty() {
            return None;
        }
        Some(Self {
            qos: def.qos,
            source_topic: def.topic_from.clone(),
            destination_topic: def.topic_to.clone(),
            threshold: def.threshold,
            on_payload: def.payload_on.as_bytes().to_vec(),
            off_payload: def.payload_off.as_bytes().to_vec(),
            on_delay_ms: def.delay_on_ms,
            off_delay_ms: def.delay_off_ms,
        })
    }

    /// True when `magnitude` sits on the "on" side of the threshold.
    pub fn is_above(&self, magnitude: f64) -> bool {
        magnitude >= self.threshold
    }
}

/// The active rule set, keyed by source topic.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Rule>,
    /// Source topics in first-seen order, for deterministic subscription.
    order: Vec<String>,
    rejected: usize,
}

impl RuleTable {
    /// Build the table from configuration order.  Later definitions for an
    /// already-seen source topic replace the earlier one.
    pub fn build<'a>(defs: impl IntoIterator<Item = &'a RuleDefinition>) -> Self {
        let mut table = Self::default();
        for (slot, def) in defs.into_iter().enumerate() {
            let Some(rule) = Rule::from_definition(def) else {
                warn!(
                    "Rule slot {} rejected: empty topic (from={:?}, to={:?})",
                    slot, def.topic_from, def.topic_to
                );
                table.rejected += 1;
                continue;
            };
            let key = rule.source_topic.clone();
            if let Some(prev) = table.rules.insert(key.clone(), rule) {
                warn!(
                    "Rule slot {} overrides earlier rule for {} (was -> {})",
                    slot, key, prev.destination_topic
                );
            } else {
                table.order.push(key);
            }
        }
        table
    }

    /// Exact-match lookup by the topic a message arrived on.
    pub fn find_by_source_topic(&self, topic: &str) -> Option<&Rule> {
        self.rules.get(topic)
    }

    /// Active rules in the order their source topics first appeared.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.order.iter().filter_map(|t| self.rules.get(t))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// How many definitions were dropped for having an empty topic.
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }
}
