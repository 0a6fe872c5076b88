//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`BridgeEvent`] as one line
//! through the `log` facade.  The tag at the start of each line is stable
//! so the output can be grepped.

use log::{debug, info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent<'_>) {
        match event {
            BridgeEvent::Started { rules, rejected } => {
                info!("START | rules={} rejected={}", rules, rejected);
            }
            BridgeEvent::Unroutable { topic } => {
                debug!("DROP  | unroutable topic={}", topic);
            }
            BridgeEvent::MalformedValue { topic, payload } => {
                debug!(
                    "VALUE | malformed topic={} payload={:?}",
                    topic,
                    String::from_utf8_lossy(payload)
                );
            }
            BridgeEvent::StateChanged {
                destination,
                value,
                from,
                to,
            } => {
                info!("STATE | {} {:.3} {:?} -> {:?}", destination, value, from, to);
            }
            BridgeEvent::Published {
                destination,
                payload,
                qos,
            } => {
                info!(
                    "PUB   | {} <- {:?} qos={}",
                    destination,
                    String::from_utf8_lossy(payload),
                    qos
                );
            }
            BridgeEvent::PublishFailed { destination, error } => {
                warn!("PUB   | {} failed: {}", destination, error);
            }
        }
    }
}
