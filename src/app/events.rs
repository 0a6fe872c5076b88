//! Outbound application events.
//!
//! The [`Dispatcher`](super::service::Dispatcher) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters decide what to do
//! with them; the stock one writes a log line per event.

use crate::error::PublishError;
use crate::fsm::Status;

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent<'a> {
    /// The dispatcher is ready with this many active rules.
    Started { rules: usize, rejected: usize },

    /// A message arrived on a topic no rule listens to.
    Unroutable { topic: &'a str },

    /// A payload had no numeric prefix and was read as zero.
    MalformedValue { topic: &'a str, payload: &'a [u8] },

    /// A destination changed status.
    StateChanged {
        destination: &'a str,
        value: f64,
        from: Status,
        to: Status,
    },

    /// An on/off payload was handed to the transport.
    Published { destination: &'a str, payload: &'a [u8], qos: u8 },

    /// The transport refused an on/off payload.  The transition stands.
    PublishFailed {
        destination: &'a str,
        error: PublishError,
    },
}
