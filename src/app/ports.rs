//! Port traits — the boundary between the hysteresis core and the outside.
//!
//! ```text
//!   Transport ──▶ Dispatcher::on_message ──▶ Publisher
//!                        │
//!                        └──▶ EventSink
//! ```
//!
//! The [`Dispatcher`](super::service::Dispatcher) takes these via generics
//! at call sites, so the core never touches a broker session directly and
//! every test can swap in a recording mock.

use crate::error::PublishError;

// ───────────────────────────────────────────────────────────────
// Publisher (driven adapter: core → transport)
// ───────────────────────────────────────────────────────────────

/// Outbound side of the bus.
///
/// Fire-and-continue: implementations must not block waiting for broker
/// acknowledgement.  A returned error is logged by the caller and never
/// retried.
pub trait Publisher {
    fn publish(&mut self, topic: &str, payload: &[u8], qos: u8) -> Result<(), PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent<'_>);
}

/// Sink that drops everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::BridgeEvent<'_>) {}
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Never goes backwards; the origin is
/// arbitrary (process start for the system adapter).
pub trait Clock {
    fn now_ms(&self) -> u64;
}
