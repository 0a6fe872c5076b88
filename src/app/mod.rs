//! Application core — routing and hysteresis, zero I/O.
//!
//! The [`service::Dispatcher`] turns inbound `(topic, payload)` pairs into
//! state transitions and outbound on/off payloads.  Everything that talks
//! to a broker, a clock or a log goes through the **port traits** in
//! [`ports`], keeping this layer testable without a broker.

pub mod events;
pub mod ports;
pub mod service;
