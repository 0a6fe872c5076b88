//! schmitt-bridge library.
//!
//! Rule-driven MQTT bridge: numeric readings on source topics drive
//! per-destination Schmitt triggers with asymmetric dwell delays, and each
//! settled transition publishes a fixed on/off payload.
//!
//! The hysteresis core (`rules`, `store`, `fsm`, `payload`, `app`) does no
//! I/O; `adapters` connects it to a broker, a clock and the log.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod payload;
pub mod rules;
pub mod store;
