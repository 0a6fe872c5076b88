//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements  | Connects to                  |
//! |------------|-------------|------------------------------|
//! | `log_sink` | EventSink   | `log` facade                 |
//! | `mqtt`     | Publisher   | MQTT broker via `rumqttc`    |
//! | `time`     | Clock       | `std::time::Instant`         |

pub mod log_sink;
pub mod mqtt;
pub mod time;
