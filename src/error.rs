//! Error types for the bridge.
//!
//! Each subsystem owns a small error enum; the bootstrap carries them into
//! `anyhow` directly.  None of these originate in rule evaluation: the
//! hysteresis core never fails, it only reports.

use core::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file exists at any of the searched locations.
    NotFound(Vec<PathBuf>),
    /// The file exists but could not be read.
    Io(PathBuf, std::io::Error),
    /// The file is not valid JSON for [`BridgeConfig`](crate::config::BridgeConfig).
    Parse(String),
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// Strict mode is on and this many rule definitions were dropped.
    RulesRejected(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(paths) => {
                write!(f, "configuration not found (searched")?;
                for p in paths {
                    write!(f, " {}", p.display())?;
                }
                write!(f, ")")
            }
            Self::Io(path, e) => write!(f, "failed opening {}: {e}", path.display()),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::RulesRejected(n) => write!(f, "{n} rule definition(s) rejected in strict mode"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The transport's outbound queue is full.
    QueueFull,
    /// The broker session is down or the request channel is gone.
    Disconnected,
    /// The rule's QoS level has no wire representation.
    InvalidQos(u8),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "outbound queue full"),
            Self::Disconnected => write!(f, "transport disconnected"),
            Self::InvalidQos(q) => write!(f, "invalid QoS level {q}"),
        }
    }
}

impl std::error::Error for PublishError {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum TransportError {
    /// The first connection attempt to the broker failed.
    ConnectFailed(String),
    /// Subscribing to a source topic failed.
    SubscribeFailed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed(msg) => write!(f, "unable to connect: {msg}"),
            Self::SubscribeFailed(topic) => write!(f, "unable to subscribe to {topic}"),
        }
    }
}

impl std::error::Error for TransportError {}
