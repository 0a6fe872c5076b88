//! Per-destination hysteresis state machine.
//!
//! Table-driven, one row per status:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────────┬──────────────────────────────────────┐    │
//! │  │ Status        │ on_update(rule, obs) -> Option<Step> │    │
//! │  ├───────────────┼──────────────────────────────────────┤    │
//! │  │ Uninitialized │ fn                                   │    │
//! │  │ Off           │ fn                                   │    │
//! │  │ Activating    │ fn                                   │    │
//! │  │ On            │ fn                                   │    │
//! │  │ Deactivating  │ fn                                   │    │
//! │  └───────────────┴──────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`evaluate`] runs the handler for the current status exactly once per
//! observation.  A handler returning `Some(step)` moves the state to
//! `step.next` and stamps the transition time; `None` leaves it untouched.
//! Evaluation is pure: the caller commits the returned [`Evaluation`].

pub mod states;

use log::debug;

use crate::rules::Rule;
use states::STATE_TABLE;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Hysteresis status of one destination topic.
/// Must stay in sync with [`states::STATE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// No reading seen since boot (or since eviction).
    Uninitialized = 0,
    Off = 1,
    /// Above threshold, dwelling before `payload_on` is sent.
    Activating = 2,
    On = 3,
    /// Below threshold, dwelling before `payload_off` is sent.
    Deactivating = 4,
}

impl Status {
    pub const COUNT: usize = 5;

    pub fn name(self) -> &'static str {
        STATE_TABLE[self as usize].name
    }
}

// ---------------------------------------------------------------------------
// State and evaluation types
// ---------------------------------------------------------------------------

/// Mutable state for one destination topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicState {
    pub status: Status,
    /// Monotonic milliseconds of the most recent status change.
    pub last_change_ms: u64,
}

impl TopicState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            status: Status::Uninitialized,
            last_change_ms: now_ms,
        }
    }
}

/// What a state handler sees for one message.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    /// Magnitude of the reading.
    pub value: f64,
    /// Milliseconds since the last status change (saturating).
    pub dwell_ms: u64,
}

/// Which payload a transition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    On,
    Off,
}

/// A handler's decision: the next status, optionally firing an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub next: Status,
    pub fire: Option<Output>,
}

impl Step {
    pub const fn to(next: Status) -> Self {
        Self { next, fire: None }
    }

    pub const fn firing(next: Status, output: Output) -> Self {
        Self {
            next,
            fire: Some(output),
        }
    }
}

/// An outbound message produced by a transition into `On` or `Off`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action<'r> {
    pub topic: &'r str,
    pub payload: &'r [u8],
    pub qos: u8,
}

/// Result of [`evaluate`].  Commit `status`/`last_change_ms`, then perform
/// `action` if present.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<'r> {
    pub previous: Status,
    pub status: Status,
    pub last_change_ms: u64,
    pub action: Option<Action<'r>>,
}

impl Evaluation<'_> {
    pub fn changed(&self) -> bool {
        self.previous != self.status
    }

    pub fn apply_to(&self, state: &mut TopicState) {
        state.status = self.status;
        state.last_change_ms = self.last_change_ms;
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compute the next state for `rule` given the current `state`, the reading
/// magnitude `value` and the monotonic time `now_ms`.
pub fn evaluate<'r>(rule: &'r Rule, state: &TopicState, value: f64, now_ms: u64) -> Evaluation<'r> {
    let obs = Observation {
        value,
        dwell_ms: now_ms.saturating_sub(state.last_change_ms),
    };
    let descriptor = &STATE_TABLE[state.status as usize];

    match (descriptor.on_update)(rule, &obs) {
        Some(step) => {
            debug!(
                "{}: {:.3} {} -> {}",
                rule.destination_topic,
                value,
                descriptor.name,
                step.next.name()
            );
            let action = step.fire.map(|out| Action {
                topic: &rule.destination_topic,
                payload: match out {
                    Output::On => rule.on_payload.as_slice(),
                    Output::Off => rule.off_payload.as_slice(),
                },
                qos: rule.qos,
            });
            Evaluation {
                previous: state.status,
                status: step.next,
                last_change_ms: now_ms,
                action,
            }
        }
        None => Evaluation {
            previous: state.status,
            status: state.status,
            last_change_ms: state.last_change_ms,
            action: None,
        },
    }
}
