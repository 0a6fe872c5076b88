//! Concrete status handlers and the static state table.
//!
//! ```text
//!          [v ≥ thr]             [v ≥ thr, Δt ≥ on] / payload_on
//!   OFF ─────────────▶ ACTIVATING ──────────────────────────────▶ ON
//!    ▲ ◀─────────────────────┘                                    │ ▲
//!    │        [v < thr]                                 [v < thr] │ │ [v ≥ thr]
//!    │                                                            ▼ │
//!    └──────────────────────────────────────────────────── DEACTIVATING
//!             [v < thr, Δt ≥ off] / payload_off
//!
//!   UNINIT ──[v ≥ thr]──▶ ACTIVATING
//!   UNINIT ──[v < thr]──▶ DEACTIVATING
//! ```
//!
//! Only the two dwell states ever fire an output.

use super::{Observation, Output, Status, Step};
use crate::rules::Rule;

/// Per-observation handler.  `Some(step)` transitions, `None` stays.
pub type StateUpdateFn = fn(&Rule, &Observation) -> Option<Step>;

/// One row of the state table.
pub struct StateDescriptor {
    pub id: Status,
    pub name: &'static str,
    pub on_update: StateUpdateFn,
}

/// Indexed by `Status as usize`.
pub static STATE_TABLE: [StateDescriptor; Status::COUNT] = [
    StateDescriptor {
        id: Status::Uninitialized,
        name: "Uninitialized",
        on_update: uninitialized_update,
    },
    StateDescriptor {
        id: Status::Off,
        name: "Off",
        on_update: off_update,
    },
    StateDescriptor {
        id: Status::Activating,
        name: "Activating",
        on_update: activating_update,
    },
    StateDescriptor {
        id: Status::On,
        name: "On",
        on_update: on_state_update,
    },
    StateDescriptor {
        id: Status::Deactivating,
        name: "Deactivating",
        on_update: deactivating_update,
    },
];

// ═══════════════════════════════════════════════════════════════════════════
//  UNINITIALIZED
// ═══════════════════════════════════════════════════════════════════════════

fn uninitialized_update(rule: &Rule, obs: &Observation) -> Option<Step> {
    if rule.is_above(obs.value) {
        Some(Step::to(Status::Activating))
    } else {
        Some(Step::to(Status::Deactivating))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF
// ═══════════════════════════════════════════════════════════════════════════

fn off_update(rule: &Rule, obs: &Observation) -> Option<Step> {
    rule.is_above(obs.value).then_some(Step::to(Status::Activating))
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVATING
// ═══════════════════════════════════════════════════════════════════════════

fn activating_update(rule: &Rule, obs: &Observation) -> Option<Step> {
    if !rule.is_above(obs.value) {
        return Some(Step::to(Status::Off));
    }
    (obs.dwell_ms >= rule.on_delay_ms).then_some(Step::firing(Status::On, Output::On))
}

// ═══════════════════════════════════════════════════════════════════════════
//  ON
// ═══════════════════════════════════════════════════════════════════════════

fn on_state_update(rule: &Rule, obs: &Observation) -> Option<Step> {
    (!rule.is_above(obs.value)).then_some(Step::to(Status::Deactivating))
}

// ═══════════════════════════════════════════════════════════════════════════
//  DEACTIVATING
// ═══════════════════════════════════════════════════════════════════════════

fn deactivating_update(rule: &Rule, obs: &Observation) -> Option<Step> {
    if rule.is_above(obs.value) {
        return Some(Step::to(Status::On));
    }
    (obs.dwell_ms >= rule.off_delay_ms).then_some(Step::firing(Status::Off, Output::Off))
}
