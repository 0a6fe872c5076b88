//! Per-destination state store.
//!
//! Owned exclusively by the [`Dispatcher`](crate::app::service::Dispatcher);
//! every mutation goes through `&mut self`, so one writer per key is
//! enforced by the borrow checker rather than a lock.
//!
//! By default entries live for the whole process.  A capacity limit can be
//! set for deployments with an open-ended set of destination topics; the
//! least-recently-accessed entry is then evicted to make room and that
//! destination starts again from `Uninitialized` on its next message.

use std::collections::HashMap;

use log::debug;

use crate::fsm::TopicState;

#[derive(Debug, Clone)]
struct Entry {
    state: TopicState,
    last_access_ms: u64,
}

/// Mapping from destination topic to its hysteresis state.
#[derive(Debug, Clone, Default)]
pub struct TopicStateStore {
    entries: HashMap<String, Entry>,
    capacity: Option<usize>,
    evictions: u64,
}

impl TopicStateStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `max_entries` destinations (minimum one).
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            capacity: Some(max_entries.max(1)),
            ..Self::default()
        }
    }

    /// State for `destination`, created as `Uninitialized` at `now_ms` on
    /// first access.
    pub fn get_or_create(&mut self, destination: &str, now_ms: u64) -> &mut TopicState {
        if !self.entries.contains_key(destination) {
            self.make_room();
            debug!("Tracking new destination {}", destination);
        }
        let entry = self
            .entries
            .entry(destination.to_owned())
            .or_insert_with(|| Entry {
                state: TopicState::new(now_ms),
                last_access_ms: now_ms,
            });
        entry.last_access_ms = entry.last_access_ms.max(now_ms);
        &mut entry.state
    }

    /// Read-only view; does not create or touch the entry.
    pub fn get(&self, destination: &str) -> Option<&TopicState> {
        self.entries.get(destination).map(|e| &e.state)
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.entries.contains_key(destination)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Destination topics currently tracked, in no particular order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries dropped by the capacity limit since construction.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn make_room(&mut self) {
        let Some(cap) = self.capacity else {
            return;
        };
        while self.entries.len() >= cap {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access_ms)
                .map(|(k, _)| k.clone())
            else {
                return;
            };
            debug!("Evicting idle destination {}", oldest);
            self.entries.remove(&oldest);
            self.evictions += 1;
        }
    }
}
