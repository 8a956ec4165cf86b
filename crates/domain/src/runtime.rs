//! Volatile per-area bookkeeping: inclusion override and rate-limit anchor.
//!
//! Never persisted; rebuilt from the configured areas at startup.

use std::collections::HashMap;

use crate::area::Area;
use crate::id::AreaId;
use crate::time::{Timestamp, seconds_between};

/// Runtime state of a single area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaRuntime {
    pub included: bool,
    /// Time of the last committed actuator write.
    pub last_change: Option<Timestamp>,
}

impl AreaRuntime {
    #[must_use]
    pub fn new(included: bool) -> Self {
        Self {
            included,
            last_change: None,
        }
    }

    /// Whether a write at `now` would come too soon after the last one.
    #[must_use]
    pub fn is_rate_limited(&self, now: Timestamp, min_change_seconds: u64) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let min = min_change_seconds as f64;
        self.last_change
            .is_some_and(|last| seconds_between(last, now) < min)
    }
}

/// Runtime entries for every configured area.
#[derive(Debug, Clone, Default)]
pub struct RuntimeStore {
    entries: HashMap<AreaId, AreaRuntime>,
}

impl RuntimeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries for new areas and drop entries of removed ones.
    ///
    /// Existing entries keep their runtime inclusion override.
    pub fn sync_with(&mut self, areas: &[Area]) {
        self.entries
            .retain(|id, _| areas.iter().any(|area| area.id == *id));
        for area in areas {
            self.entries
                .entry(area.id)
                .or_insert_with(|| AreaRuntime::new(area.included));
        }
    }

    #[must_use]
    pub fn get(&self, id: AreaId) -> Option<&AreaRuntime> {
        self.entries.get(&id)
    }

    /// Runtime inclusion of `area`, falling back to its configured flag.
    #[must_use]
    pub fn is_included(&self, area: &Area) -> bool {
        self.entries
            .get(&area.id)
            .map_or(area.included, |rt| rt.included)
    }

    pub fn set_included(&mut self, id: AreaId, included: bool) {
        self.entries
            .entry(id)
            .or_insert_with(|| AreaRuntime::new(included))
            .included = included;
    }

    #[must_use]
    pub fn is_rate_limited(&self, id: AreaId, now: Timestamp, min_change_seconds: u64) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|rt| rt.is_rate_limited(now, min_change_seconds))
    }

    pub fn mark_changed(&mut self, id: AreaId, at: Timestamp) {
        self.entries
            .entry(id)
            .or_insert_with(|| AreaRuntime::new(true))
            .last_change = Some(at);
    }

    /// Allow immediate re-control of every area.
    pub fn clear_rate_limits(&mut self) {
        for rt in self.entries.values_mut() {
            rt.last_change = None;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
