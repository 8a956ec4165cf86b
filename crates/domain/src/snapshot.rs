//! The configuration snapshot read and written by the controller, and the
//! zone resolution that runs over it.

use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::hvac::{ActiveZone, GlobalState};
use crate::id::{AreaId, ZoneId};
use crate::options::ControlOptions;
use crate::zone::{Zone, ensure_builtin_zones};

/// Preset label meaning "no boost zone".
pub const PRESET_NONE: &str = "none";
/// Preset label of the Suspend selection.
pub const PRESET_SUSPEND: &str = "Suspend";

/// Everything the controller persists.
///
/// Areas keep their configuration order, which is also the order of
/// processing within a control pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub areas: Vec<Area>,
    pub zones: Vec<Zone>,
    pub options: ControlOptions,
    pub state: GlobalState,
}

impl ConfigSnapshot {
    /// Run built-in zone maintenance. Returns `true` when zones changed.
    pub fn normalize(&mut self) -> bool {
        ensure_builtin_zones(&self.areas, &mut self.zones)
    }

    #[must_use]
    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|area| area.id == id)
    }

    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    #[must_use]
    pub fn resolver(&self) -> ZoneResolver<'_> {
        ZoneResolver { snapshot: self }
    }
}

/// Read-only view answering zone questions for one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ZoneResolver<'a> {
    snapshot: &'a ConfigSnapshot,
}

impl<'a> ZoneResolver<'a> {
    /// The selected zone, if it is a real zone that still exists.
    #[must_use]
    pub fn active_zone(&self) -> Option<&'a Zone> {
        self.snapshot
            .state
            .active_zone
            .zone_id()
            .and_then(|id| self.snapshot.zone(id))
    }

    #[must_use]
    pub fn in_active_zone(&self, area_id: AreaId) -> bool {
        self.active_zone().is_some_and(|zone| zone.contains(area_id))
    }

    /// House target plus the zone offset when the area is boosted.
    #[must_use]
    pub fn desired_room_for(&self, area_id: AreaId) -> f64 {
        let state = &self.snapshot.state;
        if self.in_active_zone(area_id) {
            state.house_target + state.active_zone_offset
        } else {
            state.house_target
        }
    }

    /// Zone labels sorted case-insensitively; the first zone wins a label clash.
    #[must_use]
    pub fn preset_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.label_map().into_iter().map(|(l, _)| l).collect();
        labels.sort_by_key(|label| label.to_lowercase());
        labels
    }

    #[must_use]
    pub fn active_preset_label(&self) -> Option<String> {
        match self.snapshot.state.active_zone {
            ActiveZone::Suspend => Some(PRESET_SUSPEND.to_string()),
            ActiveZone::None => None,
            ActiveZone::Zone(_) => self
                .active_zone()
                .map(|zone| zone.label(&self.snapshot.areas)),
        }
    }

    /// Translate a preset label into a zone selection.
    ///
    /// `"none"` and `"Suspend"` map to their reserved selections. Unknown
    /// labels yield `None`.
    #[must_use]
    pub fn selection_for_label(&self, label: &str) -> Option<ActiveZone> {
        match label {
            PRESET_NONE => Some(ActiveZone::None),
            PRESET_SUSPEND => Some(ActiveZone::Suspend),
            other => self
                .label_map()
                .into_iter()
                .find(|(l, _)| l == other)
                .map(|(_, id)| ActiveZone::Zone(id)),
        }
    }

    fn label_map(&self) -> Vec<(String, ZoneId)> {
        let mut out: Vec<(String, ZoneId)> = Vec::with_capacity(self.snapshot.zones.len());
        for zone in &self.snapshot.zones {
            let label = zone.label(&self.snapshot.areas);
            if !out.iter().any(|(l, _)| *l == label) {
                out.push((label, zone.id));
            }
        }
        out
    }
}
