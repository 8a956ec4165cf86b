//! Zone: a group of areas that receive the boost offset when active.
//!
//! Every area owns exactly one **built-in** zone (created and removed with
//! the area). Operators may add **custom** zones spanning several areas.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::error::{ClimaError, ValidationError};
use crate::id::{AreaId, ZoneId};

/// Prefix of every zone preset label.
pub const WARM_ZONE_PREFIX: &str = "Warm Zone: ";

/// How a zone came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneKind {
    BuiltIn { tied_area_id: AreaId },
    Custom,
}

/// A named group of areas eligible for the warm boost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub area_ids: Vec<AreaId>,
    pub kind: ZoneKind,
}

impl Zone {
    /// The built-in zone tied to `area_id`.
    #[must_use]
    pub fn builtin(area_id: AreaId) -> Self {
        Self {
            id: ZoneId::new(),
            area_ids: vec![area_id],
            kind: ZoneKind::BuiltIn {
                tied_area_id: area_id,
            },
        }
    }

    /// A custom zone over `area_ids`, stored deduplicated in id order.
    ///
    /// No membership rules are checked here; see [`validate_custom_members`].
    #[must_use]
    pub fn custom(area_ids: impl IntoIterator<Item = AreaId>) -> Self {
        let key: BTreeSet<AreaId> = area_ids.into_iter().collect();
        Self {
            id: ZoneId::new(),
            area_ids: key.into_iter().collect(),
            kind: ZoneKind::Custom,
        }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, ZoneKind::BuiltIn { .. })
    }

    #[must_use]
    pub fn tied_area_id(&self) -> Option<AreaId> {
        match self.kind {
            ZoneKind::BuiltIn { tied_area_id } => Some(tied_area_id),
            ZoneKind::Custom => None,
        }
    }

    /// Direct membership test against the stored ids.
    #[must_use]
    pub fn contains(&self, area_id: AreaId) -> bool {
        self.area_ids.contains(&area_id)
    }

    /// Order-independent identity of the member set.
    #[must_use]
    pub fn key(&self) -> BTreeSet<AreaId> {
        self.area_ids.iter().copied().collect()
    }

    /// Presentation label: prefix plus member names sorted case-insensitively.
    ///
    /// Members missing from `areas` are shown by id.
    #[must_use]
    pub fn label(&self, areas: &[Area]) -> String {
        let mut names: Vec<String> = self
            .area_ids
            .iter()
            .map(|id| {
                areas
                    .iter()
                    .find(|area| area.id == *id)
                    .map_or_else(|| id.to_string(), |area| area.name.clone())
            })
            .collect();
        names.sort_by_key(|name| name.to_lowercase());
        if names.is_empty() {
            format!("{WARM_ZONE_PREFIX}?")
        } else {
            format!("{WARM_ZONE_PREFIX}{}", names.join("+"))
        }
    }
}

/// Keep exactly one built-in zone per area.
///
/// Removes built-in zones whose tied area no longer exists, then appends a
/// built-in zone (in area-id order) for every area lacking one. Idempotent.
/// Returns `true` when `zones` changed.
pub fn ensure_builtin_zones(areas: &[Area], zones: &mut Vec<Zone>) -> bool {
    let before = zones.len();
    zones.retain(|zone| {
        zone.tied_area_id()
            .is_none_or(|tied| areas.iter().any(|area| area.id == tied))
    });
    let mut changed = zones.len() != before;

    let tied: BTreeSet<AreaId> = zones.iter().filter_map(Zone::tied_area_id).collect();
    let missing: BTreeSet<AreaId> = areas
        .iter()
        .map(|area| area.id)
        .filter(|id| !tied.contains(id))
        .collect();
    for area_id in missing {
        zones.push(Zone::builtin(area_id));
        changed = true;
    }
    changed
}

/// Validate the members of a new or edited custom zone.
///
/// Rules: every id names a configured area, at least three areas are
/// configured, the zone has at least two distinct members but not all of
/// them, and no other zone (built-in zones included) has the same member set.
/// `editing` excludes the zone being edited from the uniqueness check.
///
/// Returns the deduplicated members in id order.
///
/// # Errors
///
/// Returns [`ClimaError::Validation`] naming the first broken rule.
pub fn validate_custom_members(
    areas: &[Area],
    zones: &[Zone],
    members: &[AreaId],
    editing: Option<ZoneId>,
) -> Result<Vec<AreaId>, ClimaError> {
    let key: BTreeSet<AreaId> = members.iter().copied().collect();
    if let Some(unknown) = key.iter().find(|id| !areas.iter().any(|a| a.id == **id)) {
        return Err(ValidationError::UnknownArea(unknown.to_string()).into());
    }
    if areas.len() < 3 {
        return Err(ValidationError::NotEnoughAreas.into());
    }
    if key.len() < 2 {
        return Err(ValidationError::ZoneTooSmall.into());
    }
    if key.len() >= areas.len() {
        return Err(ValidationError::ZoneContainsAllAreas.into());
    }
    let duplicate = zones
        .iter()
        .filter(|zone| Some(zone.id) != editing)
        .any(|zone| zone.key() == key);
    if duplicate {
        return Err(ValidationError::DuplicateZone.into());
    }
    Ok(key.into_iter().collect())
}
