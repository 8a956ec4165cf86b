//! Global operating mode, zone selection and the Suspend sub-state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::ZoneId;

/// Reserved storage key of the [`ActiveZone::Suspend`] selection.
///
/// Never a valid [`ZoneId`], so it cannot collide with a real zone.
pub const SUSPEND_KEY: &str = "__suspend__";

pub const DEFAULT_HOUSE_TARGET: f64 = 18.0;
pub const DEFAULT_ZONE_OFFSET: f64 = 2.0;

/// Global mode of the virtual thermostat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    #[default]
    Off,
    Heat,
    Cool,
}

impl HvacMode {
    /// `true` for heat and cool.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Off)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised HVAC mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hvac mode {0:?}")]
pub struct UnknownHvacMode(pub String);

impl FromStr for HvacMode {
    type Err = UnknownHvacMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            other => Err(UnknownHvacMode(other.to_string())),
        }
    }
}

/// The operator's boost-zone selection.
///
/// Stored as a nullable key: `None` for no zone, the zone id, or
/// [`SUSPEND_KEY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Option<String>", try_from = "Option<String>")]
pub enum ActiveZone {
    #[default]
    None,
    Zone(ZoneId),
    Suspend,
}

impl ActiveZone {
    #[must_use]
    pub fn to_key(self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Zone(id) => Some(id.to_string()),
            Self::Suspend => Some(SUSPEND_KEY.to_string()),
        }
    }

    /// Parse a stored key back into a selection.
    ///
    /// # Errors
    ///
    /// Returns the UUID parse error when the key is neither empty,
    /// [`SUSPEND_KEY`], nor a zone id.
    pub fn from_key(key: Option<&str>) -> Result<Self, uuid::Error> {
        match key {
            None | Some("") => Ok(Self::None),
            Some(SUSPEND_KEY) => Ok(Self::Suspend),
            Some(other) => other.parse().map(Self::Zone),
        }
    }

    /// The real zone id, if one is selected.
    #[must_use]
    pub fn zone_id(self) -> Option<ZoneId> {
        match self {
            Self::Zone(id) => Some(id),
            Self::None | Self::Suspend => None,
        }
    }
}

impl From<ActiveZone> for Option<String> {
    fn from(value: ActiveZone) -> Self {
        value.to_key()
    }
}

impl TryFrom<Option<String>> for ActiveZone {
    type Error = uuid::Error;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        Self::from_key(value.as_deref())
    }
}

/// Operator-facing state of the controller, persisted in the config store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    pub hvac_mode: HvacMode,
    pub house_target: f64,
    pub active_zone: ActiveZone,
    pub active_zone_offset: f64,
    /// Zone restored when leaving Suspend through a Heat/Cool selection.
    pub last_non_suspend_zone: Option<ZoneId>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            hvac_mode: HvacMode::Off,
            house_target: DEFAULT_HOUSE_TARGET,
            active_zone: ActiveZone::None,
            active_zone_offset: DEFAULT_ZONE_OFFSET,
            last_non_suspend_zone: None,
        }
    }
}

impl GlobalState {
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.active_zone == ActiveZone::Suspend
    }

    /// Apply a new mode, leaving Suspend when heat or cool is selected.
    ///
    /// Returns the previous mode.
    pub fn switch_mode(&mut self, mode: HvacMode) -> HvacMode {
        let previous = self.hvac_mode;
        self.hvac_mode = mode;
        if mode.is_active() && self.is_suspended() {
            self.active_zone = self
                .last_non_suspend_zone
                .map_or(ActiveZone::None, ActiveZone::Zone);
        }
        previous
    }

    /// Apply a new zone selection, maintaining the last non-suspend pointer.
    ///
    /// `None` clears the pointer and a real zone sets it. Entering Suspend
    /// from a real zone freezes that zone into the pointer.
    pub fn select_zone(&mut self, zone: ActiveZone) {
        let previous = self.active_zone;
        self.active_zone = zone;
        match zone {
            ActiveZone::None => self.last_non_suspend_zone = None,
            ActiveZone::Zone(id) => self.last_non_suspend_zone = Some(id),
            ActiveZone::Suspend => {
                if let ActiveZone::Zone(id) = previous {
                    self.last_non_suspend_zone = Some(id);
                }
            }
        }
    }
}
