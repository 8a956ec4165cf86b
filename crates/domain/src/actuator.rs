//! Actuators: the physical devices an area drives.
//!
//! Three kinds exist, modelled as a tagged union so the control loop
//! dispatches on the variant rather than inspecting device types at runtime:
//!
//! | Kind | Carries a setpoint | Has on/off | Has an operating mode |
//! |------|--------------------|------------|-----------------------|
//! | [`Thermostat`](Actuator::Thermostat) | yes | via mode | yes |
//! | [`NumericSetpoint`](Actuator::NumericSetpoint) | yes | no | no |
//! | [`Switch`](Actuator::Switch) | no | yes | no |

use serde::{Deserialize, Serialize};

use crate::hvac::HvacMode;

/// A reference to an external actuator, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Actuator {
    Thermostat(String),
    NumericSetpoint(String),
    Switch(String),
}

impl Actuator {
    /// External reference of the device (e.g. `climate.living_room`).
    #[must_use]
    pub fn entity(&self) -> &str {
        match self {
            Self::Thermostat(e) | Self::NumericSetpoint(e) | Self::Switch(e) => e,
        }
    }

    /// Short kind name, stable across releases (used for storage).
    #[must_use]
    pub fn kind(&self) -> ActuatorKind {
        match self {
            Self::Thermostat(_) => ActuatorKind::Thermostat,
            Self::NumericSetpoint(_) => ActuatorKind::NumericSetpoint,
            Self::Switch(_) => ActuatorKind::Switch,
        }
    }

    /// Build an actuator from its kind and entity reference.
    #[must_use]
    pub fn new(kind: ActuatorKind, entity: impl Into<String>) -> Self {
        let entity = entity.into();
        match kind {
            ActuatorKind::Thermostat => Self::Thermostat(entity),
            ActuatorKind::NumericSetpoint => Self::NumericSetpoint(entity),
            ActuatorKind::Switch => Self::Switch(entity),
        }
    }

    /// Whether the banded setpoint algorithm applies to this actuator.
    #[must_use]
    pub fn has_setpoint(&self) -> bool {
        !matches!(self, Self::Switch(_))
    }
}

/// Discriminant of [`Actuator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    Thermostat,
    NumericSetpoint,
    Switch,
}

impl ActuatorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thermostat => "thermostat",
            Self::NumericSetpoint => "numeric_setpoint",
            Self::Switch => "switch",
        }
    }
}

impl std::fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActuatorKind {
    type Err = UnknownActuatorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thermostat" => Ok(Self::Thermostat),
            "numeric_setpoint" => Ok(Self::NumericSetpoint),
            "switch" => Ok(Self::Switch),
            other => Err(UnknownActuatorKind(other.to_string())),
        }
    }
}

/// Returned when parsing an unrecognised actuator kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown actuator kind {0:?}")]
pub struct UnknownActuatorKind(pub String);

/// Operating mode reported by (or written to) a thermostat device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    Off,
    Heat,
    Cool,
    HeatCool,
    Auto,
    Dry,
    FanOnly,
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::HeatCool => "heat_cool",
            Self::Auto => "auto",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
        })
    }
}

/// Snapshot of an actuator's externally visible state.
///
/// Every field is optional: a missing value means the device did not report
/// it (or could not be reached), which the control loop treats as "no signal".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorRead {
    pub setpoint: Option<f64>,
    pub is_on: Option<bool>,
    pub mode: Option<DeviceMode>,
    pub supported_modes: Vec<DeviceMode>,
}

impl ActuatorRead {
    /// Whether the actuator reports that it is actively running.
    ///
    /// Switches count when they are on, thermostats when their mode is
    /// anything other than off. Unknown state never counts.
    #[must_use]
    pub fn reports_active(&self) -> bool {
        self.is_on == Some(true) || self.mode.is_some_and(|m| m != DeviceMode::Off)
    }
}

/// Pick the thermostat mode to force for the global `desired` mode.
///
/// `auto` is never chosen. The exact mode wins; a combined `heat_cool` is the
/// only fallback. Returns `None` when the device supports neither, or when
/// `desired` is [`HvacMode::Off`].
#[must_use]
pub fn select_supported_mode(supported: &[DeviceMode], desired: HvacMode) -> Option<DeviceMode> {
    let exact = match desired {
        HvacMode::Heat => DeviceMode::Heat,
        HvacMode::Cool => DeviceMode::Cool,
        HvacMode::Off => return None,
    };
    if supported.contains(&exact) {
        Some(exact)
    } else if supported.contains(&DeviceMode::HeatCool) {
        Some(DeviceMode::HeatCool)
    } else {
        None
    }
}
