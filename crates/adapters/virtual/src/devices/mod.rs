//! Virtual device implementations: thermostat, numeric setpoint, switch, sensor.
//!
//! Actuators report their state as an [`ActuatorRead`] and contribute a heat
//! output to the room they are coupled with.

mod number;
mod sensor;
mod switch;
mod thermostat;

pub use number::VirtualNumber;
pub use sensor::VirtualSensor;
pub use switch::VirtualSwitch;
pub use thermostat::VirtualThermostat;

use climahub_domain::actuator::{ActuatorKind, ActuatorRead};

/// Degrees per minute a running device moves its room.
pub const OUTPUT_RATE: f64 = 0.05;

/// Wrapper enum for the concrete virtual actuator types.
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualDevice {
    Thermostat(VirtualThermostat),
    Number(VirtualNumber),
    Switch(VirtualSwitch),
}

impl VirtualDevice {
    #[must_use]
    pub fn kind(&self) -> ActuatorKind {
        match self {
            Self::Thermostat(_) => ActuatorKind::Thermostat,
            Self::Number(_) => ActuatorKind::NumericSetpoint,
            Self::Switch(_) => ActuatorKind::Switch,
        }
    }

    #[must_use]
    pub fn read(&self) -> ActuatorRead {
        match self {
            Self::Thermostat(d) => d.read(),
            Self::Number(d) => d.read(),
            Self::Switch(d) => d.read(),
        }
    }

    /// Signed temperature change per minute this device applies to a room at `room`.
    #[must_use]
    pub fn output(&self, room: f64) -> f64 {
        match self {
            Self::Thermostat(d) => d.output(room),
            Self::Number(d) => d.output(room),
            Self::Switch(d) => d.output(),
        }
    }
}
