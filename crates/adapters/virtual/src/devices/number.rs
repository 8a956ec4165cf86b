//! Virtual numeric setpoint: a radiator valve style device without a mode.

use climahub_domain::actuator::ActuatorRead;

use super::OUTPUT_RATE;

/// A simulated setpoint-only device; it heats while its value exceeds the room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualNumber {
    /// `None` until first written.
    pub value: Option<f64>,
}

impl VirtualNumber {
    #[must_use]
    pub fn read(&self) -> ActuatorRead {
        ActuatorRead {
            setpoint: self.value,
            ..ActuatorRead::default()
        }
    }

    pub(crate) fn output(&self, room: f64) -> f64 {
        match self.value {
            Some(value) if value > room => OUTPUT_RATE,
            _ => 0.0,
        }
    }
}
