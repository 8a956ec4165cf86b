//! Virtual switch: a plain on/off heater.

use climahub_domain::actuator::ActuatorRead;

use super::OUTPUT_RATE;

/// A simulated switch that heats its room while on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualSwitch {
    pub on: bool,
}

impl VirtualSwitch {
    #[must_use]
    pub fn read(&self) -> ActuatorRead {
        ActuatorRead {
            is_on: Some(self.on),
            ..ActuatorRead::default()
        }
    }

    pub(crate) fn output(&self) -> f64 {
        if self.on { OUTPUT_RATE } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_off() {
        let switch = VirtualSwitch::default();
        assert_eq!(switch.read().is_on, Some(false));
        assert!(switch.output().abs() < f64::EPSILON);
    }

    #[test]
    fn should_heat_when_on() {
        let switch = VirtualSwitch { on: true };
        assert!(switch.read().reports_active());
        assert!(switch.output() > 0.0);
    }
}
