//! Virtual thermostat: operating mode plus a setpoint.

use climahub_domain::actuator::{ActuatorRead, DeviceMode};

use super::OUTPUT_RATE;

/// A simulated thermostat that heats or cools toward its setpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualThermostat {
    pub mode: DeviceMode,
    pub setpoint: f64,
    pub supported_modes: Vec<DeviceMode>,
}

impl Default for VirtualThermostat {
    fn default() -> Self {
        Self {
            mode: DeviceMode::Off,
            setpoint: 20.0,
            supported_modes: vec![
                DeviceMode::Off,
                DeviceMode::Heat,
                DeviceMode::Cool,
                DeviceMode::HeatCool,
            ],
        }
    }
}

impl VirtualThermostat {
    #[must_use]
    pub fn with_modes(supported_modes: &[DeviceMode]) -> Self {
        Self {
            supported_modes: supported_modes.to_vec(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn read(&self) -> ActuatorRead {
        ActuatorRead {
            setpoint: Some(self.setpoint),
            is_on: None,
            mode: Some(self.mode),
            supported_modes: self.supported_modes.clone(),
        }
    }

    pub(crate) fn output(&self, room: f64) -> f64 {
        let heats = matches!(self.mode, DeviceMode::Heat | DeviceMode::HeatCool | DeviceMode::Auto);
        let cools = matches!(self.mode, DeviceMode::Cool | DeviceMode::HeatCool | DeviceMode::Auto);
        if heats && self.setpoint > room {
            OUTPUT_RATE
        } else if cools && self.setpoint < room {
            -OUTPUT_RATE
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_off_with_common_modes() {
        let thermostat = VirtualThermostat::default();
        let read = thermostat.read();
        assert_eq!(read.mode, Some(DeviceMode::Off));
        assert!(read.supported_modes.contains(&DeviceMode::HeatCool));
        assert!(!read.supported_modes.contains(&DeviceMode::Auto));
    }

    #[test]
    fn should_heat_only_below_setpoint() {
        let thermostat = VirtualThermostat {
            mode: DeviceMode::Heat,
            setpoint: 21.0,
            ..VirtualThermostat::default()
        };
        assert!(thermostat.output(19.0) > 0.0);
        assert!(thermostat.output(22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_cool_above_setpoint_in_cool_mode() {
        let thermostat = VirtualThermostat {
            mode: DeviceMode::Cool,
            setpoint: 21.0,
            ..VirtualThermostat::default()
        };
        assert!(thermostat.output(25.0) < 0.0);
        assert!(thermostat.output(19.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_do_nothing_when_off() {
        let thermostat = VirtualThermostat::default();
        assert!(thermostat.output(5.0).abs() < f64::EPSILON);
    }
}
