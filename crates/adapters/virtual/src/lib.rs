//! # climahub-adapter-virtual
//!
//! Virtual/demo plant providing simulated actuators and temperature sensors
//! for testing and demonstration purposes.
//!
//! ## Provided devices
//!
//! | Device | Actuator kind | Behaviour |
//! |--------|---------------|-----------|
//! | [`VirtualThermostat`] | `thermostat` | Mode + setpoint; heats or cools toward the setpoint |
//! | [`VirtualNumber`] | `numeric_setpoint` | Setpoint only; heats while above the room |
//! | [`VirtualSwitch`] | `switch` | On/off heater |
//! | [`VirtualSensor`] | - | Room temperature, advanced by [`VirtualPlant::simulate`] |
//!
//! Every accepted command is appended to a log readable with
//! [`VirtualPlant::commands`].
//!
//! ## Dependency rule
//!
//! Depends on `climahub-app` (port traits) and `climahub-domain` only.

mod devices;
mod error;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use climahub_app::ports::{ActuatorDriver, SensorReader};
use climahub_domain::actuator::{Actuator, ActuatorKind, ActuatorRead, DeviceMode};
use climahub_domain::error::ClimaError;

pub use devices::{VirtualDevice, VirtualNumber, VirtualSensor, VirtualSwitch, VirtualThermostat};
pub use error::DeviceError;

/// One command accepted by the plant.
#[derive(Debug, Clone, PartialEq)]
pub enum PlantCommand {
    SetSetpoint { entity: String, value: f64 },
    SetMode { entity: String, mode: DeviceMode },
    TurnOn { entity: String },
    TurnOff { entity: String },
}

#[derive(Debug, Default)]
struct PlantState {
    devices: HashMap<String, VirtualDevice>,
    sensors: HashMap<String, VirtualSensor>,
    /// sensor -> actuator entity heating or cooling its room
    couplings: HashMap<String, String>,
    commands: Vec<PlantCommand>,
}

/// Simulated building implementing both [`ActuatorDriver`] and [`SensorReader`].
#[derive(Debug, Default)]
pub struct VirtualPlant {
    state: Mutex<PlantState>,
}

impl VirtualPlant {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device for `actuator` with default state.
    ///
    /// Thermostats support `off`, `heat`, `cool` and `heat_cool`.
    pub fn add_device(&self, actuator: &Actuator) {
        let device = match actuator.kind() {
            ActuatorKind::Thermostat => VirtualDevice::Thermostat(VirtualThermostat::default()),
            ActuatorKind::NumericSetpoint => VirtualDevice::Number(VirtualNumber::default()),
            ActuatorKind::Switch => VirtualDevice::Switch(VirtualSwitch::default()),
        };
        self.insert(actuator.entity(), device);
    }

    /// Register a thermostat with an explicit list of supported modes.
    pub fn add_thermostat(&self, entity: &str, supported_modes: &[DeviceMode]) -> Actuator {
        self.insert(
            entity,
            VirtualDevice::Thermostat(VirtualThermostat::with_modes(supported_modes)),
        );
        Actuator::Thermostat(entity.to_string())
    }

    /// Register a sensor reading `temperature`, coupled to `actuator`'s output.
    pub fn add_sensor(&self, sensor: &str, temperature: f64, actuator: Option<&Actuator>) {
        let mut state = self.lock();
        state
            .sensors
            .insert(sensor.to_string(), VirtualSensor::new(temperature));
        if let Some(actuator) = actuator {
            state
                .couplings
                .insert(sensor.to_string(), actuator.entity().to_string());
        }
    }

    /// Overwrite a sensor reading; `None` makes the sensor unavailable.
    pub fn set_temperature(&self, sensor: &str, temperature: Option<f64>) {
        self.lock()
            .sensors
            .entry(sensor.to_string())
            .or_default()
            .temperature = temperature;
    }

    /// Flip a switch from outside the controller (e.g. a wall button).
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] when `entity` is not a known switch.
    pub fn set_switch(&self, entity: &str, on: bool) -> Result<(), DeviceError> {
        match self.lock().devices.get_mut(entity) {
            Some(VirtualDevice::Switch(switch)) => {
                switch.on = on;
                Ok(())
            }
            Some(_) => Err(DeviceError::mismatch(entity, ActuatorKind::Switch)),
            None => Err(DeviceError::UnknownEntity(entity.to_string())),
        }
    }

    /// Current state of a device, if registered.
    #[must_use]
    pub fn device(&self, entity: &str) -> Option<VirtualDevice> {
        self.lock().devices.get(entity).cloned()
    }

    /// Every command accepted so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<PlantCommand> {
        self.lock().commands.clone()
    }

    /// Drain the command log.
    pub fn take_commands(&self) -> Vec<PlantCommand> {
        std::mem::take(&mut self.lock().commands)
    }

    /// Advance every room by `minutes`, losing heat to `ambient`.
    pub fn simulate(&self, ambient: f64, minutes: f64) {
        let mut state = self.lock();
        let PlantState {
            devices,
            sensors,
            couplings,
            ..
        } = &mut *state;
        for (name, sensor) in sensors.iter_mut() {
            let Some(room) = sensor.temperature else {
                continue;
            };
            let output = couplings
                .get(name)
                .and_then(|entity| devices.get(entity))
                .map_or(0.0, |device| device.output(room));
            sensor.advance(output, ambient, minutes);
        }
    }

    fn insert(&self, entity: &str, device: VirtualDevice) {
        tracing::debug!(entity, kind = device.kind().as_str(), "virtual device registered");
        self.lock().devices.insert(entity.to_string(), device);
    }

    fn lock(&self) -> MutexGuard<'_, PlantState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_device(&self, actuator: &Actuator) -> Result<ActuatorRead, DeviceError> {
        let state = self.lock();
        let device = lookup(&state, actuator)?;
        Ok(device.read())
    }

    fn apply(
        &self,
        actuator: &Actuator,
        command: PlantCommand,
        change: impl FnOnce(&mut VirtualDevice) -> Result<(), DeviceError>,
    ) -> Result<(), DeviceError> {
        let mut state = self.lock();
        lookup(&state, actuator)?;
        if let Some(device) = state.devices.get_mut(actuator.entity()) {
            change(device)?;
        }
        state.commands.push(command);
        Ok(())
    }
}

fn lookup<'a>(state: &'a PlantState, actuator: &Actuator) -> Result<&'a VirtualDevice, DeviceError> {
    let entity = actuator.entity();
    let device = state
        .devices
        .get(entity)
        .ok_or_else(|| DeviceError::UnknownEntity(entity.to_string()))?;
    if device.kind() != actuator.kind() {
        return Err(DeviceError::mismatch(entity, actuator.kind()));
    }
    Ok(device)
}

impl ActuatorDriver for VirtualPlant {
    fn read(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<ActuatorRead, ClimaError>> + Send {
        let result = self.read_device(actuator).map_err(ClimaError::from);
        async move { result }
    }

    fn set_setpoint(
        &self,
        actuator: &Actuator,
        value: f64,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let entity = actuator.entity().to_string();
        let command = PlantCommand::SetSetpoint {
            entity: entity.clone(),
            value,
        };
        let result = self
            .apply(actuator, command, |device| match device {
                VirtualDevice::Thermostat(t) => {
                    t.setpoint = value;
                    Ok(())
                }
                VirtualDevice::Number(n) => {
                    n.value = Some(value);
                    Ok(())
                }
                VirtualDevice::Switch(_) => {
                    Err(DeviceError::mismatch(&entity, ActuatorKind::NumericSetpoint))
                }
            })
            .map_err(ClimaError::from);
        async move { result }
    }

    fn set_mode(
        &self,
        actuator: &Actuator,
        mode: DeviceMode,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let entity = actuator.entity().to_string();
        let command = PlantCommand::SetMode {
            entity: entity.clone(),
            mode,
        };
        let result = self
            .apply(actuator, command, |device| match device {
                VirtualDevice::Thermostat(t) if t.supported_modes.contains(&mode) => {
                    t.mode = mode;
                    Ok(())
                }
                VirtualDevice::Thermostat(_) => Err(DeviceError::UnsupportedMode { entity, mode }),
                VirtualDevice::Number(_) | VirtualDevice::Switch(_) => {
                    Err(DeviceError::mismatch(&entity, ActuatorKind::Thermostat))
                }
            })
            .map_err(ClimaError::from);
        async move { result }
    }

    fn turn_on(&self, actuator: &Actuator) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let result = self.switch(actuator, true).map_err(ClimaError::from);
        async move { result }
    }

    fn turn_off(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let result = self.switch(actuator, false).map_err(ClimaError::from);
        async move { result }
    }
}

impl VirtualPlant {
    fn switch(&self, actuator: &Actuator, on: bool) -> Result<(), DeviceError> {
        let entity = actuator.entity().to_string();
        let command = if on {
            PlantCommand::TurnOn {
                entity: entity.clone(),
            }
        } else {
            PlantCommand::TurnOff {
                entity: entity.clone(),
            }
        };
        self.apply(actuator, command, |device| match device {
            VirtualDevice::Switch(s) => {
                s.on = on;
                Ok(())
            }
            VirtualDevice::Thermostat(_) | VirtualDevice::Number(_) => {
                Err(DeviceError::mismatch(&entity, ActuatorKind::Switch))
            }
        })
    }
}

impl SensorReader for VirtualPlant {
    fn read(&self, sensor: &str) -> impl Future<Output = Result<Option<f64>, ClimaError>> + Send {
        let result = self
            .lock()
            .sensors
            .get(sensor)
            .map(|s| s.temperature)
            .ok_or_else(|| DeviceError::UnknownEntity(sensor.to_string()))
            .map_err(ClimaError::from);
        async move { result }
    }
}
