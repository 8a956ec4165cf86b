//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use climahub_domain::actuator::{Actuator, ActuatorRead, DeviceMode};
use climahub_domain::error::ClimaError;
use climahub_domain::event::{Event, EventPayload};
use climahub_domain::snapshot::ConfigSnapshot;

use crate::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetSetpoint(String, f64),
    SetMode(String, DeviceMode),
    TurnOn(String),
    TurnOff(String),
}

#[derive(Debug)]
pub struct FakeDeviceError(pub String);

impl std::fmt::Display for FakeDeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "device {} unreachable", self.0)
    }
}

impl std::error::Error for FakeDeviceError {}

/// Actuators and sensors held in memory, with a log of every write.
#[derive(Default)]
pub struct FakePlant {
    devices: Mutex<HashMap<String, ActuatorRead>>,
    sensors: Mutex<HashMap<String, f64>>,
    failing: Mutex<HashSet<String>>,
    commands: Mutex<Vec<Command>>,
}

impl FakePlant {
    pub fn thermostat(&self, entity: &str, mode: DeviceMode, supported: &[DeviceMode]) -> Actuator {
        self.devices.lock().unwrap().insert(
            entity.to_string(),
            ActuatorRead {
                setpoint: Some(20.0),
                is_on: None,
                mode: Some(mode),
                supported_modes: supported.to_vec(),
            },
        );
        Actuator::Thermostat(entity.to_string())
    }

    pub fn switch(&self, entity: &str, on: bool) -> Actuator {
        self.devices.lock().unwrap().insert(
            entity.to_string(),
            ActuatorRead {
                is_on: Some(on),
                ..ActuatorRead::default()
            },
        );
        Actuator::Switch(entity.to_string())
    }

    pub fn number(&self, entity: &str, value: Option<f64>) -> Actuator {
        self.devices.lock().unwrap().insert(
            entity.to_string(),
            ActuatorRead {
                setpoint: value,
                ..ActuatorRead::default()
            },
        );
        Actuator::NumericSetpoint(entity.to_string())
    }

    pub fn set_temperature(&self, sensor: &str, value: f64) {
        self.sensors
            .lock()
            .unwrap()
            .insert(sensor.to_string(), value);
    }

    pub fn preset_setpoint(&self, entity: &str, value: Option<f64>) {
        if let Some(read) = self.devices.lock().unwrap().get_mut(entity) {
            read.setpoint = value;
        }
    }

    pub fn set_switch(&self, entity: &str, on: bool) {
        if let Some(read) = self.devices.lock().unwrap().get_mut(entity) {
            read.is_on = Some(on);
        }
    }

    pub fn fail(&self, entity: &str) {
        self.failing.lock().unwrap().insert(entity.to_string());
    }

    pub fn device(&self, entity: &str) -> ActuatorRead {
        self.devices
            .lock()
            .unwrap()
            .get(entity)
            .cloned()
            .unwrap_or_default()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.lock().unwrap().clear();
    }

    fn check(&self, entity: &str) -> Result<(), ClimaError> {
        if self.failing.lock().unwrap().contains(entity) {
            return Err(ClimaError::Device(Box::new(FakeDeviceError(
                entity.to_string(),
            ))));
        }
        Ok(())
    }

    fn record(&self, entity: &str, command: Command, apply: impl FnOnce(&mut ActuatorRead)) {
        if let Some(read) = self.devices.lock().unwrap().get_mut(entity) {
            apply(read);
        }
        self.commands.lock().unwrap().push(command);
    }
}

impl ActuatorDriver for FakePlant {
    fn read(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<ActuatorRead, ClimaError>> + Send {
        let result = self
            .check(actuator.entity())
            .map(|()| self.device(actuator.entity()));
        async { result }
    }

    fn set_setpoint(
        &self,
        actuator: &Actuator,
        value: f64,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let entity = actuator.entity();
        let result = self.check(entity).map(|()| {
            self.record(entity, Command::SetSetpoint(entity.to_string(), value), |r| {
                r.setpoint = Some(value);
            });
        });
        async { result }
    }

    fn set_mode(
        &self,
        actuator: &Actuator,
        mode: DeviceMode,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let entity = actuator.entity();
        let result = self.check(entity).map(|()| {
            self.record(entity, Command::SetMode(entity.to_string(), mode), |r| {
                r.mode = Some(mode);
            });
        });
        async { result }
    }

    fn turn_on(&self, actuator: &Actuator) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let entity = actuator.entity();
        let result = self.check(entity).map(|()| {
            self.record(entity, Command::TurnOn(entity.to_string()), |r| {
                r.is_on = Some(true);
            });
        });
        async { result }
    }

    fn turn_off(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        let entity = actuator.entity();
        let result = self.check(entity).map(|()| {
            self.record(entity, Command::TurnOff(entity.to_string()), |r| {
                r.is_on = Some(false);
            });
        });
        async { result }
    }
}

impl SensorReader for FakePlant {
    fn read(&self, sensor: &str) -> impl Future<Output = Result<Option<f64>, ClimaError>> + Send {
        let result = self
            .check(sensor)
            .map(|()| self.sensors.lock().unwrap().get(sensor).copied());
        async { result }
    }
}

/// Config store keeping the snapshot in memory.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<ConfigSnapshot>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn with(snapshot: ConfigSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            saves: Mutex::new(0),
        }
    }

    /// Overwrite the stored snapshot without counting a save.
    pub fn replace(&self, snapshot: ConfigSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    pub fn current(&self) -> ConfigSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> impl Future<Output = Result<ConfigSnapshot, ClimaError>> + Send {
        let snapshot = self.current();
        async { Ok(snapshot) }
    }

    fn save(
        &self,
        snapshot: &ConfigSnapshot,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        *self.snapshot.lock().unwrap() = snapshot.clone();
        *self.saves.lock().unwrap() += 1;
        async { Ok(()) }
    }
}

/// Publisher that records every payload.
#[derive(Default)]
pub struct SpyPublisher {
    events: Mutex<Vec<Event>>,
}

impl SpyPublisher {
    pub fn payloads(&self) -> Vec<EventPayload> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.payload.clone())
            .collect()
    }
}

impl EventPublisher for SpyPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), ClimaError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
