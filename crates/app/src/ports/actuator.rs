//! Actuator port: uniform read/write contract over every actuator kind.
//!
//! Writes are fire-and-forget: an `Ok` means the command was accepted, not
//! that the device reached the requested state. Later reads reflect the
//! eventual external state.

use std::future::Future;

use climahub_domain::actuator::{Actuator, ActuatorRead, DeviceMode};
use climahub_domain::error::ClimaError;

/// Drives the physical devices referenced by areas.
pub trait ActuatorDriver {
    /// Read the externally visible state of `actuator`.
    ///
    /// Fields the device does not report stay `None`.
    fn read(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<ActuatorRead, ClimaError>> + Send;

    /// Write a new setpoint (thermostat target or numeric value).
    fn set_setpoint(
        &self,
        actuator: &Actuator,
        value: f64,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send;

    /// Change a thermostat's operating mode.
    fn set_mode(
        &self,
        actuator: &Actuator,
        mode: DeviceMode,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send;

    fn turn_on(&self, actuator: &Actuator) -> impl Future<Output = Result<(), ClimaError>> + Send;

    fn turn_off(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send;
}

impl<T: ActuatorDriver + Send + Sync> ActuatorDriver for std::sync::Arc<T> {
    fn read(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<ActuatorRead, ClimaError>> + Send {
        (**self).read(actuator)
    }

    fn set_setpoint(
        &self,
        actuator: &Actuator,
        value: f64,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        (**self).set_setpoint(actuator, value)
    }

    fn set_mode(
        &self,
        actuator: &Actuator,
        mode: DeviceMode,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        (**self).set_mode(actuator, mode)
    }

    fn turn_on(&self, actuator: &Actuator) -> impl Future<Output = Result<(), ClimaError>> + Send {
        (**self).turn_on(actuator)
    }

    fn turn_off(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        (**self).turn_off(actuator)
    }
}
