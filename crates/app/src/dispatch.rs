//! Actuator dispatch: kind-specific commands issued through an [`ActuatorDriver`].

use climahub_domain::actuator::{Actuator, DeviceMode, select_supported_mode};
use climahub_domain::error::ClimaError;
use climahub_domain::hvac::HvacMode;
use climahub_domain::hysteresis::{SwitchCommand, switch_action};
use climahub_domain::setpoint::Reading;

use crate::ports::ActuatorDriver;

/// Force a thermostat into the mode matching the global `mode`.
///
/// Returns the mode written, or `None` when nothing was written (not a
/// thermostat, already in that mode, or no suitable mode supported).
///
/// # Errors
///
/// Propagates driver failures.
pub async fn force_thermostat_mode<A: ActuatorDriver>(
    driver: &A,
    actuator: &Actuator,
    mode: HvacMode,
) -> Result<Option<DeviceMode>, ClimaError> {
    if !matches!(actuator, Actuator::Thermostat(_)) {
        return Ok(None);
    }
    let read = driver.read(actuator).await?;
    let Some(target) = select_supported_mode(&read.supported_modes, mode) else {
        tracing::debug!(
            entity = actuator.entity(),
            %mode,
            "thermostat supports neither the requested mode nor heat_cool"
        );
        return Ok(None);
    };
    if read.mode == Some(target) {
        return Ok(None);
    }
    driver.set_mode(actuator, target).await?;
    Ok(Some(target))
}

/// Command an actuator to its off state.
///
/// Thermostats are switched to `off` when they support it, switches are
/// turned off, numeric setpoints have no off state and are left alone.
///
/// # Errors
///
/// Propagates driver failures.
pub async fn turn_off<A: ActuatorDriver>(driver: &A, actuator: &Actuator) -> Result<(), ClimaError> {
    match actuator {
        Actuator::Thermostat(_) => {
            let read = driver.read(actuator).await?;
            if read.supported_modes.contains(&DeviceMode::Off) {
                driver.set_mode(actuator, DeviceMode::Off).await?;
            }
            Ok(())
        }
        Actuator::Switch(_) => driver.turn_off(actuator).await,
        Actuator::NumericSetpoint(_) => Ok(()),
    }
}

/// Apply switch hysteresis. Returns `true` when a command was issued.
///
/// A switch whose on/off state is unknown is left alone.
///
/// # Errors
///
/// Propagates driver failures.
pub async fn drive_switch<A: ActuatorDriver>(
    driver: &A,
    actuator: &Actuator,
    mode: HvacMode,
    reading: Reading,
    deadband: f64,
) -> Result<bool, ClimaError> {
    let read = driver.read(actuator).await?;
    let Some(is_on) = read.is_on else {
        return Ok(false);
    };
    match switch_action(mode, reading, deadband, is_on) {
        Some(SwitchCommand::TurnOn) => driver.turn_on(actuator).await.map(|()| true),
        Some(SwitchCommand::TurnOff) => driver.turn_off(actuator).await.map(|()| true),
        None => Ok(false),
    }
}

/// Whether the actuator reports running on its own.
///
/// Used by the auto-suspend watchdog; read failures count as "not running".
pub async fn reports_active<A: ActuatorDriver>(driver: &A, actuator: &Actuator) -> bool {
    if matches!(actuator, Actuator::NumericSetpoint(_)) {
        return false;
    }
    match driver.read(actuator).await {
        Ok(read) => read.reports_active(),
        Err(err) => {
            tracing::debug!(entity = actuator.entity(), %err, "actuator unreadable, treated as off");
            false
        }
    }
}
