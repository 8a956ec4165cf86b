//! The control pass: aggregate temperature, watchdog, and per-area control.

use climahub_domain::actuator::Actuator;
use climahub_domain::area::Area;
use climahub_domain::error::ClimaError;
use climahub_domain::event::EventPayload;
use climahub_domain::hvac::HvacMode;
use climahub_domain::setpoint::{Reading, SetpointDecision, Tuning, nudge};
use climahub_domain::snapshot::{ConfigSnapshot, ZoneResolver};
use climahub_domain::time::now;

use super::Controller;
use crate::dispatch;
use crate::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

/// Result of a periodic pass request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Another pass held the token; this one was dropped.
    Skipped,
    Ran,
}

impl<S, A, R, P> Controller<S, A, R, P>
where
    S: ConfigStore + Send + Sync,
    A: ActuatorDriver + Send + Sync,
    R: SensorReader + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    /// Run one periodic control pass unless another pass is in flight.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot cannot be loaded. Device
    /// failures are isolated per area and only logged.
    pub async fn run_pass(&self) -> Result<PassOutcome, ClimaError> {
        let Ok(_token) = self.pass_token.try_lock() else {
            tracing::debug!("control pass already running, dropping tick");
            return Ok(PassOutcome::Skipped);
        };
        self.run_pass_locked().await?;
        Ok(PassOutcome::Ran)
    }

    /// Body of a control pass; the caller holds the pass token.
    pub(super) async fn run_pass_locked(&self) -> Result<(), ClimaError> {
        let snapshot = self.load_snapshot().await?;
        self.sync_runtime(&snapshot.areas);
        let mode = snapshot.state.hvac_mode;

        let measured = self.participating(&snapshot, mode);
        self.refresh_temperature(&measured).await;

        if mode == HvacMode::Off {
            return self.auto_suspend(&snapshot).await;
        }
        if snapshot.state.is_suspended() {
            return Ok(());
        }

        let tuning = Tuning::from(&snapshot.options);
        let resolver = snapshot.resolver();
        for area in self.participating(&snapshot, mode) {
            if let Err(err) = self
                .control_area(area, mode, &resolver, &tuning, &snapshot)
                .await
            {
                tracing::warn!(area = %area.name, entity = area.actuator.entity(), %err, "area control failed");
            }
        }
        Ok(())
    }

    async fn control_area(
        &self,
        area: &Area,
        mode: HvacMode,
        resolver: &ZoneResolver<'_>,
        tuning: &Tuning,
        snapshot: &ConfigSnapshot,
    ) -> Result<(), ClimaError> {
        if let Err(err) =
            dispatch::force_thermostat_mode(&self.actuators, &area.actuator, mode).await
        {
            tracing::warn!(area = %area.name, %err, "failed to force thermostat mode");
        }

        let Some(room) = self.read_sensor(area).await else {
            return Ok(());
        };

        let min_change = snapshot.options.min_change_seconds;
        if self.runtime().is_rate_limited(area.id, now(), min_change) {
            return Ok(());
        }

        let reading = Reading {
            room,
            desired: resolver.desired_room_for(area.id),
        };
        let changed = match &area.actuator {
            Actuator::Switch(_) => {
                dispatch::drive_switch(&self.actuators, &area.actuator, mode, reading, tuning.deadband)
                    .await?
            }
            Actuator::Thermostat(_) | Actuator::NumericSetpoint(_) => {
                let current = self.actuators.read(&area.actuator).await?.setpoint;
                match nudge(area, mode, reading, current, tuning) {
                    SetpointDecision::Write(value) => {
                        tracing::debug!(area = %area.name, ?current, value, room, "nudging setpoint");
                        self.actuators.set_setpoint(&area.actuator, value).await?;
                        true
                    }
                    SetpointDecision::Hold => false,
                }
            }
        };
        if changed {
            self.runtime().mark_changed(area.id, now());
        }
        Ok(())
    }

    /// Read an area's sensor; unavailable or failing sensors yield `None`.
    pub(super) async fn read_sensor(&self, area: &Area) -> Option<f64> {
        match self.sensors.read(&area.sensor).await {
            Ok(Some(value)) if value.is_finite() => Some(value),
            Ok(_) => {
                tracing::debug!(area = %area.name, sensor = %area.sensor, "sensor unavailable");
                None
            }
            Err(err) => {
                tracing::warn!(area = %area.name, sensor = %area.sensor, %err, "sensor read failed");
                None
            }
        }
    }

    /// Recompute the aggregate temperature over `areas` and publish it.
    pub(super) async fn refresh_temperature(&self, areas: &[&Area]) {
        let mut readings = Vec::with_capacity(areas.len());
        for area in areas {
            if let Some(value) = self.read_sensor(area).await {
                readings.push(value);
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = (!readings.is_empty())
            .then(|| readings.iter().sum::<f64>() / readings.len() as f64);

        *self.temperature_slot() = mean;
        self.publish(EventPayload::TemperatureChanged { temperature: mean })
            .await;
    }

    /// Enter Suspend when any included device runs while the mode is Off.
    async fn auto_suspend(&self, snapshot: &ConfigSnapshot) -> Result<(), ClimaError> {
        if snapshot.state.is_suspended() {
            return Ok(());
        }
        for area in self.participating(snapshot, HvacMode::Off) {
            if dispatch::reports_active(&self.actuators, &area.actuator).await {
                tracing::info!(
                    area = %area.name,
                    entity = area.actuator.entity(),
                    "device running while off, suspending control"
                );
                return self.enter_suspend().await;
            }
        }
        Ok(())
    }
}
