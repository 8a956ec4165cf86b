//! Immediate-apply and turn-off-all: passes that wait for the pass token.

use climahub_domain::area::Area;
use climahub_domain::error::ClimaError;
use climahub_domain::hvac::HvacMode;
use climahub_domain::setpoint::{Reading, center_setpoint};
use climahub_domain::snapshot::ZoneResolver;
use climahub_domain::time::now;

use super::Controller;
use crate::dispatch;
use crate::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

impl<S, A, R, P> Controller<S, A, R, P>
where
    S: ConfigStore + Send + Sync,
    A: ActuatorDriver + Send + Sync,
    R: SensorReader + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    /// Snap every participating area to its center setpoint, then run a
    /// normal pass.
    ///
    /// Setpoint writes ignore the rate limit and start it. Switches only get
    /// hysteresis. Nothing happens while Off or suspended.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot cannot be loaded.
    #[tracing::instrument(skip(self))]
    pub async fn apply_immediate(&self) -> Result<(), ClimaError> {
        let _token = self.pass_token.lock().await;
        let snapshot = self.load_snapshot().await?;
        self.sync_runtime(&snapshot.areas);
        let mode = snapshot.state.hvac_mode;
        if mode == HvacMode::Off || snapshot.state.is_suspended() {
            return Ok(());
        }

        let resolver = snapshot.resolver();
        let deadband = snapshot.options.deadband;
        for area in self.participating(&snapshot, mode) {
            if let Err(err) = self.snap_area(area, mode, &resolver, deadband).await {
                tracing::warn!(area = %area.name, entity = area.actuator.entity(), %err, "immediate apply failed");
            }
        }
        self.run_pass_locked().await
    }

    async fn snap_area(
        &self,
        area: &Area,
        mode: HvacMode,
        resolver: &ZoneResolver<'_>,
        deadband: f64,
    ) -> Result<(), ClimaError> {
        let Some(room) = self.read_sensor(area).await else {
            return Ok(());
        };
        let desired = resolver.desired_room_for(area.id);
        if !area.actuator.has_setpoint() {
            dispatch::drive_switch(
                &self.actuators,
                &area.actuator,
                mode,
                Reading { room, desired },
                deadband,
            )
            .await?;
            return Ok(());
        }

        if let Err(err) =
            dispatch::force_thermostat_mode(&self.actuators, &area.actuator, mode).await
        {
            tracing::warn!(area = %area.name, %err, "failed to force thermostat mode");
        }
        let center = center_setpoint(area, desired);
        tracing::debug!(area = %area.name, center, "writing center setpoint");
        self.actuators.set_setpoint(&area.actuator, center).await?;
        self.runtime().mark_changed(area.id, now());
        Ok(())
    }

    /// Turn every included actuator off and refresh the aggregate.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot cannot be loaded.
    pub(super) async fn turn_off_all(&self) -> Result<(), ClimaError> {
        let _token = self.pass_token.lock().await;
        let snapshot = self.load_snapshot().await?;
        self.sync_runtime(&snapshot.areas);

        let included = self.participating(&snapshot, HvacMode::Off);
        for area in &included {
            if let Err(err) = dispatch::turn_off(&self.actuators, &area.actuator).await {
                tracing::warn!(area = %area.name, entity = area.actuator.entity(), %err, "failed to turn actuator off");
            }
        }
        self.refresh_temperature(&included).await;
        Ok(())
    }
}
