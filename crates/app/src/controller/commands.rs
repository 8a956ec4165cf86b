//! Operator commands: mode, target, zone selection, zone offset, inclusion.

use climahub_domain::error::{ClimaError, NotFoundError, ValidationError};
use climahub_domain::event::EventPayload;
use climahub_domain::hvac::{ActiveZone, HvacMode};
use climahub_domain::id::AreaId;

use super::Controller;
use crate::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

impl<S, A, R, P> Controller<S, A, R, P>
where
    S: ConfigStore + Send + Sync,
    A: ActuatorDriver + Send + Sync,
    R: SensorReader + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    /// Change the global mode.
    ///
    /// Heat or Cool while suspended leaves Suspend and restores the last
    /// non-suspend zone. Off turns every included actuator off. A real mode
    /// change clears all rate limits; Heat and Cool then run immediate-apply.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the state cannot be persisted.
    #[tracing::instrument(skip(self))]
    pub async fn set_hvac_mode(&self, mode: HvacMode) -> Result<(), ClimaError> {
        let ((previous, zone_before), snapshot) = self
            .mutate(|s| {
                let zone_before = s.state.active_zone;
                Ok((s.state.switch_mode(mode), zone_before))
            })
            .await?;
        self.publish(EventPayload::ModeChanged { mode }).await;
        if snapshot.state.active_zone != zone_before {
            self.publish(EventPayload::ActiveZoneChanged {
                zone: snapshot.state.active_zone,
            })
            .await;
        }

        if mode == HvacMode::Off {
            return self.turn_off_all().await;
        }
        if previous != mode {
            tracing::debug!(%previous, "mode changed, clearing rate limits");
            self.runtime().clear_rate_limits();
        }
        self.apply_immediate().await
    }

    /// Select the boost zone, no zone, or Suspend.
    ///
    /// Suspend only records the selection. Any other selection runs
    /// immediate-apply.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::NotFound`] for an unknown zone id, or a storage
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn set_active_zone(&self, zone: ActiveZone) -> Result<(), ClimaError> {
        if zone == ActiveZone::Suspend {
            return self.enter_suspend().await;
        }
        self.mutate(|s| {
            if let ActiveZone::Zone(id) = zone
                && s.zone(id).is_none()
            {
                return Err(NotFoundError {
                    entity: "Zone",
                    id: id.to_string(),
                }
                .into());
            }
            s.state.select_zone(zone);
            Ok(())
        })
        .await?;
        self.publish(EventPayload::ActiveZoneChanged { zone }).await;
        self.apply_immediate().await
    }

    /// Select a zone by its preset label (`"none"`, `"Suspend"`, or a zone label).
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::NotFound`] when no zone carries `label`.
    pub async fn set_active_zone_by_label(&self, label: &str) -> Result<(), ClimaError> {
        let snapshot = self.load_snapshot().await?;
        let selection = snapshot
            .resolver()
            .selection_for_label(label)
            .ok_or_else(|| NotFoundError {
                entity: "Preset",
                id: label.to_string(),
            })?;
        self.set_active_zone(selection).await
    }

    /// Pause actuator control, remembering the current zone.
    pub(super) async fn enter_suspend(&self) -> Result<(), ClimaError> {
        self.mutate(|s| {
            s.state.select_zone(ActiveZone::Suspend);
            Ok(())
        })
        .await?;
        self.publish(EventPayload::ActiveZoneChanged {
            zone: ActiveZone::Suspend,
        })
        .await;
        Ok(())
    }

    /// Change the house target temperature.
    ///
    /// While Off or suspended the target is only stored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFinite`] for NaN or infinite targets, or
    /// a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn set_house_target(&self, target: f64) -> Result<(), ClimaError> {
        if !target.is_finite() {
            return Err(ValidationError::NotFinite.into());
        }
        let ((), snapshot) = self
            .mutate(|s| {
                s.state.house_target = target;
                Ok(())
            })
            .await?;
        self.publish(EventPayload::TargetChanged { target }).await;

        if snapshot.state.is_suspended() || snapshot.state.hvac_mode == HvacMode::Off {
            return Ok(());
        }
        self.apply_immediate().await
    }

    /// Change the boost offset, floored at zero. Takes effect on the next pass.
    ///
    /// Returns the stored offset.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotFinite`] or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn set_active_zone_offset(&self, offset: f64) -> Result<f64, ClimaError> {
        if !offset.is_finite() {
            return Err(ValidationError::NotFinite.into());
        }
        let offset = offset.max(0.0);
        self.mutate(|s| {
            s.state.active_zone_offset = offset;
            Ok(())
        })
        .await?;
        self.publish(EventPayload::ZoneOffsetChanged { offset }).await;
        Ok(offset)
    }

    /// Restore the boost offset to the configured default.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn reset_active_zone_offset(&self) -> Result<f64, ClimaError> {
        let (offset, _) = self
            .mutate(|s| {
                s.state.active_zone_offset = s.options.default_zone_offset.max(0.0);
                Ok(s.state.active_zone_offset)
            })
            .await?;
        self.publish(EventPayload::ZoneOffsetChanged { offset }).await;
        Ok(offset)
    }

    /// Include or exclude an area from control at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::NotFound`] when the area is not configured.
    pub async fn set_area_included(&self, area_id: AreaId, included: bool) -> Result<(), ClimaError> {
        let snapshot = self.load_snapshot().await?;
        if snapshot.area(area_id).is_none() {
            return Err(NotFoundError {
                entity: "Area",
                id: area_id.to_string(),
            }
            .into());
        }
        {
            let mut runtime = self.runtime();
            runtime.sync_with(&snapshot.areas);
            runtime.set_included(area_id, included);
        }
        tracing::info!(%area_id, included, "area inclusion changed");
        self.publish(EventPayload::AreaIncludedChanged { area_id, included })
            .await;
        Ok(())
    }
}
