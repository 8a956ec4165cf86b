//! The controller: single owner of the global state and per-area runtime.
//!
//! The controller ties every port together. Operator commands mutate the
//! [`GlobalState`](climahub_domain::hvac::GlobalState) through the config
//! store, control passes read the latest snapshot and drive the actuators.
//!
//! ## Concurrency
//!
//! - One **pass token** (`tokio::sync::Mutex<()>`) serialises every pass that
//!   writes to actuators. Periodic passes `try_lock` it and are dropped when
//!   busy; immediate-apply and turn-off-all wait for it.
//! - One **state lock** serialises load-modify-save round trips. It is never
//!   held while waiting for the pass token, so the two cannot deadlock.
//! - Runtime bookkeeping sits behind a `std::sync::Mutex` that is never held
//!   across an `.await`.

mod commands;
mod configuration;
mod control_loop;
mod immediate;

use std::sync::{Mutex, MutexGuard, PoisonError};

use climahub_domain::area::Area;
use climahub_domain::error::ClimaError;
use climahub_domain::event::{Event, EventPayload};
use climahub_domain::hvac::{ActiveZone, HvacMode};
use climahub_domain::id::AreaId;
use climahub_domain::runtime::RuntimeStore;
use climahub_domain::snapshot::ConfigSnapshot;

use crate::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

pub use control_loop::PassOutcome;

/// Point-in-time view of the controller for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerStatus {
    pub hvac_mode: HvacMode,
    pub suspended: bool,
    pub house_target: f64,
    pub current_temperature: Option<f64>,
    pub active_zone: ActiveZone,
    pub active_zone_offset: f64,
    pub active_preset: Option<String>,
    pub preset_labels: Vec<String>,
    pub areas: Vec<AreaStatus>,
}

/// Runtime view of one area.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaStatus {
    pub id: AreaId,
    pub name: String,
    pub included: bool,
}

/// Whole-building thermostat controller.
pub struct Controller<S, A, R, P> {
    store: S,
    actuators: A,
    sensors: R,
    publisher: P,
    runtime: Mutex<RuntimeStore>,
    current_temperature: Mutex<Option<f64>>,
    pass_token: tokio::sync::Mutex<()>,
    state_lock: tokio::sync::Mutex<()>,
}

impl<S, A, R, P> Controller<S, A, R, P>
where
    S: ConfigStore + Send + Sync,
    A: ActuatorDriver + Send + Sync,
    R: SensorReader + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    /// Create a controller over the given ports.
    pub fn new(store: S, actuators: A, sensors: R, publisher: P) -> Self {
        Self {
            store,
            actuators,
            sensors,
            publisher,
            runtime: Mutex::new(RuntimeStore::new()),
            current_temperature: Mutex::new(None),
            pass_token: tokio::sync::Mutex::new(()),
            state_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Build runtime entries, re-apply the persisted mode and run a first pass.
    ///
    /// With an active mode and no Suspend, this is an immediate-apply (which
    /// ends with a normal pass); otherwise only a pass runs.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot cannot be loaded.
    #[tracing::instrument(skip(self))]
    pub async fn setup(&self) -> Result<(), ClimaError> {
        let snapshot = self.load_snapshot().await?;
        self.sync_runtime(&snapshot.areas);
        tracing::info!(
            areas = snapshot.areas.len(),
            zones = snapshot.zones.len(),
            mode = %snapshot.state.hvac_mode,
            "controller ready"
        );
        if snapshot.state.hvac_mode.is_active() && !snapshot.state.is_suspended() {
            self.apply_immediate().await
        } else {
            let _token = self.pass_token.lock().await;
            self.run_pass_locked().await
        }
    }

    /// Discard all runtime state.
    pub fn teardown(&self) {
        self.runtime().clear();
        *self.temperature_slot() = None;
    }

    /// Load the configuration snapshot with built-in zones maintained.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the config store.
    pub async fn snapshot(&self) -> Result<ConfigSnapshot, ClimaError> {
        self.load_snapshot().await
    }

    /// Last aggregate temperature computed by a pass.
    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        *self.temperature_slot()
    }

    /// Runtime inclusion of an area (falls back to its configured flag).
    #[must_use]
    pub fn is_included(&self, area: &Area) -> bool {
        self.runtime().is_included(area)
    }

    /// Build a [`ControllerStatus`] from the latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the config store.
    pub async fn status(&self) -> Result<ControllerStatus, ClimaError> {
        let snapshot = self.load_snapshot().await?;
        let resolver = snapshot.resolver();
        let areas = {
            let runtime = self.runtime();
            snapshot
                .areas
                .iter()
                .map(|area| AreaStatus {
                    id: area.id,
                    name: area.name.clone(),
                    included: runtime.is_included(area),
                })
                .collect()
        };
        Ok(ControllerStatus {
            hvac_mode: snapshot.state.hvac_mode,
            suspended: snapshot.state.is_suspended(),
            house_target: snapshot.state.house_target,
            current_temperature: self.current_temperature(),
            active_zone: snapshot.state.active_zone,
            active_zone_offset: snapshot.state.active_zone_offset,
            active_preset: resolver.active_preset_label(),
            preset_labels: resolver.preset_labels(),
            areas,
        })
    }

    async fn load_snapshot(&self) -> Result<ConfigSnapshot, ClimaError> {
        let mut snapshot = self.store.load().await?;
        snapshot.normalize();
        Ok(snapshot)
    }

    /// Load, modify and save the snapshot under the state lock.
    async fn mutate<T, F>(&self, change: F) -> Result<(T, ConfigSnapshot), ClimaError>
    where
        F: FnOnce(&mut ConfigSnapshot) -> Result<T, ClimaError> + Send,
        T: Send,
    {
        let _guard = self.state_lock.lock().await;
        let mut snapshot = self.load_snapshot().await?;
        let out = change(&mut snapshot)?;
        snapshot.normalize();
        self.store.save(&snapshot).await?;
        Ok((out, snapshot))
    }

    /// Publish an event; failures are logged and never abort the caller.
    async fn publish(&self, payload: EventPayload) {
        let kind = payload.kind();
        if let Err(err) = self.publisher.publish(Event::new(payload)).await {
            tracing::warn!(%err, kind, "failed to publish controller event");
        }
    }

    fn sync_runtime(&self, areas: &[Area]) {
        self.runtime().sync_with(areas);
    }

    /// Areas that take part in control for `mode`, in configuration order.
    ///
    /// `Off` selects every included area.
    fn participating<'a>(&self, snapshot: &'a ConfigSnapshot, mode: HvacMode) -> Vec<&'a Area> {
        let runtime = self.runtime();
        snapshot
            .areas
            .iter()
            .filter(|area| runtime.is_included(area))
            .filter(|area| mode == HvacMode::Off || area.supports(mode))
            .collect()
    }

    fn runtime(&self) -> MutexGuard<'_, RuntimeStore> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn temperature_slot(&self) -> MutexGuard<'_, Option<f64>> {
        self.current_temperature
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
