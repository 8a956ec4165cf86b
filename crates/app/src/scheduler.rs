//! Periodic control loop driving [`Controller::run_pass`].
//!
//! The loop runs on its own tokio task. Ticks missed while a pass is slow
//! are skipped rather than bunched; a pass requested while another is in
//! flight is dropped by the controller itself.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::controller::{Controller, PassOutcome};
use crate::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Spawns the control loop.
pub struct ControlLoopScheduler;

impl ControlLoopScheduler {
    /// Start ticking every `period` (at least one second).
    ///
    /// The first pass runs one period after start; [`Controller::setup`]
    /// is expected to have run the initial one.
    #[must_use]
    pub fn start<S, A, R, P>(
        controller: Arc<Controller<S, A, R, P>>,
        period: Duration,
    ) -> SchedulerHandle
    where
        S: ConfigStore + Send + Sync + 'static,
        A: ActuatorDriver + Send + Sync + 'static,
        R: SensorReader + Send + Sync + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let trigger = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(controller, period, Arc::clone(&trigger)));
        tracing::info!(period_secs = period.as_secs(), "control loop started");
        SchedulerHandle { trigger, task }
    }
}

async fn run_loop<S, A, R, P>(
    controller: Arc<Controller<S, A, R, P>>,
    period: Duration,
    trigger: Arc<Notify>,
) where
    S: ConfigStore + Send + Sync,
    A: ActuatorDriver + Send + Sync,
    R: SensorReader + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = trigger.notified() => {}
        }
        match controller.run_pass().await {
            Ok(PassOutcome::Ran) => {}
            Ok(PassOutcome::Skipped) => tracing::debug!("tick skipped, pass in flight"),
            Err(err) => tracing::warn!(%err, "control pass failed, retrying next tick"),
        }
    }
}

/// Handle on a running control loop. Dropping it stops the loop.
pub struct SchedulerHandle {
    trigger: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// A cloneable trigger that other tasks can use to request a pass.
    #[must_use]
    pub fn trigger(&self) -> PassTrigger {
        PassTrigger(Arc::clone(&self.trigger))
    }

    /// Stop the loop.
    pub fn shutdown(self) {
        tracing::info!("control loop stopped");
        self.task.abort();
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Requests a control pass without waiting for the next tick.
#[derive(Clone)]
pub struct PassTrigger(Arc<Notify>);

impl PassTrigger {
    /// Wake the loop. Requests made while a pass is pending coalesce.
    pub fn fire(&self) {
        self.0.notify_one();
    }
}
