//! # climahubd
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Seed the configuration store on first start
//! - Register simulated devices for every area (virtual integration)
//! - Construct the controller, injecting adapters via port traits
//! - Start the periodic control loop
//! - Build the axum router and serve it
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use climahub_adapter_http_axum::state::AppState;
use climahub_adapter_storage_sqlite_sqlx::SqliteConfigStore;
use climahub_adapter_virtual::VirtualPlant;
use climahub_app::controller::Controller;
use climahub_app::event_bus::InProcessEventBus;
use climahub_app::ports::ConfigStore;
use climahub_app::scheduler::{ControlLoopScheduler, PassTrigger};
use climahub_domain::snapshot::ConfigSnapshot;

use crate::config::{Config, IntegrationsConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = climahub_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let store = SqliteConfigStore::new(db.pool().clone());
    if store.is_empty().await? {
        seed(&store, &config).await?;
    }

    // Devices
    let plant = Arc::new(VirtualPlant::new());
    let snapshot = store.load().await?;
    if config.integrations.virtual_enabled {
        register_virtual_devices(&plant, &snapshot, &config.integrations);
    } else {
        tracing::warn!("virtual integration disabled, no devices are registered");
    }

    // Controller
    let event_bus = Arc::new(InProcessEventBus::new(256));
    let controller = Arc::new(Controller::new(
        store,
        Arc::clone(&plant),
        Arc::clone(&plant),
        Arc::clone(&event_bus),
    ));
    controller.setup().await?;
    let scheduler = ControlLoopScheduler::start(
        Arc::clone(&controller),
        Duration::from_secs(snapshot.options.scan_interval_seconds),
    );
    let simulation = spawn_simulation(&plant, &config.integrations, scheduler.trigger());

    // HTTP
    let state = AppState::new(Arc::clone(&controller), event_bus);
    let app = climahub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "climahubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    if let Some(task) = simulation {
        task.abort();
    }
    controller.teardown();
    tracing::info!("climahubd stopped");
    Ok(())
}

/// Write the configured areas and control options into an empty store.
async fn seed(store: &SqliteConfigStore, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = ConfigSnapshot {
        options: config.control.clone(),
        ..ConfigSnapshot::default()
    };
    for area in &config.areas {
        snapshot.areas.push(area.to_area()?);
    }
    snapshot.normalize();
    store.save(&snapshot).await?;
    tracing::info!(areas = snapshot.areas.len(), "configuration store seeded");
    Ok(())
}

fn register_virtual_devices(
    plant: &VirtualPlant,
    snapshot: &ConfigSnapshot,
    integrations: &IntegrationsConfig,
) {
    for area in &snapshot.areas {
        plant.add_device(&area.actuator);
        plant.add_sensor(
            &area.sensor,
            integrations.initial_temperature,
            Some(&area.actuator),
        );
    }
    tracing::info!(areas = snapshot.areas.len(), "virtual devices registered");
}

/// Advance the simulated rooms in real time and let the controller react to
/// the new temperatures.
fn spawn_simulation(
    plant: &Arc<VirtualPlant>,
    integrations: &IntegrationsConfig,
    trigger: PassTrigger,
) -> Option<tokio::task::JoinHandle<()>> {
    if !integrations.virtual_enabled || integrations.simulation_interval_seconds == 0 {
        return None;
    }
    let plant = Arc::clone(plant);
    let ambient = integrations.ambient_temperature;
    let period = Duration::from_secs(integrations.simulation_interval_seconds);
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            plant.simulate(ambient, period.as_secs_f64() / 60.0);
            trigger.fire();
        }
    }))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
