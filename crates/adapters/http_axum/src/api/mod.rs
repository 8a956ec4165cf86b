//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod areas;
#[allow(clippy::missing_errors_doc)]
pub mod climate;
pub mod sse;
#[allow(clippy::missing_errors_doc)]
pub mod zones;

use axum::Router;
use axum::routing::{get, put};

use climahub_app::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, A, R, P>() -> Router<AppState<S, A, R, P>>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Climate
        .route("/state", get(climate::get_state::<S, A, R, P>))
        .route("/mode", put(climate::set_mode::<S, A, R, P>))
        .route("/target", put(climate::set_target::<S, A, R, P>))
        .route("/zone", put(climate::set_zone::<S, A, R, P>))
        .route("/preset", put(climate::set_preset::<S, A, R, P>))
        .route("/zone-offset", put(climate::set_zone_offset::<S, A, R, P>))
        // Areas
        .route(
            "/areas",
            get(areas::list::<S, A, R, P>).post(areas::create::<S, A, R, P>),
        )
        .route("/areas/{id}", axum::routing::delete(areas::delete::<S, A, R, P>))
        .route(
            "/areas/{id}/included",
            put(areas::set_included::<S, A, R, P>),
        )
        // Zones
        .route(
            "/zones",
            get(zones::list::<S, A, R, P>).post(zones::create::<S, A, R, P>),
        )
        .route(
            "/zones/{id}",
            put(zones::update::<S, A, R, P>).delete(zones::delete::<S, A, R, P>),
        )
        // Events
        .route("/events/stream", get(sse::stream::<S, A, R, P>))
}
