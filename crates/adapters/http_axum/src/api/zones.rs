//! JSON REST handlers for zones.
//!
//! Built-in zones are listed alongside custom ones but only custom zones
//! can be created, edited or deleted.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use climahub_app::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};
use climahub_domain::id::{AreaId, ZoneId};
use climahub_domain::zone::Zone;

use crate::error::ApiError;
use crate::state::AppState;

/// A zone with its preset label.
#[derive(Debug, Serialize)]
pub struct ZoneView {
    #[serde(flatten)]
    pub zone: Zone,
    pub label: String,
}

/// Request body for creating or editing a custom zone.
#[derive(Deserialize)]
pub struct ZoneMembersRequest {
    pub area_ids: Vec<AreaId>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ZoneView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create and update endpoints.
pub enum WriteResponse {
    Created(Json<Zone>),
    Ok(Json<Zone>),
}

impl IntoResponse for WriteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<ZoneId, ApiError> {
    ZoneId::from_str(id).map_err(|_| ApiError::unknown("Zone", id))
}

/// `GET /api/zones`
pub async fn list<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
) -> Result<ListResponse, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let snapshot = state.controller.snapshot().await?;
    let zones = snapshot
        .zones
        .iter()
        .map(|zone| ZoneView {
            label: zone.label(&snapshot.areas),
            zone: zone.clone(),
        })
        .collect();
    Ok(ListResponse::Ok(Json(zones)))
}

/// `POST /api/zones`
pub async fn create<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Json(req): Json<ZoneMembersRequest>,
) -> Result<WriteResponse, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let zone = state.controller.add_custom_zone(&req.area_ids).await?;
    Ok(WriteResponse::Created(Json(zone)))
}

/// `PUT /api/zones/{id}`
pub async fn update<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Path(id): Path<String>,
    Json(req): Json<ZoneMembersRequest>,
) -> Result<WriteResponse, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let zone_id = parse_id(&id)?;
    let zone = state
        .controller
        .edit_custom_zone(zone_id, &req.area_ids)
        .await?;
    Ok(WriteResponse::Ok(Json(zone)))
}

/// `DELETE /api/zones/{id}`
pub async fn delete<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let zone_id = parse_id(&id)?;
    state.controller.remove_custom_zone(zone_id).await?;
    Ok(DeleteResponse::NoContent)
}
