//! JSON REST handlers for areas.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use climahub_app::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};
use climahub_domain::actuator::Actuator;
use climahub_domain::area::{Area, DEFAULT_MAX_SETPOINT, DEFAULT_MIN_SETPOINT};
use climahub_domain::id::AreaId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an area.
///
/// Omitted fields take the builder defaults.
#[derive(Deserialize)]
pub struct CreateAreaRequest {
    pub name: String,
    pub sensor: String,
    pub actuator: Actuator,
    pub supports_heat: Option<bool>,
    pub supports_cool: Option<bool>,
    pub min_setpoint: Option<f64>,
    pub max_setpoint: Option<f64>,
    pub step: Option<f64>,
    pub bias: Option<f64>,
    pub gain: Option<f64>,
    pub included: Option<bool>,
}

impl CreateAreaRequest {
    fn into_area(self) -> Result<Area, ApiError> {
        let mut builder = Area::builder()
            .name(self.name)
            .sensor(self.sensor)
            .actuator(self.actuator)
            .bounds(
                self.min_setpoint.unwrap_or(DEFAULT_MIN_SETPOINT),
                self.max_setpoint.unwrap_or(DEFAULT_MAX_SETPOINT),
            );
        if let Some(value) = self.supports_heat {
            builder = builder.supports_heat(value);
        }
        if let Some(value) = self.supports_cool {
            builder = builder.supports_cool(value);
        }
        if let Some(step) = self.step {
            builder = builder.step(step);
        }
        if let Some(bias) = self.bias {
            builder = builder.bias(bias);
        }
        if let Some(gain) = self.gain {
            builder = builder.gain(gain);
        }
        if let Some(included) = self.included {
            builder = builder.included(included);
        }
        Ok(builder.build()?)
    }
}

#[derive(Deserialize)]
pub struct SetIncludedRequest {
    pub included: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Area>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Area>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete and update endpoints.
pub enum NoContentResponse {
    NoContent,
}

impl IntoResponse for NoContentResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<AreaId, ApiError> {
    AreaId::from_str(id).map_err(|_| ApiError::unknown("Area", id))
}

/// `GET /api/areas`
///
/// `included` reflects the runtime flag, which operators can toggle
/// without touching the stored configuration.
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
    let areas = snapshot
        .areas
        .into_iter()
        .map(|mut area| {
            area.included = state.controller.is_included(&area);
            area
        })
        .collect();
    Ok(ListResponse::Ok(Json(areas)))
}

/// `POST /api/areas`
pub async fn create<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Json(req): Json<CreateAreaRequest>,
) -> Result<CreateResponse, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let area = req.into_area()?;
    let created = state.controller.add_area(area).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `DELETE /api/areas/{id}`
pub async fn delete<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Path(id): Path<String>,
) -> Result<NoContentResponse, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let area_id = parse_id(&id)?;
    state.controller.remove_area(area_id).await?;
    Ok(NoContentResponse::NoContent)
}

/// `PUT /api/areas/{id}/included`
pub async fn set_included<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Path(id): Path<String>,
    Json(req): Json<SetIncludedRequest>,
) -> Result<NoContentResponse, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let area_id = parse_id(&id)?;
    state
        .controller
        .set_area_included(area_id, req.included)
        .await?;
    Ok(NoContentResponse::NoContent)
}
