//! JSON handlers for the whole-building thermostat.
//!
//! While the controller is suspended, the operator surface keeps Suspend
//! sticky: requesting Off does not shut devices down, and zone or preset
//! selections other than Suspend are ignored until Heat or Cool is chosen.
//! The reported mode is `off` while suspended.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use climahub_app::controller::ControllerStatus;
use climahub_app::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};
use climahub_domain::hvac::{ActiveZone, HvacMode};
use climahub_domain::id::AreaId;
use climahub_domain::snapshot::{PRESET_NONE, PRESET_SUSPEND};

use crate::error::ApiError;
use crate::state::AppState;

/// Runtime view of one area.
#[derive(Debug, Serialize)]
pub struct AreaState {
    pub id: AreaId,
    pub name: String,
    pub included: bool,
}

/// Body of every climate endpoint.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub hvac_mode: HvacMode,
    pub suspended: bool,
    pub house_target: f64,
    pub current_temperature: Option<f64>,
    pub active_zone: ActiveZone,
    pub active_zone_offset: f64,
    /// `"none"` when no zone is active.
    pub preset: String,
    /// Every value accepted by `PUT /api/preset`.
    pub presets: Vec<String>,
    pub areas: Vec<AreaState>,
}

impl From<ControllerStatus> for StateResponse {
    fn from(status: ControllerStatus) -> Self {
        Self {
            hvac_mode: if status.suspended {
                HvacMode::Off
            } else {
                status.hvac_mode
            },
            suspended: status.suspended,
            house_target: status.house_target,
            current_temperature: status.current_temperature,
            active_zone: status.active_zone,
            active_zone_offset: status.active_zone_offset,
            preset: status
                .active_preset
                .unwrap_or_else(|| PRESET_NONE.to_string()),
            presets: [PRESET_NONE.to_string(), PRESET_SUSPEND.to_string()]
                .into_iter()
                .chain(status.preset_labels)
                .collect(),
            areas: status
                .areas
                .into_iter()
                .map(|area| AreaState {
                    id: area.id,
                    name: area.name,
                    included: area.included,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct SetModeRequest {
    pub mode: HvacMode,
}

#[derive(Deserialize)]
pub struct SetTargetRequest {
    pub target: f64,
}

/// `zone` is a zone id, `"__suspend__"`, or `null` for no zone.
#[derive(Deserialize)]
pub struct SetZoneRequest {
    pub zone: Option<String>,
}

#[derive(Deserialize)]
pub struct SetPresetRequest {
    pub preset: String,
}

/// A missing `offset` restores the default.
#[derive(Deserialize)]
pub struct SetZoneOffsetRequest {
    pub offset: Option<f64>,
}

async fn respond<S, A, R, P>(state: &AppState<S, A, R, P>) -> Result<Json<StateResponse>, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let status = state.controller.status().await?;
    Ok(Json(status.into()))
}

async fn is_suspended<S, A, R, P>(state: &AppState<S, A, R, P>) -> Result<bool, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Ok(state.controller.snapshot().await?.state.is_suspended())
}

/// `GET /api/state`
pub async fn get_state<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
) -> Result<Json<StateResponse>, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    respond(&state).await
}

/// `PUT /api/mode`
pub async fn set_mode<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Json(req): Json<SetModeRequest>,
) -> Result<Json<StateResponse>, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    if req.mode == HvacMode::Off && is_suspended(&state).await? {
        tracing::debug!("off requested while suspended, keeping suspend");
    } else {
        state.controller.set_hvac_mode(req.mode).await?;
    }
    respond(&state).await
}

/// `PUT /api/target`
pub async fn set_target<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Json(req): Json<SetTargetRequest>,
) -> Result<Json<StateResponse>, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    state.controller.set_house_target(req.target).await?;
    respond(&state).await
}

/// `PUT /api/zone`
pub async fn set_zone<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Json(req): Json<SetZoneRequest>,
) -> Result<Json<StateResponse>, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let zone = ActiveZone::from_key(req.zone.as_deref())
        .map_err(|_| ApiError::unknown("Zone", req.zone.as_deref().unwrap_or_default()))?;
    if zone != ActiveZone::Suspend && is_suspended(&state).await? {
        tracing::debug!(?zone, "zone change ignored while suspended");
    } else {
        state.controller.set_active_zone(zone).await?;
    }
    respond(&state).await
}

/// `PUT /api/preset`
pub async fn set_preset<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Json(req): Json<SetPresetRequest>,
) -> Result<Json<StateResponse>, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    if req.preset != PRESET_SUSPEND && is_suspended(&state).await? {
        tracing::debug!(preset = %req.preset, "preset change ignored while suspended");
    } else {
        state
            .controller
            .set_active_zone_by_label(&req.preset)
            .await?;
    }
    respond(&state).await
}

/// `PUT /api/zone-offset`
pub async fn set_zone_offset<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
    Json(req): Json<SetZoneOffsetRequest>,
) -> Result<Json<StateResponse>, ApiError>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    match req.offset {
        Some(offset) => state.controller.set_active_zone_offset(offset).await?,
        None => state.controller.reset_active_zone_offset().await?,
    };
    respond(&state).await
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::build;
    use crate::test_support::{fixture, send};

    #[tokio::test]
    async fn should_report_state() {
        let f = fixture();

        let (status, body) = send(build(f.state), "GET", "/api/state", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hvac_mode"], "off");
        assert_eq!(body["house_target"], 21.0);
        assert_eq!(body["active_zone"], serde_json::Value::Null);
        assert_eq!(body["preset"], "none");
        assert_eq!(body["presets"].as_array().unwrap().len(), 5);
        assert_eq!(body["presets"][0], "none");
        assert_eq!(body["presets"][1], "Suspend");
        assert_eq!(body["areas"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn should_switch_to_heat_and_write_centers() {
        let f = fixture();

        let (status, body) = send(
            build(f.state),
            "PUT",
            "/api/mode",
            Some(json!({"mode": "heat"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hvac_mode"], "heat");
        assert!(f.plant.writes.lock().unwrap().contains(&"number.living=21".to_string()));
    }

    #[tokio::test]
    async fn should_keep_suspend_when_off_requested() {
        let f = fixture();
        let app = build(f.state);
        send(app.clone(), "PUT", "/api/mode", Some(json!({"mode": "heat"}))).await;
        send(app.clone(), "PUT", "/api/zone", Some(json!({"zone": "__suspend__"}))).await;
        f.plant.writes.lock().unwrap().clear();

        let (status, body) = send(app, "PUT", "/api/mode", Some(json!({"mode": "off"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suspended"], true);
        assert_eq!(body["hvac_mode"], "off");
        assert_eq!(body["preset"], "Suspend");
        assert!(f.plant.writes.lock().unwrap().is_empty());
        assert!(f.store.current().state.is_suspended());
    }

    #[tokio::test]
    async fn should_ignore_presets_while_suspended() {
        let f = fixture();
        let app = build(f.state);
        send(app.clone(), "PUT", "/api/preset", Some(json!({"preset": "Suspend"}))).await;

        let (status, body) = send(
            app,
            "PUT",
            "/api/preset",
            Some(json!({"preset": "Warm Zone: office"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preset"], "Suspend");
    }

    #[tokio::test]
    async fn should_select_preset_by_label() {
        let f = fixture();

        let (status, body) = send(
            build(f.state),
            "PUT",
            "/api/preset",
            Some(json!({"preset": "Warm Zone: office"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preset"], "Warm Zone: office");
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_preset_and_zone() {
        let f = fixture();
        let app = build(f.state);

        let (preset, _) = send(
            app.clone(),
            "PUT",
            "/api/preset",
            Some(json!({"preset": "Warm Zone: moon"})),
        )
        .await;
        let (zone, _) = send(app, "PUT", "/api/zone", Some(json!({"zone": "garbage"}))).await;

        assert_eq!(preset, StatusCode::NOT_FOUND);
        assert_eq!(zone, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_set_and_reset_zone_offset() {
        let f = fixture();
        let app = build(f.state);

        let (_, body) = send(
            app.clone(),
            "PUT",
            "/api/zone-offset",
            Some(json!({"offset": -1.0})),
        )
        .await;
        assert_eq!(body["active_zone_offset"], 0.0);

        let (_, body) = send(app, "PUT", "/api/zone-offset", Some(json!({}))).await;
        assert_eq!(body["active_zone_offset"], 2.0);
    }

    #[tokio::test]
    async fn should_update_target() {
        let f = fixture();

        let (status, body) = send(
            build(f.state),
            "PUT",
            "/api/target",
            Some(json!({"target": 22.5})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["house_target"], 22.5);
    }
}
