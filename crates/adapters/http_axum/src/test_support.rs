//! Port stubs and request helpers shared by the handler tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use climahub_app::controller::Controller;
use climahub_app::event_bus::InProcessEventBus;
use climahub_app::ports::{ActuatorDriver, ConfigStore, SensorReader};
use climahub_domain::actuator::{Actuator, ActuatorRead, DeviceMode};
use climahub_domain::area::Area;
use climahub_domain::error::ClimaError;
use climahub_domain::snapshot::ConfigSnapshot;

use crate::state::AppState;

#[derive(Default)]
pub struct MemoryStore(Mutex<ConfigSnapshot>);

impl MemoryStore {
    pub fn current(&self) -> ConfigSnapshot {
        self.0.lock().unwrap().clone()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> impl Future<Output = Result<ConfigSnapshot, ClimaError>> + Send {
        let snapshot = self.current();
        async { Ok(snapshot) }
    }

    fn save(
        &self,
        snapshot: &ConfigSnapshot,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        *self.0.lock().unwrap() = snapshot.clone();
        async { Ok(()) }
    }
}

/// Every device accepts every command; every room reads 19°C.
#[derive(Default)]
pub struct StubPlant {
    pub writes: Mutex<Vec<String>>,
}

impl StubPlant {
    fn record(&self, entry: String) -> impl Future<Output = Result<(), ClimaError>> + Send {
        self.writes.lock().unwrap().push(entry);
        async { Ok(()) }
    }
}

impl ActuatorDriver for StubPlant {
    fn read(
        &self,
        _actuator: &Actuator,
    ) -> impl Future<Output = Result<ActuatorRead, ClimaError>> + Send {
        async {
            Ok(ActuatorRead {
                setpoint: Some(20.0),
                ..ActuatorRead::default()
            })
        }
    }

    fn set_setpoint(
        &self,
        actuator: &Actuator,
        value: f64,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        self.record(format!("{}={value}", actuator.entity()))
    }

    fn set_mode(
        &self,
        actuator: &Actuator,
        mode: DeviceMode,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        self.record(format!("{}:{mode}", actuator.entity()))
    }

    fn turn_on(&self, actuator: &Actuator) -> impl Future<Output = Result<(), ClimaError>> + Send {
        self.record(format!("{}:on", actuator.entity()))
    }

    fn turn_off(
        &self,
        actuator: &Actuator,
    ) -> impl Future<Output = Result<(), ClimaError>> + Send {
        self.record(format!("{}:off", actuator.entity()))
    }
}

impl SensorReader for StubPlant {
    fn read(&self, _sensor: &str) -> impl Future<Output = Result<Option<f64>, ClimaError>> + Send {
        async { Ok(Some(19.0)) }
    }
}

pub type TestState =
    AppState<Arc<MemoryStore>, Arc<StubPlant>, Arc<StubPlant>, Arc<InProcessEventBus>>;

pub struct Fixture {
    pub state: TestState,
    pub store: Arc<MemoryStore>,
    pub plant: Arc<StubPlant>,
}

fn area(name: &str) -> Area {
    Area::builder()
        .name(name)
        .sensor(format!("sensor.{name}"))
        .actuator(Actuator::NumericSetpoint(format!("number.{name}")))
        .supports_cool(true)
        .build()
        .unwrap()
}

/// Three numeric-setpoint areas (`living`, `office`, `hall`), mode Off.
pub fn fixture() -> Fixture {
    let mut snapshot = ConfigSnapshot {
        areas: vec![area("living"), area("office"), area("hall")],
        ..ConfigSnapshot::default()
    };
    snapshot.state.house_target = 21.0;
    snapshot.normalize();

    let store = Arc::new(MemoryStore(Mutex::new(snapshot)));
    let plant = Arc::new(StubPlant::default());
    let event_bus = Arc::new(InProcessEventBus::new(16));
    let controller = Controller::new(
        Arc::clone(&store),
        Arc::clone(&plant),
        Arc::clone(&plant),
        Arc::clone(&event_bus),
    );
    Fixture {
        state: AppState::new(Arc::new(controller), event_bus),
        store,
        plant,
    }
}

/// Send one request and decode the JSON response body (`Null` when empty).
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
