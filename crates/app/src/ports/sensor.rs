//! Sensor port: room temperature readings.

use std::future::Future;

use climahub_domain::error::ClimaError;

/// Reads temperature sensors by external reference.
pub trait SensorReader {
    /// Current reading of `sensor`, or `None` when unavailable or unparseable.
    fn read(&self, sensor: &str) -> impl Future<Output = Result<Option<f64>, ClimaError>> + Send;
}

impl<T: SensorReader + Send + Sync> SensorReader for std::sync::Arc<T> {
    fn read(&self, sensor: &str) -> impl Future<Output = Result<Option<f64>, ClimaError>> + Send {
        (**self).read(sensor)
    }
}
