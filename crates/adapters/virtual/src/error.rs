//! Errors raised by the virtual plant.

use climahub_domain::actuator::{ActuatorKind, DeviceMode};
use climahub_domain::error::ClimaError;

/// A command the virtual plant cannot carry out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("no virtual device named {0}")]
    UnknownEntity(String),

    #[error("{entity} is not a {expected}")]
    KindMismatch {
        entity: String,
        expected: &'static str,
    },

    #[error("{entity} does not support mode {mode}")]
    UnsupportedMode { entity: String, mode: DeviceMode },
}

impl DeviceError {
    pub(crate) fn mismatch(entity: &str, expected: ActuatorKind) -> Self {
        Self::KindMismatch {
            entity: entity.to_string(),
            expected: expected.as_str(),
        }
    }
}

impl From<DeviceError> for ClimaError {
    fn from(err: DeviceError) -> Self {
        Self::Device(Box::new(err))
    }
}
