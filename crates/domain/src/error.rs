//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ClimaError`]
//! via `#[from]` or a manual `From` impl when crossing a port boundary.

/// Top-level error returned by domain validation and port implementations.
#[derive(Debug, thiserror::Error)]
pub enum ClimaError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The configuration store failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An actuator or sensor rejected a command or could not be reached.
    #[error("device error")]
    Device(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Broken domain invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("sensor reference must not be empty")]
    EmptySensor,

    #[error("actuator reference must not be empty")]
    EmptyActuator,

    #[error("min setpoint {min} is greater than max setpoint {max}")]
    InvertedBounds { min: f64, max: f64 },

    #[error("step must be greater than zero, got {0}")]
    NonPositiveStep(f64),

    #[error("gain must be greater than zero, got {0}")]
    NonPositiveGain(f64),

    #[error("value must be a finite number")]
    NotFinite,

    #[error("scan interval must be at least one second")]
    ZeroScanInterval,

    #[error("area must support heating, cooling, or both")]
    NoModeSupported,

    #[error("a custom zone needs at least two areas")]
    ZoneTooSmall,

    #[error("a custom zone cannot contain every area")]
    ZoneContainsAllAreas,

    #[error("at least three areas are required before creating a custom zone")]
    NotEnoughAreas,

    #[error("a zone with the same areas already exists")]
    DuplicateZone,

    #[error("zone references unknown area {0}")]
    UnknownArea(String),

    #[error("built-in zones cannot be modified")]
    BuiltInZone,

    #[error("area is still part of a custom zone")]
    AreaInCustomZone,

    #[error("an area with id {0} already exists")]
    DuplicateArea(String),
}

/// Lookup of an identified object that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_clima_error() {
        let err: ClimaError = ValidationError::EmptyName.into();
        assert!(matches!(err, ClimaError::Validation(ValidationError::EmptyName)));
    }

    #[test]
    fn should_display_not_found_error_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Zone",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Zone abc not found");
    }

    #[test]
    fn should_display_inverted_bounds() {
        let err = ValidationError::InvertedBounds {
            min: 30.0,
            max: 16.0,
        };
        assert_eq!(
            err.to_string(),
            "min setpoint 30 is greater than max setpoint 16"
        );
    }
}
