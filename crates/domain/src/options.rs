//! Global tuning knobs of the control loop.

use serde::{Deserialize, Serialize};

use crate::error::{ClimaError, ValidationError};
use crate::hvac::DEFAULT_ZONE_OFFSET;

pub const DEFAULT_DEADBAND: f64 = 0.5;
pub const DEFAULT_SCAN_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_MIN_CHANGE_SECONDS: u64 = 60;
pub const DEFAULT_SETPOINT_LIMIT: f64 = 3.0;
pub const DEFAULT_UNWIND_THRESHOLD: f64 = 1.5;

/// Options shared by every area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlOptions {
    /// Tolerance around the desired temperature, in degrees.
    pub deadband: f64,
    /// Interval between periodic control passes.
    pub scan_interval_seconds: u64,
    /// Minimum time between two committed writes to the same area.
    pub min_change_seconds: u64,
    /// Half-width of the band around the center setpoint.
    pub setpoint_limit: f64,
    /// Error magnitude below which the target relaxes toward center.
    pub unwind_threshold: f64,
    /// Offset restored by a zone-offset reset.
    pub default_zone_offset: f64,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            deadband: DEFAULT_DEADBAND,
            scan_interval_seconds: DEFAULT_SCAN_INTERVAL_SECONDS,
            min_change_seconds: DEFAULT_MIN_CHANGE_SECONDS,
            setpoint_limit: DEFAULT_SETPOINT_LIMIT,
            unwind_threshold: DEFAULT_UNWIND_THRESHOLD,
            default_zone_offset: DEFAULT_ZONE_OFFSET,
        }
    }
}

impl ControlOptions {
    /// Band half-width, floored at zero.
    #[must_use]
    pub fn limit(&self) -> f64 {
        self.setpoint_limit.max(0.0)
    }

    /// Unwind threshold, floored at zero.
    #[must_use]
    pub fn unwind(&self) -> f64 {
        self.unwind_threshold.max(0.0)
    }

    /// Check that every numeric option is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::Validation`] when a value is not finite, or when
    /// the scan interval is zero.
    pub fn validate(&self) -> Result<(), ClimaError> {
        let numbers = [
            self.deadband,
            self.setpoint_limit,
            self.unwind_threshold,
            self.default_zone_offset,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::NotFinite.into());
        }
        if self.scan_interval_seconds == 0 {
            return Err(ValidationError::ZeroScanInterval.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_documented_defaults() {
        let options = ControlOptions::default();
        assert!((options.deadband - 0.5).abs() < f64::EPSILON);
        assert_eq!(options.scan_interval_seconds, 30);
        assert_eq!(options.min_change_seconds, 60);
        assert!((options.setpoint_limit - 3.0).abs() < f64::EPSILON);
        assert!((options.unwind_threshold - 1.5).abs() < f64::EPSILON);
        assert!((options.default_zone_offset - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_floor_negative_limit_and_unwind() {
        let options = ControlOptions {
            setpoint_limit: -1.0,
            unwind_threshold: -2.0,
            ..ControlOptions::default()
        };
        assert!(options.limit().abs() < f64::EPSILON);
        assert!(options.unwind().abs() < f64::EPSILON);
    }

    #[test]
    fn should_fill_missing_fields_from_defaults() {
        let options: ControlOptions = serde_json::from_str(r#"{"deadband": 0.3}"#).unwrap();
        assert!((options.deadband - 0.3).abs() < f64::EPSILON);
        assert_eq!(options.scan_interval_seconds, 30);
    }

    #[test]
    fn should_reject_zero_scan_interval() {
        let options = ControlOptions {
            scan_interval_seconds: 0,
            ..ControlOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
