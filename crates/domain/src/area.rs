//! Area: one room under control, with exactly one sensor and one actuator.

use serde::{Deserialize, Serialize};

use crate::actuator::Actuator;
use crate::error::{ClimaError, ValidationError};
use crate::hvac::HvacMode;
use crate::id::AreaId;

pub const DEFAULT_MIN_SETPOINT: f64 = 16.0;
pub const DEFAULT_MAX_SETPOINT: f64 = 30.0;
pub const DEFAULT_STEP: f64 = 0.5;
pub const DEFAULT_BIAS: f64 = 0.0;
pub const DEFAULT_GAIN: f64 = 1.0;

/// A configured room driven by the control loop.
///
/// `bias` shifts the setpoint that corresponds to "no error" (useful for a
/// thermostat whose own probe reads warmer than the room), and `gain`
/// multiplies the per-pass step so slow devices can move faster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub sensor: String,
    pub actuator: Actuator,
    pub supports_heat: bool,
    pub supports_cool: bool,
    pub min_setpoint: f64,
    pub max_setpoint: f64,
    pub step: f64,
    pub bias: f64,
    pub gain: f64,
    pub included: bool,
}

impl Area {
    /// Create a builder for constructing an [`Area`].
    #[must_use]
    pub fn builder() -> AreaBuilder {
        AreaBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::Validation`] when a reference is empty, when the
    /// bounds are inverted or not finite, or when `step`/`gain` are not
    /// strictly positive.
    pub fn validate(&self) -> Result<(), ClimaError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.sensor.trim().is_empty() {
            return Err(ValidationError::EmptySensor.into());
        }
        if self.actuator.entity().trim().is_empty() {
            return Err(ValidationError::EmptyActuator.into());
        }
        if !self.supports_heat && !self.supports_cool {
            return Err(ValidationError::NoModeSupported.into());
        }
        let numbers = [
            self.min_setpoint,
            self.max_setpoint,
            self.step,
            self.bias,
            self.gain,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::NotFinite.into());
        }
        if self.min_setpoint > self.max_setpoint {
            return Err(ValidationError::InvertedBounds {
                min: self.min_setpoint,
                max: self.max_setpoint,
            }
            .into());
        }
        if self.step <= 0.0 {
            return Err(ValidationError::NonPositiveStep(self.step).into());
        }
        if self.gain <= 0.0 {
            return Err(ValidationError::NonPositiveGain(self.gain).into());
        }
        Ok(())
    }

    /// Whether this area takes part in the given global mode.
    ///
    /// Always `false` for [`HvacMode::Off`]: nothing is controlled while off.
    #[must_use]
    pub fn supports(&self, mode: HvacMode) -> bool {
        match mode {
            HvacMode::Heat => self.supports_heat,
            HvacMode::Cool => self.supports_cool,
            HvacMode::Off => false,
        }
    }
}

/// Step-by-step builder for [`Area`].
#[derive(Debug, Default)]
pub struct AreaBuilder {
    id: Option<AreaId>,
    name: Option<String>,
    sensor: Option<String>,
    actuator: Option<Actuator>,
    supports_heat: Option<bool>,
    supports_cool: Option<bool>,
    min_setpoint: Option<f64>,
    max_setpoint: Option<f64>,
    step: Option<f64>,
    bias: Option<f64>,
    gain: Option<f64>,
    included: Option<bool>,
}

impl AreaBuilder {
    #[must_use]
    pub fn id(mut self, id: AreaId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = Some(sensor.into());
        self
    }

    #[must_use]
    pub fn actuator(mut self, actuator: Actuator) -> Self {
        self.actuator = Some(actuator);
        self
    }

    #[must_use]
    pub fn supports_heat(mut self, value: bool) -> Self {
        self.supports_heat = Some(value);
        self
    }

    #[must_use]
    pub fn supports_cool(mut self, value: bool) -> Self {
        self.supports_cool = Some(value);
        self
    }

    #[must_use]
    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min_setpoint = Some(min);
        self.max_setpoint = Some(max);
        self
    }

    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn bias(mut self, bias: f64) -> Self {
        self.bias = Some(bias);
        self
    }

    #[must_use]
    pub fn gain(mut self, gain: f64) -> Self {
        self.gain = Some(gain);
        self
    }

    #[must_use]
    pub fn included(mut self, included: bool) -> Self {
        self.included = Some(included);
        self
    }

    /// Consume the builder, validate, and return an [`Area`].
    ///
    /// Heating support defaults to on and cooling to off; numeric fields
    /// fall back to the `DEFAULT_*` constants of this module.
    ///
    /// # Errors
    ///
    /// Returns [`ClimaError::Validation`] if the resulting area is invalid.
    pub fn build(self) -> Result<Area, ClimaError> {
        let area = Area {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            sensor: self.sensor.unwrap_or_default(),
            actuator: self
                .actuator
                .unwrap_or_else(|| Actuator::Thermostat(String::new())),
            supports_heat: self.supports_heat.unwrap_or(true),
            supports_cool: self.supports_cool.unwrap_or(false),
            min_setpoint: self.min_setpoint.unwrap_or(DEFAULT_MIN_SETPOINT),
            max_setpoint: self.max_setpoint.unwrap_or(DEFAULT_MAX_SETPOINT),
            step: self.step.unwrap_or(DEFAULT_STEP),
            bias: self.bias.unwrap_or(DEFAULT_BIAS),
            gain: self.gain.unwrap_or(DEFAULT_GAIN),
            included: self.included.unwrap_or(true),
        };
        area.validate()?;
        Ok(area)
    }
}
