//! Virtual temperature sensor.

/// Coefficient of heat exchange with the outside, per minute.
pub const LEAK_RATE: f64 = 0.01;

/// A simulated room temperature sensor.
///
/// A sensor without a reading models an unavailable device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualSensor {
    pub temperature: Option<f64>,
}

impl VirtualSensor {
    #[must_use]
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
        }
    }

    /// Advance the room by `minutes`: device `output` minus losses to `ambient`.
    pub fn advance(&mut self, output: f64, ambient: f64, minutes: f64) {
        if let Some(room) = self.temperature.as_mut() {
            *room += (output + (ambient - *room) * LEAK_RATE) * minutes;
        }
    }
}
