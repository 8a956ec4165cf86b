//! Banded setpoint nudging: the numeric core of the control loop.
//!
//! For every setpoint-bearing area the loop computes a **center** setpoint
//! (`desired + bias`), a **band** of half-width `limit` around it (clamped to
//! the device bounds), and a **target** inside that band. Far from the desired
//! temperature the target sits at the band edge that drives the device
//! hardest in the needed direction. Within `unwind` degrees it relaxes
//! linearly back toward center, so the device never overshoots at steady state.
//!
//! Each pass then moves the current setpoint by at most `step * gain` toward
//! the target.

use crate::area::Area;
use crate::hvac::HvacMode;
use crate::options::ControlOptions;

/// Two setpoints closer than this are considered equal.
pub const SETPOINT_TOLERANCE: f64 = 0.001;

/// Loop-wide tuning used by [`nudge`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub limit: f64,
    pub unwind: f64,
    pub deadband: f64,
}

impl From<&ControlOptions> for Tuning {
    fn from(options: &ControlOptions) -> Self {
        Self {
            limit: options.limit(),
            unwind: options.unwind(),
            deadband: options.deadband,
        }
    }
}

/// Room temperature paired with the temperature the area should reach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub room: f64,
    pub desired: f64,
}

impl Reading {
    /// Signed error, positive when the room is warmer than desired.
    #[must_use]
    pub fn error(&self) -> f64 {
        self.room - self.desired
    }

    /// Whether the room sits within `deadband` of the desired temperature.
    #[must_use]
    pub fn within(&self, deadband: f64) -> bool {
        self.error().abs() <= deadband
    }
}

/// Outcome of one nudge computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetpointDecision {
    /// Write this setpoint and mark the area as changed.
    Write(f64),
    /// Leave the actuator alone.
    Hold,
}

#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < SETPOINT_TOLERANCE
}

/// Clamp `value` into `[low, high]`; `low` wins when the bounds are inverted.
#[must_use]
pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.min(high).max(low)
}

/// Round `value` to the nearest multiple of `step`, then to two decimals.
///
/// Exact halves round away from zero (`21.25` with step `0.5` gives `21.5`).
/// A non-positive `step` returns `value` unchanged.
#[must_use]
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let snapped = (value / step).round() * step;
    (snapped * 100.0).round() / 100.0
}

/// Which way the setpoint must move to correct a signed `error`.
///
/// Heating pushes up while the room is colder than desired; cooling pushes
/// down while it is warmer. Otherwise the push reverses.
#[must_use]
pub fn direction(mode: HvacMode, error: f64) -> f64 {
    match mode {
        HvacMode::Cool => {
            if error > 0.0 {
                -1.0
            } else {
                1.0
            }
        }
        HvacMode::Heat | HvacMode::Off => {
            if error < 0.0 {
                1.0
            } else {
                -1.0
            }
        }
    }
}

/// Share of the band to use for an error of magnitude `magnitude`.
#[must_use]
pub fn convergence_fraction(magnitude: f64, unwind: f64) -> f64 {
    if unwind <= 0.0 || magnitude >= unwind {
        1.0
    } else {
        magnitude / unwind
    }
}

/// Setpoint matching "no error" for this area, clamped and rounded.
#[must_use]
pub fn center_setpoint(area: &Area, desired: f64) -> f64 {
    round_to_step(
        clamp(desired + area.bias, area.min_setpoint, area.max_setpoint),
        area.step,
    )
}

/// Band around the unclamped center, itself clamped to the device bounds.
#[must_use]
pub fn band(area: &Area, center: f64, limit: f64) -> (f64, f64) {
    (
        clamp(center - limit, area.min_setpoint, area.max_setpoint),
        clamp(center + limit, area.min_setpoint, area.max_setpoint),
    )
}

/// Target setpoint for the current reading, inside the band and on a step.
#[must_use]
pub fn banded_target(area: &Area, mode: HvacMode, reading: Reading, tuning: &Tuning) -> f64 {
    let center = reading.desired + area.bias;
    let error = reading.error();
    let frac = convergence_fraction(error.abs(), tuning.unwind);
    let raw = center + direction(mode, error) * tuning.limit * frac;
    let (low, high) = band(area, center, tuning.limit);
    round_to_step(clamp(raw, low, high), area.step)
}

/// Decide the next setpoint for an area whose actuator reports `current`.
///
/// An unknown `current` (device just appeared) is initialised to the center
/// setpoint. Otherwise the setpoint moves one bounded step toward the banded
/// target. The write is held when already converged, when the move would not
/// change the setpoint, or when the room is inside the deadband and the move
/// only lands back on center.
#[must_use]
pub fn nudge(
    area: &Area,
    mode: HvacMode,
    reading: Reading,
    current: Option<f64>,
    tuning: &Tuning,
) -> SetpointDecision {
    let center = center_setpoint(area, reading.desired);
    let Some(current) = current else {
        return SetpointDecision::Write(center);
    };

    let target = banded_target(area, mode, reading, tuning);
    if approx_eq(current, target) {
        return SetpointDecision::Hold;
    }

    let delta = area.step * area.gain;
    let stepped = if current < target {
        (current + delta).min(target)
    } else {
        (current - delta).max(target)
    };
    let next = round_to_step(
        clamp(stepped, area.min_setpoint, area.max_setpoint),
        area.step,
    );

    if reading.within(tuning.deadband) && approx_eq(next, center) {
        return SetpointDecision::Hold;
    }
    if approx_eq(next, current) {
        return SetpointDecision::Hold;
    }
    SetpointDecision::Write(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::Actuator;

    fn area() -> Area {
        Area::builder()
            .name("Office")
            .sensor("sensor.office")
            .actuator(Actuator::Thermostat("climate.office".to_string()))
            .bounds(16.0, 30.0)
            .step(0.5)
            .gain(1.0)
            .build()
            .unwrap()
    }

    fn tuning() -> Tuning {
        Tuning {
            limit: 3.0,
            unwind: 2.0,
            deadband: 0.5,
        }
    }

    fn reading(room: f64, desired: f64) -> Reading {
        Reading { room, desired }
    }

    #[test]
    fn should_push_to_band_edge_when_far_below_target_in_heat() {
        let target = banded_target(&area(), HvacMode::Heat, reading(19.0, 21.0), &tuning());
        assert!((target - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_take_one_bounded_step_from_current_setpoint() {
        let decision = nudge(
            &area(),
            HvacMode::Heat,
            reading(19.0, 21.0),
            Some(21.0),
            &tuning(),
        );
        assert_eq!(decision, SetpointDecision::Write(21.5));
    }

    #[test]
    fn should_write_center_when_current_setpoint_unknown() {
        let decision = nudge(&area(), HvacMode::Heat, reading(19.0, 21.0), None, &tuning());
        assert_eq!(decision, SetpointDecision::Write(21.0));
    }

    #[test]
    fn should_hold_when_converged_on_target() {
        let decision = nudge(
            &area(),
            HvacMode::Heat,
            reading(19.0, 21.0),
            Some(24.0),
            &tuning(),
        );
        assert_eq!(decision, SetpointDecision::Hold);
    }

    #[test]
    fn should_hold_when_resting_inside_deadband_next_to_center() {
        // room == desired: target is center, the step would land on it
        let decision = nudge(
            &area(),
            HvacMode::Heat,
            reading(21.0, 21.0),
            Some(21.5),
            &tuning(),
        );
        assert_eq!(decision, SetpointDecision::Hold);
    }

    #[test]
    fn should_unwind_toward_center_near_target() {
        // error of 1.0 with unwind 2.0 uses half the band: 21 + 1.5 = 22.5
        let target = banded_target(&area(), HvacMode::Heat, reading(20.0, 21.0), &tuning());
        assert!((target - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_push_down_when_room_warmer_in_cool() {
        assert!((direction(HvacMode::Cool, 1.0) + 1.0).abs() < f64::EPSILON);
        assert!((direction(HvacMode::Cool, -1.0) - 1.0).abs() < f64::EPSILON);
        assert!((direction(HvacMode::Heat, -1.0) - 1.0).abs() < f64::EPSILON);
        assert!((direction(HvacMode::Heat, 0.0) + 1.0).abs() < f64::EPSILON);

        let target = banded_target(&area(), HvacMode::Cool, reading(26.0, 24.0), &tuning());
        assert!((target - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_keep_target_inside_device_clamped_band() {
        let mut narrow = area();
        narrow.min_setpoint = 19.0;
        narrow.max_setpoint = 22.0;
        for room in [10.0, 17.5, 19.9, 20.0, 20.3, 21.0, 23.0, 35.0] {
            for desired in [18.0, 20.0, 21.0, 23.5] {
                for mode in [HvacMode::Heat, HvacMode::Cool] {
                    let t = banded_target(&narrow, mode, reading(room, desired), &tuning());
                    let center = desired + narrow.bias;
                    let low = (center - 3.0).max(19.0).min(22.0);
                    let high = (center + 3.0).min(22.0).max(19.0);
                    assert!(
                        t >= low - SETPOINT_TOLERANCE && t <= high + SETPOINT_TOLERANCE,
                        "target {t} outside [{low}, {high}]"
                    );
                }
            }
        }
    }

    #[test]
    fn should_converge_monotonically_without_overshoot() {
        let mut fast = area();
        fast.gain = 2.0;
        let reading = reading(18.0, 21.0);
        let target = banded_target(&fast, HvacMode::Heat, reading, &tuning());
        let mut current = 17.0;
        for _ in 0..20 {
            match nudge(&fast, HvacMode::Heat, reading, Some(current), &tuning()) {
                SetpointDecision::Write(next) => {
                    assert!(next > current);
                    assert!(next - current <= 1.0 + SETPOINT_TOLERANCE);
                    assert!(next <= target + SETPOINT_TOLERANCE);
                    current = next;
                }
                SetpointDecision::Hold => break,
            }
        }
        assert!(approx_eq(current, target));
    }

    #[test]
    fn should_respect_device_bounds_when_stepping() {
        let mut capped = area();
        capped.max_setpoint = 22.0;
        let decision = nudge(
            &capped,
            HvacMode::Heat,
            reading(15.0, 21.0),
            Some(22.0),
            &tuning(),
        );
        assert_eq!(decision, SetpointDecision::Hold);
    }

    #[test]
    fn should_apply_bias_to_center() {
        let mut biased = area();
        biased.bias = 1.0;
        assert!((center_setpoint(&biased, 20.0) - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_round_half_away_from_zero() {
        assert!((round_to_step(21.25, 0.5) - 21.5).abs() < f64::EPSILON);
        assert!((round_to_step(21.24, 0.5) - 21.0).abs() < f64::EPSILON);
        assert!((round_to_step(-0.25, 0.5) + 0.5).abs() < f64::EPSILON);
        assert!((round_to_step(21.3, 0.1) - 21.3).abs() < f64::EPSILON);
    }

    #[test]
    fn should_leave_value_untouched_when_step_not_positive() {
        assert!((round_to_step(21.37, 0.0) - 21.37).abs() < f64::EPSILON);
    }

    #[test]
    fn should_use_full_band_when_unwind_disabled() {
        assert!((convergence_fraction(0.1, 0.0) - 1.0).abs() < f64::EPSILON);
        assert!((convergence_fraction(3.0, 2.0) - 1.0).abs() < f64::EPSILON);
        assert!((convergence_fraction(0.5, 2.0) - 0.25).abs() < f64::EPSILON);
    }
}
