//! On/off hysteresis for switch actuators.

use serde::{Deserialize, Serialize};

use crate::hvac::HvacMode;
use crate::setpoint::Reading;

/// Command issued to a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchCommand {
    TurnOn,
    TurnOff,
}

/// Decide whether a switch should change state.
///
/// Heating turns on below `desired - deadband` and off above
/// `desired + deadband`; cooling mirrors it. Inside the deadband, or when the
/// switch is already in the wanted state, nothing happens. `Off` never
/// produces a command.
#[must_use]
pub fn switch_action(
    mode: HvacMode,
    reading: Reading,
    deadband: f64,
    is_on: bool,
) -> Option<SwitchCommand> {
    let too_cold = reading.room < reading.desired - deadband;
    let too_warm = reading.room > reading.desired + deadband;
    let (want_on, want_off) = match mode {
        HvacMode::Heat => (too_cold, too_warm),
        HvacMode::Cool => (too_warm, too_cold),
        HvacMode::Off => return None,
    };
    if want_on && !is_on {
        Some(SwitchCommand::TurnOn)
    } else if want_off && is_on {
        Some(SwitchCommand::TurnOff)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(room: f64) -> Reading {
        Reading {
            room,
            desired: 21.0,
        }
    }

    #[test]
    fn should_turn_on_heater_when_room_below_deadband() {
        assert_eq!(
            switch_action(HvacMode::Heat, reading(20.0), 0.5, false),
            Some(SwitchCommand::TurnOn)
        );
    }

    #[test]
    fn should_turn_off_heater_when_room_above_deadband() {
        assert_eq!(
            switch_action(HvacMode::Heat, reading(21.6), 0.5, true),
            Some(SwitchCommand::TurnOff)
        );
    }

    #[test]
    fn should_do_nothing_inside_deadband() {
        assert_eq!(switch_action(HvacMode::Heat, reading(20.6), 0.5, true), None);
        assert_eq!(switch_action(HvacMode::Heat, reading(21.4), 0.5, false), None);
    }

    #[test]
    fn should_not_repeat_command_when_already_in_state() {
        assert_eq!(switch_action(HvacMode::Heat, reading(18.0), 0.5, true), None);
        assert_eq!(switch_action(HvacMode::Heat, reading(25.0), 0.5, false), None);
    }

    #[test]
    fn should_invert_comparisons_in_cool() {
        assert_eq!(
            switch_action(HvacMode::Cool, reading(23.0), 0.5, false),
            Some(SwitchCommand::TurnOn)
        );
        assert_eq!(
            switch_action(HvacMode::Cool, reading(19.0), 0.5, true),
            Some(SwitchCommand::TurnOff)
        );
    }

    #[test]
    fn should_never_command_when_off() {
        assert_eq!(switch_action(HvacMode::Off, reading(10.0), 0.5, false), None);
    }
}
