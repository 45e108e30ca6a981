//! Phase timing configuration

use serde::{Deserialize, Serialize};

/// Timing of one phase, expressed in ticks of the driving clock.
///
/// Corresponds to the firmware's `SERVO_MOVE_TIME` / `MOTION_DELAY` pair:
/// servos interpolate toward the target for `move_duration_ticks`, then the
/// pose dwells for `phase_hold_ticks` before the next phase starts. The
/// defaults are an 800 ms move and a 300 ms dwell at the 20 ms servo tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionTiming {
    /// Ticks spent interpolating toward the phase target.
    pub move_duration_ticks: u32,
    /// Ticks the reached pose dwells before advancing.
    #[serde(default)]
    pub phase_hold_ticks: u32,
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self {
            move_duration_ticks: 40,
            phase_hold_ticks: 15,
        }
    }
}

impl MotionTiming {
    /// Timing with the given move duration and no dwell.
    pub fn with_move_ticks(move_duration_ticks: u32) -> Self {
        Self {
            move_duration_ticks,
            phase_hold_ticks: 0,
        }
    }

    /// Total ticks from phase start to advance.
    pub fn dwell_ticks(&self) -> u32 {
        self.move_duration_ticks.max(1).saturating_add(self.phase_hold_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_firmware_constants() {
        let timing = MotionTiming::default();
        // 800 ms / 20 ms and 300 ms / 20 ms.
        assert_eq!(timing.move_duration_ticks, 40);
        assert_eq!(timing.phase_hold_ticks, 15);
        assert_eq!(timing.dwell_ticks(), 55);
    }

    #[test]
    fn test_zero_move_duration_treated_as_one_tick() {
        let timing = MotionTiming::with_move_ticks(0);
        assert_eq!(timing.dwell_ticks(), 1);
    }
}
