//! Angle to PCA9685 pulse-count conversion

use serde::{Deserialize, Serialize};

/// PWM pulse configuration for a PCA9685-style driver.
///
/// The driver expresses pulse widths as 12-bit counts per period. The
/// defaults match the firmware configuration: 102 counts for 0 degrees and
/// 512 counts for 180 degrees at a 50 Hz update rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseRange {
    /// Counts for a 0 degree command.
    pub min_counts: u16,
    /// Counts for a 180 degree command.
    pub max_counts: u16,
    /// Servo update frequency in Hz.
    pub freq_hz: u16,
}

impl Default for PulseRange {
    fn default() -> Self {
        Self {
            min_counts: 102,
            max_counts: 512,
            freq_hz: 50,
        }
    }
}

impl PulseRange {
    /// Converts a physical angle in `[0, 180]` to driver counts.
    ///
    /// Linear map with round-half-up; angles above 180 saturate at
    /// `max_counts`.
    pub fn counts_for_angle(&self, angle: u8) -> u16 {
        let angle = u32::from(angle.min(180));
        let span = u32::from(self.max_counts.saturating_sub(self.min_counts));
        let scaled = (angle * span + 90) / 180;
        self.min_counts.saturating_add(scaled as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let range = PulseRange::default();
        assert_eq!(range.counts_for_angle(0), 102);
        assert_eq!(range.counts_for_angle(180), 512);
    }

    #[test]
    fn test_midpoint_rounds_half_up() {
        let range = PulseRange::default();
        // 102 + 410 * 90 / 180 = 307 exactly.
        assert_eq!(range.counts_for_angle(90), 307);
        // 102 + 410 * 1 / 180 = 104.277... rounds to 104.
        assert_eq!(range.counts_for_angle(1), 104);
    }

    #[test]
    fn test_saturates_above_180() {
        let range = PulseRange::default();
        assert_eq!(range.counts_for_angle(200), 512);
    }

    #[test]
    fn test_monotone() {
        let range = PulseRange::default();
        let mut last = 0;
        for angle in 0..=180u8 {
            let counts = range.counts_for_angle(angle);
            assert!(counts >= last, "counts must not decrease at angle {angle}");
            last = counts;
        }
    }
}
