//! Console pulse sink

use hexapod_servo_map::{Bank, PulseRange};
use hexapod_sequencer::PulseSink;
use tracing::info;

/// A [`PulseSink`] that logs every command instead of touching hardware.
///
/// Logs both the physical angle and the PCA9685 counts the driver would be
/// programmed with, so a dry run shows the exact bus traffic.
#[derive(Debug)]
pub struct ConsoleSink {
    pulse: PulseRange,
}

impl ConsoleSink {
    /// A console sink converting counts with the given pulse range.
    pub fn new(pulse: PulseRange) -> Self {
        Self { pulse }
    }
}

impl PulseSink for ConsoleSink {
    fn set_frequency(&mut self, hz: u16) {
        info!(hz, "servo update frequency");
    }

    fn set_pulse(&mut self, bank: Bank, channel: u8, angle: u8) {
        let counts = self.pulse.counts_for_angle(angle);
        info!(%bank, channel, angle, counts, "pulse");
    }
}
