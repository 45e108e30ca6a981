//! PWM driver collaborator interface

use hexapod_servo_map::Bank;

/// The PWM driver collaborator.
///
/// The sequencer is the single writer: nothing else commands channels, so
/// implementations need no locking. `set_pulse` is only invoked when a
/// channel's calibrated target changed since the previous emission.
pub trait PulseSink {
    /// Programs the servo update frequency. Called once at startup.
    fn set_frequency(&mut self, hz: u16);

    /// Commands one channel to the given physical angle in `[0, 180]`.
    fn set_pulse(&mut self, bank: Bank, channel: u8, angle: u8);
}

/// One emitted pulse command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseCommand {
    /// Driver bank.
    pub bank: Bank,
    /// Channel on that bank.
    pub channel: u8,
    /// Physical angle in degrees.
    pub angle: u8,
}

/// A [`PulseSink`] that records every command, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frequency: Option<u16>,
    pulses: Vec<PulseCommand>,
}

impl RecordingSink {
    /// An empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The programmed update frequency, if any.
    pub fn frequency(&self) -> Option<u16> {
        self.frequency
    }

    /// All recorded pulses in emission order.
    pub fn pulses(&self) -> &[PulseCommand] {
        &self.pulses
    }

    /// The most recent angle commanded on a channel.
    pub fn last_angle(&self, bank: Bank, channel: u8) -> Option<u8> {
        self.pulses
            .iter()
            .rev()
            .find(|p| p.bank == bank && p.channel == channel)
            .map(|p| p.angle)
    }

    /// Forgets recorded pulses, keeping the frequency.
    pub fn clear(&mut self) {
        self.pulses.clear();
    }
}

impl PulseSink for RecordingSink {
    fn set_frequency(&mut self, hz: u16) {
        self.frequency = Some(hz);
    }

    fn set_pulse(&mut self, bank: Bank, channel: u8, angle: u8) {
        self.pulses.push(PulseCommand { bank, channel, angle });
    }
}
