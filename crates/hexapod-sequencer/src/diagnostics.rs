//! Runtime diagnostic counters

/// Counters the sequencer accumulates while running.
///
/// Clamping and rejected selections never interrupt the command path; these
/// counters make them observable so calibration bugs and misbehaving command
/// sources do not go unnoticed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Emitted commands whose calibrated angle had to be clamped to `[0, 180]`.
    pub clamp_events: u64,
    /// Mode selections refused because the gait was not registered.
    pub rejected_selections: u64,
    /// Pulse commands actually written to the sink.
    pub pulses_emitted: u64,
    /// Pulse commands suppressed because the channel already held the angle.
    pub pulses_suppressed: u64,
    /// Full gait cycles completed (final phase reached).
    pub completed_cycles: u64,
}
