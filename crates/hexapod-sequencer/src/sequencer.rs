//! The tick-driven gait state machine

use crate::diagnostics::Diagnostics;
use crate::sink::PulseSink;
use crate::timing::MotionTiming;
use crate::{SequencerError, SequencerResult};
use hexapod_gait::{GaitId, GaitSequence, Phase};
use hexapod_servo_map::{Bank, JointId, ServoMap};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, trace, warn};

/// The commanded motion mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Hold the standby pose.
    Standby,
    /// Run the named registered gait.
    Gait(GaitId),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Standby => f.write_str("standby"),
            Mode::Gait(id) => write!(f, "{id}"),
        }
    }
}

/// Where the sequencer currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Moving toward, or holding, the standby pose.
    Standby,
    /// First move of a freshly selected gait, toward its phase 0.
    Transitioning { id: GaitId },
    /// Walking a gait's phases.
    Running { id: GaitId, phase: usize },
}

/// Drives joints through registered gait tables at a fixed tick rate.
///
/// See the crate docs for the timing and transition model. The sequencer
/// owns all mutable motion state; external command sources reach it through
/// [`select_mode`](Sequencer::select_mode) or the
/// [`commands`](crate::commands) queue drained at tick boundaries.
#[derive(Debug)]
pub struct Sequencer {
    map: ServoMap,
    standby: Phase,
    gaits: BTreeMap<GaitId, GaitSequence>,
    timing: MotionTiming,
    state: State,
    /// Baseline angles interpolation starts from, per joint.
    committed: BTreeMap<JointId, i16>,
    /// Ticks elapsed in the current move (capped at the dwell length).
    elapsed: u32,
    /// Last calibrated angle written per channel, for redundancy suppression.
    last_emitted: BTreeMap<(Bank, u8), u8>,
    diagnostics: Diagnostics,
}

impl Sequencer {
    /// Creates a sequencer holding the standby pose.
    ///
    /// The first ticks interpolate from the standby pose to itself, which
    /// pushes the pose to every channel exactly once, matching the
    /// move-to-standby the firmware performs at power-on.
    ///
    /// # Errors
    ///
    /// [`SequencerError::StandbyMismatch`] when the pose's joint set
    /// differs from the servo map's.
    pub fn new(map: ServoMap, standby: Phase, timing: MotionTiming) -> SequencerResult<Self> {
        let expected = map.joint_set();
        let actual = standby.joint_set();
        if actual != expected {
            return Err(SequencerError::StandbyMismatch {
                missing: expected.difference(&actual).cloned().collect(),
                unexpected: actual.difference(&expected).cloned().collect(),
            });
        }

        let committed = standby.iter().map(|(j, a)| (j.clone(), a)).collect();
        Ok(Self {
            map,
            standby,
            gaits: BTreeMap::new(),
            timing,
            state: State::Standby,
            committed,
            elapsed: 0,
            last_emitted: BTreeMap::new(),
            diagnostics: Diagnostics::default(),
        })
    }

    /// Registers a gait for later selection.
    ///
    /// # Errors
    ///
    /// [`SequencerError::DuplicateGait`] when the id is taken and
    /// [`SequencerError::CoverageMismatch`] when the gait's joint coverage
    /// differs from the servo map's joint set. A rejected gait changes
    /// nothing.
    pub fn register(&mut self, gait: GaitSequence) -> SequencerResult<()> {
        if self.gaits.contains_key(gait.id()) {
            return Err(SequencerError::DuplicateGait(gait.id().clone()));
        }

        let expected = self.map.joint_set();
        let coverage = gait.joint_coverage();
        if coverage != &expected {
            return Err(SequencerError::CoverageMismatch {
                id: gait.id().clone(),
                missing: expected.difference(coverage).cloned().collect(),
                unexpected: coverage.difference(&expected).cloned().collect(),
            });
        }

        debug!(gait = %gait.id(), phases = gait.phase_count(), looping = gait.looping(), "registered gait");
        self.gaits.insert(gait.id().clone(), gait);
        Ok(())
    }

    /// The currently commanded mode.
    ///
    /// A one-shot gait that has finished reports `Standby`.
    pub fn mode(&self) -> Mode {
        match &self.state {
            State::Standby => Mode::Standby,
            State::Transitioning { id } | State::Running { id, .. } => Mode::Gait(id.clone()),
        }
    }

    /// Accumulated diagnostic counters.
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Names of all registered gaits.
    pub fn registered_gaits(&self) -> impl Iterator<Item = &GaitId> {
        self.gaits.keys()
    }

    /// Commands a mode change.
    ///
    /// Selecting the active mode is a no-op. Otherwise the sequencer
    /// retargets immediately: the live interpolated angles become the new
    /// committed baseline and the new mode's first phase becomes the
    /// target, so a mid-phase switch neither waits nor snaps.
    ///
    /// # Errors
    ///
    /// [`SequencerError::InvalidMode`] when the gait is not registered; the
    /// prior state is left untouched.
    pub fn select_mode(&mut self, mode: Mode) -> SequencerResult<()> {
        if mode == self.mode() {
            trace!(%mode, "mode already active");
            return Ok(());
        }

        if let Mode::Gait(id) = &mode {
            if !self.gaits.contains_key(id) {
                self.diagnostics.rejected_selections += 1;
                warn!(gait = %id, "rejected selection of unregistered gait");
                return Err(SequencerError::InvalidMode(id.clone()));
            }
        }

        info!(from = %self.mode(), to = %mode, "mode change");
        self.committed = self.live_angles();
        self.elapsed = 0;
        self.state = match mode {
            Mode::Standby => State::Standby,
            Mode::Gait(id) => State::Transitioning { id },
        };
        Ok(())
    }

    /// Advances the sequencer by one tick of the driving clock.
    ///
    /// Interpolates every joint toward the current target, calibrates, and
    /// emits a pulse for each channel whose calibrated angle changed. On
    /// reaching the end of a phase's dwell, commits the target as the new
    /// baseline and advances per the gait's loop flag. Never fails; tick
    /// reads only state validated at registration/selection time.
    pub fn tick<S: PulseSink>(&mut self, sink: &mut S) {
        let move_ticks = self.timing.move_duration_ticks.max(1);
        let dwell = self.timing.dwell_ticks();

        self.elapsed = self.elapsed.saturating_add(1).min(dwell);
        let progress = self.elapsed.min(move_ticks);

        let target = match &self.state {
            State::Standby => Some(&self.standby),
            State::Transitioning { id } => {
                self.gaits.get(id).and_then(|g| g.phase_at(0).ok())
            }
            State::Running { id, phase } => {
                self.gaits.get(id).and_then(|g| g.phase_at(*phase).ok())
            }
        };
        // State is validated before it is entered.
        let Some(target) = target else { return };

        for entry in self.map.entries() {
            let Some(raw_target) = target.angle(&entry.joint) else {
                continue;
            };
            let base = self
                .committed
                .get(&entry.joint)
                .copied()
                .unwrap_or(raw_target);
            let raw = lerp_round_half_up(base, raw_target, progress, move_ticks);
            let cal = entry.calibrate(raw);

            let key = (entry.bank, entry.channel);
            if self.last_emitted.get(&key) == Some(&cal.angle) {
                self.diagnostics.pulses_suppressed += 1;
                continue;
            }
            if cal.clamped {
                self.diagnostics.clamp_events += 1;
                trace!(joint = %entry.joint, raw, "clamped out-of-range command");
            }
            sink.set_pulse(entry.bank, entry.channel, cal.angle);
            self.last_emitted.insert(key, cal.angle);
            self.diagnostics.pulses_emitted += 1;
        }

        if self.elapsed >= dwell {
            self.complete_move();
        }
    }

    /// Drains any pending mode commands, then ticks. See
    /// [`commands`](crate::commands).
    pub fn tick_with_commands<S: PulseSink>(
        &mut self,
        commands: &crate::commands::CommandReceiver,
        sink: &mut S,
    ) {
        self.drain_commands(commands);
        self.tick(sink);
    }

    /// The interpolated angles the robot is commanded to right now.
    ///
    /// At `elapsed == 0` this is exactly the committed baseline; at
    /// `elapsed >= move_duration` it is exactly the target phase.
    pub fn live_angles(&self) -> BTreeMap<JointId, i16> {
        let move_ticks = self.timing.move_duration_ticks.max(1);
        let progress = self.elapsed.min(move_ticks);

        let target = match &self.state {
            State::Standby => Some(&self.standby),
            State::Transitioning { id } => {
                self.gaits.get(id).and_then(|g| g.phase_at(0).ok())
            }
            State::Running { id, phase } => {
                self.gaits.get(id).and_then(|g| g.phase_at(*phase).ok())
            }
        };

        self.committed
            .iter()
            .map(|(joint, &base)| {
                let raw_target = target.and_then(|t| t.angle(joint)).unwrap_or(base);
                (
                    joint.clone(),
                    lerp_round_half_up(base, raw_target, progress, move_ticks),
                )
            })
            .collect()
    }

    /// Commits the reached target and advances the state machine.
    fn complete_move(&mut self) {
        self.commit_target();
        match self.state.clone() {
            State::Standby => {
                // Single fixed pose, held indefinitely; elapsed stays pinned
                // so interpolation keeps yielding the pose.
            }
            State::Transitioning { id } => self.advance(id, 0),
            State::Running { id, phase } => self.advance(id, phase),
        }
    }

    fn commit_target(&mut self) {
        let target = match &self.state {
            State::Standby => Some(self.standby.clone()),
            State::Transitioning { id } => self
                .gaits
                .get(id)
                .and_then(|g| g.phase_at(0).ok())
                .cloned(),
            State::Running { id, phase } => self
                .gaits
                .get(id)
                .and_then(|g| g.phase_at(*phase).ok())
                .cloned(),
        };
        if let Some(target) = target {
            self.committed = target.iter().map(|(j, a)| (j.clone(), a)).collect();
        }
    }

    /// Picks the phase after `completed` for the given gait.
    fn advance(&mut self, id: GaitId, completed: usize) {
        let Some(gait) = self.gaits.get(&id) else { return };

        if completed + 1 < gait.phase_count() {
            self.state = State::Running { id, phase: completed + 1 };
        } else {
            self.diagnostics.completed_cycles += 1;
            if gait.looping() {
                self.state = State::Running { id, phase: 0 };
            } else {
                // One-shot gait: one interpolated move back to standby,
                // then hold.
                debug!(gait = %id, "one-shot gait finished, reverting to standby");
                self.state = State::Standby;
            }
        }
        self.elapsed = 0;
    }
}

/// Linear interpolation in integer degrees, round-half-up.
///
/// `den > 0`, `num <= den`. Exact at the endpoints: `num == 0` yields
/// `from`, `num == den` yields `to`.
fn lerp_round_half_up(from: i16, to: i16, num: u32, den: u32) -> i16 {
    let delta = i64::from(to) - i64::from(from);
    let scaled = delta * i64::from(num);
    let den = i64::from(den);
    let rounded = (2 * scaled + den).div_euclid(2 * den);
    (i64::from(from) + rounded) as i16
}
