//! Tick-driven gait sequencer
//!
//! The sequencer walks a validated gait through time: each tick it
//! interpolates every joint from the committed baseline toward the current
//! phase's target, calibrates the result through the servo map, and emits
//! pulse commands to a [`PulseSink`], but only for channels whose
//! calibrated angle actually changed, so the I2C bus never sees redundant
//! writes.
//!
//! # Timing model
//!
//! One driving clock calls [`Sequencer::tick`] at a fixed cadence. A phase
//! lasts `move_duration_ticks` of interpolation plus `phase_hold_ticks` of
//! dwell, after which the target is committed as the new baseline and the
//! sequencer advances: next phase, wrap-around for looping gaits, or an
//! interpolated return to standby for one-shot gaits.
//!
//! # Mode transition policy
//!
//! [`Sequencer::select_mode`] retargets **immediately from the live
//! interpolated position**: the in-flight angles become the new baseline
//! and the first phase of the new mode becomes the target. Gait changes are
//! therefore responsive rather than waiting for the current phase to
//! finish, and never snap.
//!
//! # Failure model
//!
//! Registration and selection validate everything up front; `tick` reads
//! only validated state and cannot fail. A rejected gait or mode leaves the
//! last good posture untouched.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod commands;
pub mod diagnostics;
pub mod sequencer;
pub mod sink;
pub mod timing;

pub use commands::{command_queue, CommandReceiver, CommandSender};
pub use diagnostics::Diagnostics;
pub use sequencer::{Mode, Sequencer};
pub use sink::{PulseCommand, PulseSink, RecordingSink};
pub use timing::MotionTiming;

use hexapod_gait::GaitId;
use hexapod_servo_map::JointId;
use thiserror::Error;

/// Errors raised at gait-registration or mode-selection time.
///
/// None of these can occur mid-tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequencerError {
    /// `select_mode` named a gait that was never registered.
    #[error("no gait registered under `{0}`")]
    InvalidMode(GaitId),

    /// A gait id was registered twice.
    #[error("gait `{0}` is already registered")]
    DuplicateGait(GaitId),

    /// A gait's joint coverage differs from the servo map's joint set.
    #[error(
        "gait `{id}` does not match the servo map \
         (missing {missing:?}, unexpected {unexpected:?})"
    )]
    CoverageMismatch {
        /// The rejected gait.
        id: GaitId,
        /// Joints the servo map has but the gait does not cover.
        missing: Vec<JointId>,
        /// Joints the gait covers but the servo map does not have.
        unexpected: Vec<JointId>,
    },

    /// The standby pose handed to the constructor does not cover the servo
    /// map's joint set.
    #[error("standby pose does not match the servo map (missing {missing:?}, unexpected {unexpected:?})")]
    StandbyMismatch {
        /// Joints the servo map has but the pose does not cover.
        missing: Vec<JointId>,
        /// Joints the pose covers but the servo map does not have.
        unexpected: Vec<JointId>,
    },
}

/// Result alias for sequencer operations.
pub type SequencerResult<T> = Result<T, SequencerError>;
