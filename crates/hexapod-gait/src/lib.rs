//! Gait phase tables for hexapod locomotion
//!
//! A gait is an ordered, non-empty list of phases; a phase assigns one
//! target angle to every joint of the robot. This crate holds the phase
//! representation, the builder that validates joint coverage at
//! construction time, and the serde-loadable definition format.
//!
//! Gait tables are pure data: they carry no timing and issue no commands.
//! The sequencer crate walks them through time.
//!
//! # Example
//!
//! ```
//! use hexapod_gait::{GaitSequenceBuilder, Phase};
//!
//! let standby = Phase::from_angles([("LFC", 90), ("LFT", 70)]);
//! let step = Phase::from_angles([("LFC", 45), ("LFT", 50)]);
//!
//! let gait = GaitSequenceBuilder::new("forward")
//!     .looping(true)
//!     .phase(step)
//!     .phase(standby.clone())
//!     .build(&standby)?;
//!
//! assert_eq!(gait.phase_count(), 2);
//! # Ok::<(), hexapod_gait::GaitError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod phase;
pub mod sequence;

pub use config::{GaitConfig, PhaseTable};
pub use phase::{DeltaPhase, Phase};
pub use sequence::{GaitId, GaitSequence, GaitSequenceBuilder};

use hexapod_servo_map::JointId;
use thiserror::Error;

/// Errors raised while building or indexing gait sequences.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GaitError {
    /// A gait definition contained no phases.
    #[error("gait `{id}` has no phases")]
    EmptySequence {
        /// The offending gait.
        id: GaitId,
    },

    /// A phase index outside `[0, phase_count)` was requested.
    #[error("phase index {index} out of range for gait `{id}` ({count} phases)")]
    IndexOutOfRange {
        /// The gait being indexed.
        id: GaitId,
        /// The requested index.
        index: usize,
        /// Number of phases in the gait.
        count: usize,
    },

    /// A phase's joint set differs from the expected coverage.
    ///
    /// Every phase must assign an angle to exactly the robot's joint set; a
    /// joint absent from a phase is an authoring error.
    #[error(
        "phase {phase} of gait `{id}` does not cover the joint set \
         (missing {missing:?}, unexpected {unexpected:?})"
    )]
    IncompleteCoverage {
        /// The offending gait.
        id: GaitId,
        /// Index of the offending phase.
        phase: usize,
        /// Joints the phase should assign but does not.
        missing: Vec<JointId>,
        /// Joints the phase assigns that the robot does not have.
        unexpected: Vec<JointId>,
    },

    /// A delta phase references a joint absent from the standby baseline.
    #[error("delta phase {phase} of gait `{id}` moves unknown joint `{joint}`")]
    UnknownDeltaJoint {
        /// The offending gait.
        id: GaitId,
        /// Index of the offending delta phase.
        phase: usize,
        /// The unresolvable joint.
        joint: JointId,
    },
}

/// Result alias for gait operations.
pub type GaitResult<T> = Result<T, GaitError>;
