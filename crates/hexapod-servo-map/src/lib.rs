//! Servo channel mapping and calibration
//!
//! This crate resolves logical joint identifiers to physical PWM output
//! channels and applies per-servo calibration (orientation inversion, trim
//! offset, range clamping). It is the leaf dependency of the hexapod motion
//! stack: gait tables and the sequencer are authored in logical joint angles
//! and only touch hardware coordinates through [`ServoMap`].

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod map;
pub mod pulse;
pub mod types;

pub use map::{ServoEntry, ServoMap};
pub use pulse::PulseRange;
pub use types::{Bank, Calibrated, JointId, LegGroup, LegPosition, Side};

use thiserror::Error;

/// Errors raised while building or querying a [`ServoMap`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServoMapError {
    /// The joint identifier is not registered in the map.
    #[error("unknown joint `{0}`")]
    UnknownJoint(JointId),

    /// Two entries share the same joint identifier.
    #[error("duplicate joint `{0}`")]
    DuplicateJoint(JointId),

    /// Two entries on the same driver bank share a channel number.
    #[error("channel {channel} on the {bank} bank is claimed by both `{first}` and `{second}`")]
    DuplicateChannel {
        /// Driver bank of the conflicting entries.
        bank: Bank,
        /// Conflicting channel number.
        channel: u8,
        /// Joint that registered the channel first.
        first: JointId,
        /// Joint that attempted to register it again.
        second: JointId,
    },
}

/// Result alias for servo-map operations.
pub type ServoMapResult<T> = Result<T, ServoMapError>;
