//! Joint identifier and bank type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical joint identifier
///
/// A short token naming one servo-actuated degree of freedom, unique across
/// the whole robot (e.g. `"LFC"` for the left-front coxa). Joint ids are
/// immutable once defined; gait tables and the servo map refer to joints
/// exclusively through this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointId(String);

impl JointId {
    /// Creates a joint identifier from a short token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies this joint into one of the six legs.
    ///
    /// The convention follows the firmware id scheme: the first character is
    /// the side (`L`/`R`), the second the leg position (`F` front, `M` mid,
    /// `B` or `R` rear). Returns `None` for identifiers outside the scheme.
    pub fn leg_group(&self) -> Option<LegGroup> {
        let mut chars = self.0.chars();
        let side = match chars.next()? {
            'L' => Side::Left,
            'R' => Side::Right,
            _ => return None,
        };
        let position = match chars.next()? {
            'F' => LegPosition::Front,
            'M' => LegPosition::Mid,
            'B' | 'R' => LegPosition::Rear,
            _ => return None,
        };
        Some(LegGroup { side, position })
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JointId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Physical PWM driver bank
///
/// The robot spans two PCA9685 driver boards, one per side. Channel numbers
/// are only unique within a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    /// Left-side driver board (PCA1).
    Left,
    /// Right-side driver board (PCA2).
    Right,
}

impl Bank {
    /// I2C address of the driver board for this bank.
    pub fn address(self) -> u8 {
        match self {
            Bank::Left => 0x40,
            Bank::Right => 0x42,
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bank::Left => f.write_str("left"),
            Bank::Right => f.write_str("right"),
        }
    }
}

/// Robot side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Left side.
    Left,
    /// Right side.
    Right,
}

/// Leg position along the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegPosition {
    /// Front leg pair.
    Front,
    /// Mid leg pair.
    Mid,
    /// Rear leg pair.
    Rear,
}

/// One of the six legs, identified by side and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegGroup {
    /// Which side of the body the leg is on.
    pub side: Side,
    /// Where along the body the leg sits.
    pub position: LegPosition,
}

/// Result of calibrating a raw angle.
///
/// The `clamped` flag is the observable diagnostic for out-of-range
/// commands: clamping itself is silent, but callers that care (the
/// sequencer's diagnostics counters, authoring tools) can detect it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibrated {
    /// Physical angle in `[0, 180]` degrees, after inversion, offset and clamp.
    pub angle: u8,
    /// True when the inverted/offset angle fell outside `[0, 180]`.
    pub clamped: bool,
}
