//! Phase and delta-phase representations

use hexapod_servo_map::JointId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One target-angle snapshot: a total mapping from joint to angle.
///
/// Angles are authored in logical degrees with a nominal `[0, 180]` domain.
/// Out-of-range values are representable (the firmware tables contain a few)
/// and clamp at calibration time with a diagnostic, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Phase {
    angles: BTreeMap<JointId, i16>,
}

impl Phase {
    /// Builds a phase from `(joint, angle)` pairs.
    pub fn from_angles<J: Into<JointId>>(angles: impl IntoIterator<Item = (J, i16)>) -> Self {
        Self {
            angles: angles.into_iter().map(|(j, a)| (j.into(), a)).collect(),
        }
    }

    /// Target angle for a joint, if the phase assigns one.
    pub fn angle(&self, joint: &JointId) -> Option<i16> {
        self.angles.get(joint).copied()
    }

    /// Iterates over `(joint, angle)` assignments in joint order.
    pub fn iter(&self) -> impl Iterator<Item = (&JointId, i16)> {
        self.angles.iter().map(|(j, &a)| (j, a))
    }

    /// The set of joints this phase assigns.
    pub fn joint_set(&self) -> BTreeSet<JointId> {
        self.angles.keys().cloned().collect()
    }

    /// Number of joints assigned.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    /// True when no joints are assigned.
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Resolves a delta phase against this phase as the fixed baseline.
    ///
    /// Every joint of the baseline appears in the result; joints the delta
    /// does not mention keep their baseline angle. Deltas always apply to
    /// the baseline, never to a previous phase's result. Sums saturate at
    /// the `i16` bounds.
    pub fn with_deltas(&self, delta: &DeltaPhase) -> Phase {
        let angles = self
            .angles
            .iter()
            .map(|(joint, &base)| {
                let change = delta.change(joint).unwrap_or(0);
                (joint.clone(), base.saturating_add(change))
            })
            .collect();
        Phase { angles }
    }
}

impl FromIterator<(JointId, i16)> for Phase {
    fn from_iter<T: IntoIterator<Item = (JointId, i16)>>(iter: T) -> Self {
        Self {
            angles: iter.into_iter().collect(),
        }
    }
}

/// A partial angle-change snapshot, relative to the standby baseline.
///
/// Mirrors the firmware's `ServoMove` tables: joints absent from a delta
/// phase mean "no change from standby".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DeltaPhase {
    changes: BTreeMap<JointId, i16>,
}

impl DeltaPhase {
    /// Builds a delta phase from `(joint, change)` pairs.
    pub fn from_changes<J: Into<JointId>>(changes: impl IntoIterator<Item = (J, i16)>) -> Self {
        Self {
            changes: changes.into_iter().map(|(j, c)| (j.into(), c)).collect(),
        }
    }

    /// An all-zero delta: the resolved phase is the baseline itself.
    pub fn none() -> Self {
        Self::default()
    }

    /// The change for a joint, if one is authored.
    pub fn change(&self, joint: &JointId) -> Option<i16> {
        self.changes.get(joint).copied()
    }

    /// Iterates over authored `(joint, change)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&JointId, i16)> {
        self.changes.iter().map(|(j, &c)| (j, c))
    }
}
