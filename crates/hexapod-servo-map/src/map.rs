//! Joint lookup and per-servo calibration

use crate::types::{Bank, Calibrated, JointId};
use crate::{ServoMapError, ServoMapResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Angle clamp bounds, degrees.
const ANGLE_MIN: i32 = 0;
const ANGLE_MAX: i32 = 180;

/// One servo's hardware mapping and calibration record.
///
/// Created once from static configuration at startup; never mutated at
/// runtime. Inversion and offset absorb how the servo is physically mounted
/// so that gait tables can be authored in consistent logical angles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoEntry {
    /// Logical joint this servo actuates.
    pub joint: JointId,
    /// Driver bank the servo is wired to.
    pub bank: Bank,
    /// PWM channel on that bank.
    pub channel: u8,
    /// Whether the servo horn is mounted mirrored.
    #[serde(default)]
    pub inverted: bool,
    /// Trim offset in degrees, added after inversion.
    #[serde(default)]
    pub offset: i16,
}

impl ServoEntry {
    /// Creates an entry with no inversion and zero offset.
    pub fn new(joint: impl Into<JointId>, bank: Bank, channel: u8) -> Self {
        Self {
            joint: joint.into(),
            bank,
            channel,
            inverted: false,
            offset: 0,
        }
    }

    /// Marks the servo as mirrored.
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// Sets the trim offset in degrees.
    pub fn with_offset(mut self, offset: i16) -> Self {
        self.offset = offset;
        self
    }

    /// Maps a raw logical angle to the physical angle for this servo.
    ///
    /// Applies inversion (`180 - raw`), then the trim offset, then clamps to
    /// `[0, 180]`. Clamping is silent; the returned flag reports it.
    ///
    /// Computed in `i32` so that extreme authored angles clamp instead of
    /// overflowing.
    pub fn calibrate(&self, raw: i16) -> Calibrated {
        let raw = i32::from(raw);
        let oriented = if self.inverted { 180 - raw } else { raw };
        let shifted = oriented + i32::from(self.offset);
        let clamped = !(ANGLE_MIN..=ANGLE_MAX).contains(&shifted);
        Calibrated {
            angle: shifted.clamp(ANGLE_MIN, ANGLE_MAX) as u8,
            clamped,
        }
    }
}

/// Joint-to-channel lookup table for the whole robot.
///
/// Built once from a list of [`ServoEntry`] records. Construction rejects
/// duplicate joint ids and duplicate `(bank, channel)` pairs; after that the
/// map is immutable and every lookup either resolves or fails with
/// [`ServoMapError::UnknownJoint`].
#[derive(Debug, Clone)]
pub struct ServoMap {
    entries: BTreeMap<JointId, ServoEntry>,
}

impl ServoMap {
    /// Builds a servo map from configuration records.
    ///
    /// # Errors
    ///
    /// Returns [`ServoMapError::DuplicateJoint`] if two entries name the
    /// same joint and [`ServoMapError::DuplicateChannel`] if two entries on
    /// the same bank claim the same channel.
    pub fn from_entries(entries: impl IntoIterator<Item = ServoEntry>) -> ServoMapResult<Self> {
        let mut by_joint = BTreeMap::new();
        let mut by_channel: BTreeMap<(Bank, u8), JointId> = BTreeMap::new();

        for entry in entries {
            if let Some(first) = by_channel.get(&(entry.bank, entry.channel)) {
                return Err(ServoMapError::DuplicateChannel {
                    bank: entry.bank,
                    channel: entry.channel,
                    first: first.clone(),
                    second: entry.joint,
                });
            }
            by_channel.insert((entry.bank, entry.channel), entry.joint.clone());

            if by_joint.contains_key(&entry.joint) {
                return Err(ServoMapError::DuplicateJoint(entry.joint));
            }
            by_joint.insert(entry.joint.clone(), entry);
        }

        Ok(Self { entries: by_joint })
    }

    /// Resolves a joint to its hardware entry.
    ///
    /// # Errors
    ///
    /// Returns [`ServoMapError::UnknownJoint`] if the joint is not registered.
    pub fn resolve(&self, joint: &JointId) -> ServoMapResult<&ServoEntry> {
        self.entries
            .get(joint)
            .ok_or_else(|| ServoMapError::UnknownJoint(joint.clone()))
    }

    /// Calibrates a raw angle for the given joint.
    ///
    /// # Errors
    ///
    /// Returns [`ServoMapError::UnknownJoint`] if the joint is not registered.
    pub fn calibrate(&self, joint: &JointId, raw: i16) -> ServoMapResult<Calibrated> {
        Ok(self.resolve(joint)?.calibrate(raw))
    }

    /// Iterates over all entries in joint-id order.
    pub fn entries(&self) -> impl Iterator<Item = &ServoEntry> {
        self.entries.values()
    }

    /// The full set of registered joints.
    pub fn joint_set(&self) -> BTreeSet<JointId> {
        self.entries.keys().cloned().collect()
    }

    /// Number of registered servos.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no servos are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn small_map() -> ServoMap {
        ServoMap::from_entries([
            ServoEntry::new("LFC", Bank::Left, 1),
            ServoEntry::new("LBT", Bank::Left, 9).inverted().with_offset(20),
            ServoEntry::new("RFC", Bank::Right, 2).inverted(),
            ServoEntry::new("LMF", Bank::Left, 4).with_offset(33),
        ])
        .expect("valid map")
    }

    #[test]
    fn test_resolve_known_joint() {
        let map = small_map();
        let entry = map.resolve(&JointId::new("LBT")).expect("LBT registered");
        assert_eq!(entry.channel, 9);
        assert!(entry.inverted);
        assert_eq!(entry.offset, 20);
    }

    #[test]
    fn test_resolve_unknown_joint() {
        let map = small_map();
        let err = map.resolve(&JointId::new("XXX"));
        assert_eq!(err, Err(ServoMapError::UnknownJoint(JointId::new("XXX"))));
    }

    #[test]
    fn test_calibrate_plain() {
        let map = small_map();
        let cal = map.calibrate(&JointId::new("LFC"), 90).expect("known joint");
        assert_eq!(cal, Calibrated { angle: 90, clamped: false });
    }

    #[test]
    fn test_calibrate_inverted_with_offset() {
        // (180 - 45) + 10 = 145: inside range, no clamp.
        let entry = ServoEntry::new("LFC", Bank::Left, 0).inverted().with_offset(10);
        let cal = entry.calibrate(45);
        assert_eq!(cal, Calibrated { angle: 145, clamped: false });
    }

    #[test]
    fn test_calibrate_clamps_authoring_bug() {
        // Raw 190 with zero offset clamps to 180 and reports it.
        let entry = ServoEntry::new("LFC", Bank::Left, 0);
        let cal = entry.calibrate(190);
        assert_eq!(cal, Calibrated { angle: 180, clamped: true });
    }

    #[test]
    fn test_calibrate_clamps_below_zero() {
        // The backward gait tables author -20 for coxa joints.
        let entry = ServoEntry::new("RBC", Bank::Right, 8);
        let cal = entry.calibrate(-20);
        assert_eq!(cal, Calibrated { angle: 0, clamped: true });
    }

    #[test]
    fn test_calibrate_extreme_angles_saturate() {
        // Arithmetic must clamp, not overflow, at the edges of i16.
        let inverted = ServoEntry::new("LFC", Bank::Left, 0).inverted();
        assert_eq!(inverted.calibrate(-32700), Calibrated { angle: 180, clamped: true });
        assert_eq!(inverted.calibrate(i16::MIN), Calibrated { angle: 180, clamped: true });

        let pushed_up = ServoEntry::new("LFC", Bank::Left, 0).with_offset(i16::MAX);
        assert_eq!(pushed_up.calibrate(i16::MAX), Calibrated { angle: 180, clamped: true });

        let pushed_down = ServoEntry::new("LFC", Bank::Left, 0).with_offset(i16::MIN);
        assert_eq!(pushed_down.calibrate(i16::MIN), Calibrated { angle: 0, clamped: true });
    }

    #[test]
    fn test_offset_applied_after_inversion() {
        let entry = ServoEntry::new("LBT", Bank::Left, 9).inverted().with_offset(20);
        // (180 - 90) + 20 = 110, not (180 - (90 + 20)).
        assert_eq!(entry.calibrate(90).angle, 110);
    }

    #[test]
    fn test_duplicate_joint_rejected() {
        let result = ServoMap::from_entries([
            ServoEntry::new("LFC", Bank::Left, 1),
            ServoEntry::new("LFC", Bank::Left, 2),
        ]);
        assert_eq!(result.err(), Some(ServoMapError::DuplicateJoint(JointId::new("LFC"))));
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let result = ServoMap::from_entries([
            ServoEntry::new("LFC", Bank::Left, 1),
            ServoEntry::new("LFT", Bank::Left, 1),
        ]);
        assert!(matches!(
            result,
            Err(ServoMapError::DuplicateChannel { channel: 1, .. })
        ));
    }

    #[test]
    fn test_same_channel_on_other_bank_allowed() {
        // The two driver boards each have their own channel 0.
        let map = ServoMap::from_entries([
            ServoEntry::new("LFB", Bank::Left, 0),
            ServoEntry::new("RFB", Bank::Right, 0),
        ]);
        assert!(map.is_ok());
    }

    #[test]
    fn test_joint_set() {
        let map = small_map();
        let set = map.joint_set();
        assert_eq!(set.len(), 4);
        assert!(set.contains(&JointId::new("RFC")));
    }

    #[test]
    fn test_entry_serde_defaults() {
        let entry: ServoEntry =
            serde_json::from_str(r#"{"joint":"LFC","bank":"left","channel":1}"#)
                .expect("defaults fill in");
        assert!(!entry.inverted);
        assert_eq!(entry.offset, 0);
    }
}
