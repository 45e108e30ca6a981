//! Validated gait sequences and their builder

use crate::phase::{DeltaPhase, Phase};
use crate::{GaitError, GaitResult};
use hexapod_servo_map::JointId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Name token for a registered gait (e.g. `"forward"`, `"turn_left"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GaitId(String);

impl GaitId {
    /// Creates a gait identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GaitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GaitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An ordered, non-empty, validated list of phases defining one motion.
///
/// Once built, every phase is guaranteed to cover the same joint set, so
/// the sequencer can interpolate without re-checking. `looping` separates
/// run-until-commanded gaits (walking, turning) from one-shot gaits that
/// revert to standby after a single cycle; it is a per-gait flag, never
/// inferred from the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaitSequence {
    id: GaitId,
    phases: Vec<Phase>,
    looping: bool,
    coverage: BTreeSet<JointId>,
}

impl GaitSequence {
    /// The gait's name token.
    pub fn id(&self) -> &GaitId {
        &self.id
    }

    /// Whether the gait repeats until a new mode is selected.
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Number of phases.
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// The phase at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GaitError::IndexOutOfRange`] outside `[0, phase_count)`.
    pub fn phase_at(&self, index: usize) -> GaitResult<&Phase> {
        self.phases.get(index).ok_or_else(|| GaitError::IndexOutOfRange {
            id: self.id.clone(),
            index,
            count: self.phases.len(),
        })
    }

    /// Iterates over the phases in order.
    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.iter()
    }

    /// The joint set every phase covers.
    pub fn joint_coverage(&self) -> &BTreeSet<JointId> {
        &self.coverage
    }
}

enum PhaseSource {
    Absolute(Phase),
    Delta(DeltaPhase),
}

/// Builder assembling a [`GaitSequence`] phase by phase.
///
/// Phases may be absolute snapshots or deltas against the standby baseline;
/// `build` resolves deltas, then validates that every phase covers exactly
/// the baseline's joint set.
pub struct GaitSequenceBuilder {
    id: GaitId,
    looping: bool,
    phases: Vec<PhaseSource>,
}

impl GaitSequenceBuilder {
    /// Starts a builder for the named gait. Gaits default to one-shot.
    pub fn new(id: impl Into<GaitId>) -> Self {
        Self {
            id: id.into(),
            looping: false,
            phases: Vec::new(),
        }
    }

    /// Sets whether the gait loops until a new mode is selected.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Appends an absolute phase.
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phases.push(PhaseSource::Absolute(phase));
        self
    }

    /// Appends a delta phase, resolved against the baseline at build time.
    ///
    /// Deltas apply to the fixed standby baseline, never cumulatively to the
    /// previous phase.
    pub fn delta_phase(mut self, delta: DeltaPhase) -> Self {
        self.phases.push(PhaseSource::Delta(delta));
        self
    }

    /// Resolves and validates the sequence against the standby baseline.
    ///
    /// The baseline supplies both the joint coverage every phase must match
    /// and the base angles for delta phases.
    ///
    /// # Errors
    ///
    /// [`GaitError::EmptySequence`] for a phaseless gait,
    /// [`GaitError::UnknownDeltaJoint`] when a delta moves a joint the
    /// baseline does not have, and [`GaitError::IncompleteCoverage`] when an
    /// absolute phase's joint set differs from the baseline's.
    pub fn build(self, baseline: &Phase) -> GaitResult<GaitSequence> {
        if self.phases.is_empty() {
            return Err(GaitError::EmptySequence { id: self.id });
        }

        let coverage = baseline.joint_set();
        let mut phases = Vec::with_capacity(self.phases.len());

        for (index, source) in self.phases.into_iter().enumerate() {
            let phase = match source {
                PhaseSource::Absolute(phase) => {
                    let set = phase.joint_set();
                    if set != coverage {
                        let missing = coverage.difference(&set).cloned().collect();
                        let unexpected = set.difference(&coverage).cloned().collect();
                        return Err(GaitError::IncompleteCoverage {
                            id: self.id,
                            phase: index,
                            missing,
                            unexpected,
                        });
                    }
                    phase
                }
                PhaseSource::Delta(delta) => {
                    if let Some((joint, _)) =
                        delta.iter().find(|(joint, _)| !coverage.contains(*joint))
                    {
                        return Err(GaitError::UnknownDeltaJoint {
                            id: self.id,
                            phase: index,
                            joint: joint.clone(),
                        });
                    }
                    baseline.with_deltas(&delta)
                }
            };
            phases.push(phase);
        }

        Ok(GaitSequence {
            id: self.id,
            phases,
            looping: self.looping,
            coverage,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::phase::DeltaPhase;

    fn baseline() -> Phase {
        Phase::from_angles([("LFC", 90), ("LFT", 70), ("LFB", 180)])
    }

    fn full_phase(coxa: i16) -> Phase {
        Phase::from_angles([("LFC", coxa), ("LFT", 70), ("LFB", 180)])
    }

    #[test]
    fn test_build_absolute_sequence() {
        let gait = GaitSequenceBuilder::new("forward")
            .looping(true)
            .phase(full_phase(65))
            .phase(full_phase(25))
            .build(&baseline())
            .expect("valid gait");

        assert_eq!(gait.id().as_str(), "forward");
        assert!(gait.looping());
        assert_eq!(gait.phase_count(), 2);
        assert_eq!(gait.joint_coverage(), &baseline().joint_set());
    }

    #[test]
    fn test_phase_at_bounds() {
        let gait = GaitSequenceBuilder::new("test")
            .phase(full_phase(45))
            .build(&baseline())
            .expect("valid gait");

        assert!(gait.phase_at(0).is_ok());
        let err = gait.phase_at(1);
        assert_eq!(
            err,
            Err(GaitError::IndexOutOfRange {
                id: GaitId::new("test"),
                index: 1,
                count: 1,
            })
        );
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = GaitSequenceBuilder::new("empty").build(&baseline());
        assert_eq!(err, Err(GaitError::EmptySequence { id: GaitId::new("empty") }));
    }

    #[test]
    fn test_incomplete_coverage_rejected() {
        let partial = Phase::from_angles([("LFC", 65), ("LFT", 70)]);
        let err = GaitSequenceBuilder::new("bad")
            .phase(partial)
            .build(&baseline());

        match err {
            Err(GaitError::IncompleteCoverage { phase, missing, unexpected, .. }) => {
                assert_eq!(phase, 0);
                assert_eq!(missing, vec![JointId::new("LFB")]);
                assert!(unexpected.is_empty());
            }
            other => panic!("expected IncompleteCoverage, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_joint_rejected() {
        let extra = Phase::from_angles([("LFC", 65), ("LFT", 70), ("LFB", 180), ("ZZZ", 1)]);
        let err = GaitSequenceBuilder::new("bad").phase(extra).build(&baseline());
        assert!(matches!(err, Err(GaitError::IncompleteCoverage { .. })));
    }

    #[test]
    fn test_delta_phases_resolve_against_baseline() {
        // Two delta steps, each relative to standby, not to each other.
        let gait = GaitSequenceBuilder::new("forward")
            .looping(true)
            .delta_phase(DeltaPhase::from_changes([("LFC", -20)]))
            .delta_phase(DeltaPhase::none())
            .delta_phase(DeltaPhase::from_changes([("LFC", 40)]))
            .build(&baseline())
            .expect("valid delta gait");

        let lfc = JointId::new("LFC");
        assert_eq!(gait.phase_at(0).expect("phase 0").angle(&lfc), Some(70));
        assert_eq!(gait.phase_at(1).expect("phase 1").angle(&lfc), Some(90));
        // Not cumulative: 90 + 40, not 70 + 40.
        assert_eq!(gait.phase_at(2).expect("phase 2").angle(&lfc), Some(130));
    }

    #[test]
    fn test_delta_with_unknown_joint_rejected() {
        let err = GaitSequenceBuilder::new("bad")
            .delta_phase(DeltaPhase::from_changes([("ZZZ", 10)]))
            .build(&baseline());
        assert!(matches!(
            err,
            Err(GaitError::UnknownDeltaJoint { phase: 0, .. })
        ));
    }

    #[test]
    fn test_mixed_absolute_and_delta_phases() {
        let gait = GaitSequenceBuilder::new("mixed")
            .phase(full_phase(65))
            .delta_phase(DeltaPhase::from_changes([("LFT", -30)]))
            .build(&baseline())
            .expect("valid gait");

        assert_eq!(gait.phase_count(), 2);
        let lft = JointId::new("LFT");
        assert_eq!(gait.phase_at(1).expect("phase 1").angle(&lft), Some(40));
    }
}
