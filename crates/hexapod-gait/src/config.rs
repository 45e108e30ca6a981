//! Serde-loadable gait definitions
//!
//! The on-disk format mirrors the firmware's motion tables: a gait is a
//! name, a loop flag, and a list of phases, where each phase is a plain
//! joint-to-angle map. Relative gaits carry joint-to-change maps instead and
//! resolve against the standby pose when converted.

use crate::phase::{DeltaPhase, Phase};
use crate::sequence::{GaitId, GaitSequence, GaitSequenceBuilder};
use crate::GaitResult;
use serde::{Deserialize, Serialize};

/// One gait as authored in a robot definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Gait name, unique within the robot definition.
    pub name: GaitId,
    /// Whether the gait repeats until a new mode is selected.
    #[serde(default)]
    pub looping: bool,
    /// The phase list, absolute or relative.
    #[serde(flatten)]
    pub phases: PhaseTable,
}

/// Absolute or relative phase tables.
///
/// Exactly one of the two keys appears in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseTable {
    /// Full joint-to-angle snapshots.
    #[serde(rename = "phases")]
    Absolute(Vec<Phase>),
    /// Changes layered on the standby baseline, one map per phase.
    #[serde(rename = "delta_phases")]
    Deltas(Vec<DeltaPhase>),
}

impl GaitConfig {
    /// Resolves and validates this definition into a [`GaitSequence`].
    ///
    /// # Errors
    ///
    /// Propagates the builder's validation errors (empty sequence, coverage
    /// mismatch, unknown delta joint).
    pub fn into_sequence(self, baseline: &Phase) -> GaitResult<GaitSequence> {
        let mut builder = GaitSequenceBuilder::new(self.name).looping(self.looping);
        match self.phases {
            PhaseTable::Absolute(phases) => {
                for phase in phases {
                    builder = builder.phase(phase);
                }
            }
            PhaseTable::Deltas(deltas) => {
                for delta in deltas {
                    builder = builder.delta_phase(delta);
                }
            }
        }
        builder.build(baseline)
    }
}
