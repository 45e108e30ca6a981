//! Robot definition loading
//!
//! A robot definition file is the JSON counterpart of the firmware's
//! `config.h` (servo table, pulse range, timing) plus its motion tables:
//! one standby pose and any number of named gaits.

use anyhow::{Context, Result};
use hexapod_gait::{GaitConfig, Phase};
use hexapod_sequencer::{MotionTiming, Sequencer};
use hexapod_servo_map::{PulseRange, ServoEntry, ServoMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A complete robot definition as authored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Human-readable robot name.
    pub name: String,
    /// PWM pulse conversion; defaults to the PCA9685 firmware values.
    #[serde(default)]
    pub pulse: PulseRange,
    /// Phase timing; defaults to the firmware's move/delay constants.
    #[serde(default)]
    pub timing: MotionTiming,
    /// One entry per servo.
    pub servos: Vec<ServoEntry>,
    /// The standby pose, covering every servo's joint.
    pub standby: Phase,
    /// Named gait tables.
    #[serde(default)]
    pub gaits: Vec<GaitConfig>,
}

impl RobotConfig {
    /// Reads and parses a definition file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading robot definition {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing robot definition {}", path.display()))
    }

    /// Builds a sequencer with every gait registered.
    ///
    /// All validation happens here: duplicate channels, standby coverage,
    /// per-gait coverage. The original definition is consumed.
    pub fn into_sequencer(self) -> Result<(Sequencer, PulseRange)> {
        let map = ServoMap::from_entries(self.servos)
            .with_context(|| format!("servo table of robot `{}`", self.name))?;
        let mut sequencer = Sequencer::new(map, self.standby.clone(), self.timing)
            .with_context(|| format!("standby pose of robot `{}`", self.name))?;

        for gait in self.gaits {
            let name = gait.name.clone();
            let sequence = gait
                .into_sequence(&self.standby)
                .with_context(|| format!("gait `{name}`"))?;
            sequencer
                .register(sequence)
                .with_context(|| format!("registering gait `{name}`"))?;
        }

        Ok((sequencer, self.pulse))
    }
}
