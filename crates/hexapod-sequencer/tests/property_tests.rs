//! Property tests for interpolation and cycle invariants.

#![allow(clippy::expect_used)]

use hexapod_gait::{GaitSequenceBuilder, Phase};
use hexapod_sequencer::{Mode, MotionTiming, RecordingSink, Sequencer};
use hexapod_servo_map::{Bank, ServoEntry, ServoMap};
use proptest::prelude::*;

fn single_joint(standby_angle: i16, move_ticks: u32) -> Sequencer {
    let map =
        ServoMap::from_entries([ServoEntry::new("LFC", Bank::Left, 0)]).expect("valid map");
    let standby = Phase::from_angles([("LFC", standby_angle)]);
    Sequencer::new(map, standby, MotionTiming::with_move_ticks(move_ticks))
        .expect("valid setup")
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(128))]

    /// Within one move, every emitted angle stays inside the corridor
    /// between the start and target angles: no overshoot at any t.
    #[test]
    fn prop_no_overshoot(
        start in 0i16..=180i16,
        target in 0i16..=180i16,
        move_ticks in 1u32..=60u32,
    ) {
        let mut seq = single_joint(start, move_ticks);
        let baseline = Phase::from_angles([("LFC", start)]);
        let gait = GaitSequenceBuilder::new("move")
            .looping(true)
            .phase(Phase::from_angles([("LFC", target)]))
            .build(&baseline)
            .expect("valid gait");
        seq.register(gait).expect("registers");
        seq.select_mode(Mode::Gait("move".into())).expect("selects");

        let lo = start.min(target) as u8;
        let hi = start.max(target) as u8;
        let mut sink = RecordingSink::new();
        for _ in 0..move_ticks {
            seq.tick(&mut sink);
        }
        for pulse in sink.pulses() {
            prop_assert!(
                (lo..=hi).contains(&pulse.angle),
                "angle {} escaped corridor [{lo}, {hi}]",
                pulse.angle
            );
        }
        // And the endpoint is exact.
        prop_assert_eq!(sink.last_angle(Bank::Left, 0), Some(target as u8));
    }

    /// Interpolation toward a single target never reverses direction.
    #[test]
    fn prop_interpolation_monotone(
        start in 0i16..=180i16,
        target in 0i16..=180i16,
        move_ticks in 1u32..=60u32,
    ) {
        let mut seq = single_joint(start, move_ticks);
        let baseline = Phase::from_angles([("LFC", start)]);
        let gait = GaitSequenceBuilder::new("move")
            .looping(true)
            .phase(Phase::from_angles([("LFC", target)]))
            .build(&baseline)
            .expect("valid gait");
        seq.register(gait).expect("registers");
        seq.select_mode(Mode::Gait("move".into())).expect("selects");

        let mut sink = RecordingSink::new();
        for _ in 0..move_ticks {
            seq.tick(&mut sink);
        }
        let descending = target < start;
        for pair in sink.pulses().windows(2) {
            if descending {
                prop_assert!(pair[1].angle <= pair[0].angle);
            } else {
                prop_assert!(pair[1].angle >= pair[0].angle);
            }
        }
    }

    /// For a looping gait with N phases, the committed state at a cycle
    /// boundary recurs after every further N phase completions.
    #[test]
    fn prop_cycle_closure(
        angles in proptest::collection::vec(0i16..=180i16, 2..5),
        move_ticks in 1u32..=10u32,
        cycles in 1u32..=3u32,
    ) {
        let mut seq = single_joint(90, move_ticks);
        let baseline = Phase::from_angles([("LFC", 90)]);
        let mut builder = GaitSequenceBuilder::new("loop").looping(true);
        for &angle in &angles {
            builder = builder.phase(Phase::from_angles([("LFC", angle)]));
        }
        let gait = builder.build(&baseline).expect("valid gait");
        seq.register(gait).expect("registers");
        seq.select_mode(Mode::Gait("loop".into())).expect("selects");

        let mut sink = RecordingSink::new();
        // Finish the transition move onto the cycle.
        for _ in 0..move_ticks {
            seq.tick(&mut sink);
        }
        let at_boundary = seq.live_angles();

        let ticks_per_cycle = move_ticks * angles.len() as u32;
        for _ in 0..cycles {
            for _ in 0..ticks_per_cycle {
                seq.tick(&mut sink);
            }
            prop_assert_eq!(&seq.live_angles(), &at_boundary);
        }
    }
}
