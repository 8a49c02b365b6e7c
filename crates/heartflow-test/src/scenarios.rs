//! End-to-end scenarios
//!
//! Each scenario drives the whole pipeline and checks one behavior:
//! - Pose dropout keeps paths and in-flight targets
//! - Populations stay bounded under steady input
//! - Travelers drain once the performer leaves
//! - Seeded runs are reproducible

use heartflow_core::{CanvasPoint, HeartflowResult, LandmarkFrame, PathKey, Region};
use heartflow_physics::PhysicsWorld;
use heartflow_sim::{PathTable, WaypointPath};

use crate::performer::{PerformerConfig, SyntheticPerformer};
use crate::simulator::{FlowSimConfig, FlowSimulator, SimulationReport};

/// Frames after which every traveler has certainly finished: the longest
/// path has five legs and no leg outlives the age budget.
pub fn drain_bound(max_age: u32) -> u64 {
    let leg = max_age as u64 + 2;
    leg * 5
}

fn snapshot_paths(table: &PathTable) -> Vec<(PathKey, WaypointPath)> {
    PathKey::all()
        .iter()
        .filter_map(|key| table.get(*key).map(|p| (*key, p.clone())))
        .collect()
}

/// Result of the pose dropout scenario
#[derive(Debug, Clone)]
pub struct DropoutOutcome {
    pub paths_kept: bool,
    pub heart_kept: bool,
    pub face_travelers: usize,
    pub face_travelers_on_heart: usize,
}

impl DropoutOutcome {
    pub fn passed(&self) -> bool {
        self.paths_kept
            && self.heart_kept
            && self.face_travelers > 0
            && self.face_travelers == self.face_travelers_on_heart
    }
}

/// Perform for a while, then lose the pose for `dropout_frames` frames
pub fn scenario_pose_dropout(dropout_frames: usize) -> HeartflowResult<DropoutOutcome> {
    let config = FlowSimConfig::default().with_performer(PerformerConfig::still());
    let mut sim = FlowSimulator::new(config)?;
    sim.run(30);

    let before = snapshot_paths(sim.engine().paths());
    let heart: Option<CanvasPoint> = sim.engine().paths().heart();

    // Alternate between "no detection" and "detection without a pose"
    let no_pose = LandmarkFrame::empty();
    for i in 0..dropout_frames {
        if i % 2 == 0 {
            sim.step_with(None);
        } else {
            sim.step_with(Some(&no_pose));
        }
    }

    let after = sim.engine().paths();
    let paths_kept = before.len() == PathKey::all().len()
        && before
            .iter()
            .all(|(key, path)| after.get(*key).is_some_and(|p| p.ptr_eq(path)));

    let face: Vec<_> = sim
        .engine()
        .pool()
        .iter()
        .filter(|t| matches!(t.region(), Region::Mouth | Region::Eyes))
        .collect();

    Ok(DropoutOutcome {
        paths_kept,
        heart_kept: after.heart() == heart,
        face_travelers: face.len(),
        face_travelers_on_heart: face.iter().filter(|t| Some(t.target()) == heart).count(),
    })
}

/// Steady performance for `frames` frames
pub fn scenario_steady(config: FlowSimConfig, frames: u64) -> HeartflowResult<SimulationReport> {
    let mut sim = FlowSimulator::new(config)?;
    Ok(sim.run(frames).clone())
}

/// Perform, then leave the frame; returns the live count once drained
pub fn scenario_drain(perform_frames: u64) -> HeartflowResult<(SimulationReport, usize)> {
    let config = FlowSimConfig::default();
    let bound = drain_bound(config.sim.traveler.max_age);
    let mut sim = FlowSimulator::new(config)?;

    sim.run(perform_frames);
    sim.run_without_input(bound);
    Ok((sim.report().clone(), sim.engine().world().body_count()))
}

/// The same seed run twice
pub fn scenario_reproducible(seed: u64, frames: u64) -> HeartflowResult<bool> {
    let run = || -> HeartflowResult<_> {
        let config = FlowSimConfig::default()
            .with_performer(PerformerConfig::flaky())
            .with_seed(seed);
        let mut sim = FlowSimulator::new(config)?;
        sim.run(frames);
        Ok((sim.report().clone(), sim.canvas().discs().to_vec()))
    };
    Ok(run()? == run()?)
}

/// Landmark frames the pipeline reads, pre-generated for benches
pub fn recorded_frames(config: PerformerConfig, seed: u64, frames: usize) -> Vec<Option<LandmarkFrame>> {
    let mut performer = SyntheticPerformer::new(config, seed);
    (0..frames).map(|_| performer.next_frame()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartflow_core::SimConfig;
    use proptest::prelude::*;

    #[test]
    fn test_pose_absent_three_frames() {
        let outcome = scenario_pose_dropout(3).unwrap();
        assert!(outcome.paths_kept);
        assert!(outcome.heart_kept);
        assert!(outcome.face_travelers > 0);
        assert!(outcome.passed(), "{outcome:?}");
    }

    #[test]
    fn test_longer_dropout_still_pursues_heart() {
        assert!(scenario_pose_dropout(8).unwrap().passed());
    }

    #[test]
    fn test_population_is_bounded() {
        let report = scenario_steady(FlowSimConfig::default(), 900).unwrap();

        assert!(report.is_balanced());
        assert!(report.pruned > 0);
        assert!(report.peak_live < 3000, "peak {}", report.peak_live);
    }

    #[test]
    fn test_sparse_preset_spawns_less() {
        let dense = scenario_steady(FlowSimConfig::default(), 300).unwrap();
        let sparse = scenario_steady(
            FlowSimConfig {
                sim: SimConfig::sparse(),
                ..Default::default()
            },
            300,
        )
        .unwrap();

        assert!(sparse.spawned < dense.spawned);
    }

    #[test]
    fn test_everything_drains() {
        let (report, bodies) = scenario_drain(200).unwrap();

        assert_eq!(report.final_live, 0);
        assert_eq!(bodies, 0);
        assert!(report.is_balanced());
    }

    #[test]
    fn test_flaky_input_is_reproducible() {
        assert!(scenario_reproducible(11, 200).unwrap());
    }

    #[test]
    fn test_flaky_input_degrades_gracefully() {
        let report = scenario_steady(
            FlowSimConfig::default().with_performer(PerformerConfig::flaky()),
            400,
        )
        .unwrap();

        assert!(report.frames_without_pose > 0);
        assert!(report.spawned > 0);
        assert_eq!(report.faulted, 0);
        assert!(report.is_balanced());
    }

    #[test]
    fn test_regions_all_emit() {
        let mut sim = FlowSimulator::new(FlowSimConfig::default()).unwrap();
        sim.run(12);

        for region in Region::all() {
            assert!(sim.spawned_in(*region) > 0, "{region} never spawned");
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_any_seed_stays_balanced(seed in any::<u64>()) {
            let report = scenario_steady(
                FlowSimConfig::default()
                    .with_performer(PerformerConfig::flaky())
                    .with_seed(seed),
                150,
            )
            .unwrap();
            prop_assert!(report.is_balanced());
            prop_assert_eq!(report.faulted, 0);
        }
    }
}
