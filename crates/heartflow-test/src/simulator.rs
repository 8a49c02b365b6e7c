//! Flow Simulator - the frame loop, minus camera and screen
//!
//! Drives a [`FlowEngine`] with frames from a [`SyntheticPerformer`] on a
//! fixed-step clock, collecting what a real display loop would draw.

use std::time::Duration;

use heartflow_core::{FrameClock, HeartflowResult, LandmarkFrame, Region, SimConfig};
use heartflow_sim::{DrawList, FlowEngine, FrameStats, Rgba, SolidColor};

use crate::performer::{PerformerConfig, SyntheticPerformer};

/// Simulation parameters
#[derive(Clone, Debug)]
pub struct FlowSimConfig {
    pub sim: SimConfig,
    pub performer: PerformerConfig,
    pub frame_step: Duration,
    pub seed: u64,
}

impl Default for FlowSimConfig {
    fn default() -> Self {
        FlowSimConfig {
            sim: SimConfig::default(),
            performer: PerformerConfig::dancing(),
            frame_step: Duration::from_micros(16_667),
            seed: 0x4845_4152,
        }
    }
}

impl FlowSimConfig {
    pub fn with_performer(mut self, performer: PerformerConfig) -> Self {
        self.performer = performer;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Summary of a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationReport {
    pub frames: u64,
    pub frames_without_pose: u64,
    pub spawned: u64,
    pub pruned: u64,
    pub faulted: u64,
    pub peak_live: usize,
    pub final_live: usize,
    pub discs_drawn: u64,
}

impl SimulationReport {
    fn record(&mut self, frame: Option<&LandmarkFrame>, stats: &FrameStats) {
        self.frames += 1;
        if frame.and_then(|f| f.primary_pose()).is_none() {
            self.frames_without_pose += 1;
        }
        self.spawned += stats.spawned.total();
        self.pruned += stats.pruned as u64;
        self.faulted += stats.faulted as u64;
        self.peak_live = self.peak_live.max(stats.live);
        self.final_live = stats.live;
        self.discs_drawn += stats.drawn as u64;
    }

    /// Every spawned traveler is either live or pruned
    pub fn is_balanced(&self) -> bool {
        self.spawned == self.pruned + self.final_live as u64
    }
}

/// Performer + engine + clock
pub struct FlowSimulator {
    engine: FlowEngine,
    performer: SyntheticPerformer,
    clock: FrameClock,
    sampler: SolidColor,
    canvas: DrawList,
    report: SimulationReport,
}

impl FlowSimulator {
    pub fn new(config: FlowSimConfig) -> HeartflowResult<Self> {
        Ok(FlowSimulator {
            engine: FlowEngine::with_seed(config.sim, config.seed)?,
            performer: SyntheticPerformer::new(config.performer, config.seed.wrapping_add(1)),
            clock: FrameClock::fixed_step(config.frame_step),
            sampler: SolidColor(Rgba::WHITE),
            canvas: DrawList::new(),
            report: SimulationReport::default(),
        })
    }

    /// One frame from the performer
    pub fn step(&mut self) -> FrameStats {
        let frame = self.performer.next_frame();
        self.step_with(frame.as_ref())
    }

    /// One frame with explicit tracker output
    pub fn step_with(&mut self, frame: Option<&LandmarkFrame>) -> FrameStats {
        let now = self.clock.tick();
        self.canvas.clear();
        let stats = self.engine.tick(frame, now, &self.sampler, &mut self.canvas);
        self.report.record(frame, &stats);
        stats
    }

    pub fn run(&mut self, frames: u64) -> &SimulationReport {
        for _ in 0..frames {
            self.step();
        }
        &self.report
    }

    /// Feed frames with no detection at all
    pub fn run_without_input(&mut self, frames: u64) -> &SimulationReport {
        for _ in 0..frames {
            self.step_with(None);
        }
        &self.report
    }

    pub fn spawned_in(&self, region: Region) -> u64 {
        self.engine.stats().spawned.get(region)
    }

    pub fn engine(&self) -> &FlowEngine {
        &self.engine
    }

    pub fn canvas(&self) -> &DrawList {
        &self.canvas
    }

    pub fn report(&self) -> &SimulationReport {
        &self.report
    }
}
