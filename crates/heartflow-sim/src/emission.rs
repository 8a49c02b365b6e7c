//! Emission controllers - deciding when and where travelers are born
//!
//! One controller per source region. Each keeps its own frame phase,
//! reads the frame it is handed, and queues spawn requests. Controllers
//! never talk to each other; they only share the velocity estimator, the
//! path table, and the spawn queue.

use heartflow_core::hand_index::TIPS;
use heartflow_core::pose_index::{LEFT_EYE, LEFT_FOOT, MOUTH_LEFT, MOUTH_RIGHT, RIGHT_EYE, RIGHT_FOOT};
use heartflow_core::{
    CanvasPoint, EyeEmitterConfig, FrameTime, HandEmitterConfig, LandmarkFrame, LegEmitterConfig,
    MouthEmitterConfig, Region, Vec2,
};
use rand::Rng;
use tracing::trace;

use crate::{path_for, CoordinateMapper, PathTable, TrackedPoint, VelocityEstimator};

/// Per-region spawn cadence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmissionState {
    pub phase: u32,
}

impl EmissionState {
    /// Whether this frame is an emission frame for a gate of `every` frames,
    /// then move on to the next frame.
    pub fn advance(&mut self, every: u32) -> bool {
        let open = every <= 1 || self.phase % every == 0;
        self.phase = self.phase.wrapping_add(1);
        open
    }
}

/// The landmark a traveler was born from, and how its z becomes depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSource {
    pub point: TrackedPoint,
    pub gain: f32,
}

impl DepthSource {
    pub fn new(point: TrackedPoint, gain: f32) -> Self {
        DepthSource { point, gain }
    }

    /// Relative depth of the source in `frame`
    pub fn depth_in(&self, frame: &LandmarkFrame) -> Option<f32> {
        self.point.z_in(frame).map(|z| z * self.gain)
    }
}

/// A traveler waiting to be created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub region: Region,
    pub position: CanvasPoint,
    pub velocity: Vec2,
    /// Relative depth, turned into a size by the pool
    pub depth: f32,
    pub source: DepthSource,
}

/// What every controller gets to work with for one frame
pub struct EmitContext<'a, R: Rng> {
    pub mapper: &'a CoordinateMapper,
    pub velocity: &'a mut VelocityEstimator,
    pub paths: &'a PathTable,
    pub now: FrameTime,
    pub rng: &'a mut R,
    pub spawns: &'a mut Vec<Spawn>,
}

/// A cluster of spawns around one source point
#[derive(Debug, Clone, Copy)]
struct Burst {
    region: Region,
    origin: CanvasPoint,
    velocity: Vec2,
    depth: f32,
    source: DepthSource,
    count: u32,
}

impl<'a, R: Rng> EmitContext<'a, R> {
    fn scatter(&mut self, burst: Burst, position_jitter: f32, velocity_jitter: f32) -> usize {
        for _ in 0..burst.count {
            let position = burst.origin + jitter(self.rng, position_jitter);
            let velocity = burst.velocity + jitter(self.rng, velocity_jitter);
            self.spawns.push(Spawn {
                region: burst.region,
                position,
                velocity,
                depth: burst.depth,
                source: burst.source,
            });
        }
        burst.count as usize
    }
}

/// Uniform offset in [-half, half] on each axis
fn jitter<R: Rng>(rng: &mut R, half: f32) -> Vec2 {
    if half.is_nan() || half <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(rng.gen_range(-half..=half), rng.gen_range(-half..=half))
}

/// Fingertips → arm paths
#[derive(Debug, Clone)]
pub struct HandEmitter {
    config: HandEmitterConfig,
    state: EmissionState,
}

impl HandEmitter {
    pub fn new(config: HandEmitterConfig) -> Self {
        HandEmitter {
            config,
            state: EmissionState::default(),
        }
    }

    pub fn emit<R: Rng>(&mut self, frame: Option<&LandmarkFrame>, ctx: &mut EmitContext<'_, R>) -> usize {
        let open = self.state.advance(self.config.every_n_frames);
        if !self.config.enabled || !open {
            return 0;
        }
        let Some(frame) = frame else {
            return 0;
        };

        let mut spawned = 0;
        for hand in frame.hands() {
            let region = Region::arm(hand.handedness);
            if path_for(region, ctx.paths).is_none() {
                trace!(%region, "no path yet, skipping hand");
                continue;
            }

            for &tip in TIPS.iter() {
                let Some(landmark) = hand.landmark(tip) else {
                    continue;
                };
                let point = TrackedPoint::hand(hand.handedness, tip);
                let position = ctx.mapper.to_canvas(landmark);
                let velocity = ctx.velocity.estimate(point, position, ctx.now);
                ctx.spawns.push(Spawn {
                    region,
                    position,
                    velocity,
                    depth: landmark.z * self.config.depth_gain,
                    source: DepthSource::new(point, self.config.depth_gain),
                });
                spawned += 1;
            }
        }
        spawned
    }

    pub fn state(&self) -> EmissionState {
        self.state
    }
}

/// Mouth center → face path
#[derive(Debug, Clone)]
pub struct MouthEmitter {
    config: MouthEmitterConfig,
    state: EmissionState,
}

impl MouthEmitter {
    pub fn new(config: MouthEmitterConfig) -> Self {
        MouthEmitter {
            config,
            state: EmissionState::default(),
        }
    }

    /// Spawns every frame a pose with both mouth corners is present
    pub fn emit<R: Rng>(&mut self, frame: Option<&LandmarkFrame>, ctx: &mut EmitContext<'_, R>) -> usize {
        self.state.advance(1);
        if !self.config.enabled || path_for(Region::Mouth, ctx.paths).is_none() {
            return 0;
        }
        let Some(pose) = frame.and_then(|f| f.primary_pose()) else {
            return 0;
        };
        let (Some(left), Some(right)) = (pose.landmark(MOUTH_LEFT), pose.landmark(MOUTH_RIGHT)) else {
            return 0;
        };

        let center = ctx.mapper.to_canvas(left).midpoint(&ctx.mapper.to_canvas(right));
        let depth = (left.z + right.z) / 2.0 * self.config.depth_gain;
        let velocity = ctx.velocity.estimate(TrackedPoint::MouthCenter, center, ctx.now);

        let burst = Burst {
            region: Region::Mouth,
            origin: center,
            velocity,
            depth,
            source: DepthSource::new(TrackedPoint::MouthCenter, self.config.depth_gain),
            count: self.config.count,
        };
        ctx.scatter(burst, self.config.position_jitter, self.config.velocity_jitter)
    }

    pub fn state(&self) -> EmissionState {
        self.state
    }
}

/// Both eyes → face path, entering past the mouth waypoint
#[derive(Debug, Clone)]
pub struct EyeEmitter {
    config: EyeEmitterConfig,
    state: EmissionState,
}

impl EyeEmitter {
    pub fn new(config: EyeEmitterConfig) -> Self {
        EyeEmitter {
            config,
            state: EmissionState::default(),
        }
    }

    pub fn emit<R: Rng>(&mut self, frame: Option<&LandmarkFrame>, ctx: &mut EmitContext<'_, R>) -> usize {
        let open = self.state.advance(self.config.every_n_frames);
        if !self.config.enabled || !open || path_for(Region::Eyes, ctx.paths).is_none() {
            return 0;
        }
        let Some(pose) = frame.and_then(|f| f.primary_pose()) else {
            return 0;
        };

        let mut spawned = 0;
        for eye in [LEFT_EYE, RIGHT_EYE] {
            let Some(landmark) = pose.landmark(eye) else {
                continue;
            };
            let position = ctx.mapper.to_canvas(landmark);
            let velocity = ctx.velocity.estimate(TrackedPoint::Pose(eye), position, ctx.now);

            let burst = Burst {
                region: Region::Eyes,
                origin: position,
                velocity,
                depth: landmark.z * self.config.depth_gain,
                source: DepthSource::new(TrackedPoint::Pose(eye), self.config.depth_gain),
                count: self.config.count_per_eye,
            };
            spawned += ctx.scatter(burst, self.config.position_jitter, self.config.velocity_jitter);
        }
        spawned
    }

    pub fn state(&self) -> EmissionState {
        self.state
    }
}

/// Feet → leg paths
#[derive(Debug, Clone)]
pub struct LegEmitter {
    config: LegEmitterConfig,
    state: EmissionState,
}

impl LegEmitter {
    pub fn new(config: LegEmitterConfig) -> Self {
        LegEmitter {
            config,
            state: EmissionState::default(),
        }
    }

    pub fn emit<R: Rng>(&mut self, frame: Option<&LandmarkFrame>, ctx: &mut EmitContext<'_, R>) -> usize {
        let open = self.state.advance(self.config.every_n_frames);
        if !self.config.enabled || !open {
            return 0;
        }
        let Some(pose) = frame.and_then(|f| f.primary_pose()) else {
            return 0;
        };

        let mut spawned = 0;
        for (foot, region) in [(LEFT_FOOT, Region::LeftLeg), (RIGHT_FOOT, Region::RightLeg)] {
            if path_for(region, ctx.paths).is_none() {
                continue;
            }
            let Some(landmark) = pose.landmark(foot) else {
                continue;
            };
            let position = ctx.mapper.to_canvas(landmark);
            let velocity = ctx.velocity.estimate(TrackedPoint::Pose(foot), position, ctx.now);

            let burst = Burst {
                region,
                origin: position,
                velocity,
                depth: landmark.z * self.config.depth_gain,
                source: DepthSource::new(TrackedPoint::Pose(foot), self.config.depth_gain),
                count: self.config.count_per_foot,
            };
            spawned += ctx.scatter(burst, self.config.position_jitter, self.config.velocity_jitter);
        }
        spawned
    }

    pub fn state(&self) -> EmissionState {
        self.state
    }
}
