//! Flow engine - one tick per displayed frame
//!
//! The engine owns every piece of simulation state and runs the frame
//! stages strictly in order on the caller's thread:
//!
//! 1. Rebuild paths from the newest landmark frame
//! 2. Run the emission controllers and create the queued travelers
//! 3. Follow source depths, then update, draw, and prune the pool
//! 4. Step the physics world

use std::time::{Duration, Instant};

use heartflow_core::{FrameTime, HeartflowResult, LandmarkFrame, LatestFrame, Region, SimConfig};
use heartflow_physics::{PhysicsWorld, PointWorld};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{trace, warn};

use crate::{
    Canvas, ColorSampler, CoordinateMapper, EmitContext, EyeEmitter, HandEmitter, LegEmitter,
    MouthEmitter, PathBuilder, PathTable, Spawn, TravelerPool, VelocityEstimator,
};

/// Counter per region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionCounts {
    counts: [u64; 6],
}

impl RegionCounts {
    pub fn add(&mut self, region: Region, n: u64) {
        self.counts[region.index()] += n;
    }

    pub fn get(&self, region: Region) -> u64 {
        self.counts[region.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, u64)> + '_ {
        Region::all().iter().map(move |r| (*r, self.get(*r)))
    }

    fn merge(&mut self, other: &RegionCounts) {
        for (total, n) in self.counts.iter_mut().zip(other.counts.iter()) {
            *total += n;
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub paths_rebuilt: bool,
    /// False when the landmark slot had nothing new since the last tick
    pub fresh_input: bool,
    pub spawned: RegionCounts,
    pub drawn: usize,
    pub pruned: usize,
    pub faulted: usize,
    pub live: usize,
    pub tick_duration: Duration,
}

/// Totals since the engine was created
#[derive(Debug, Clone, Default)]
pub struct FlowStats {
    pub ticks: u64,
    pub path_rebuilds: u64,
    pub spawned: RegionCounts,
    pub pruned: u64,
    pub faulted: u64,
    pub peak_live: usize,
    pub last_tick_duration: Duration,
}

/// Per-frame simulation driver
pub struct FlowEngine<W: PhysicsWorld = PointWorld> {
    config: SimConfig,
    paths: PathBuilder,
    velocity: VelocityEstimator,
    hands: HandEmitter,
    mouth: MouthEmitter,
    eyes: EyeEmitter,
    legs: LegEmitter,
    pool: TravelerPool,
    world: W,
    rng: StdRng,
    spawns: Vec<Spawn>,
    stats: FlowStats,
    frame_index: u64,
    last_generation: Option<u64>,
}

impl FlowEngine<PointWorld> {
    /// Engine with the built-in world and an entropy-seeded RNG
    pub fn new(config: SimConfig) -> HeartflowResult<Self> {
        let world = Self::point_world(&config);
        FlowEngine::with_world(config, world, StdRng::from_entropy())
    }

    /// Reproducible engine: same seed and inputs give the same frames
    pub fn with_seed(config: SimConfig, seed: u64) -> HeartflowResult<Self> {
        let world = Self::point_world(&config);
        FlowEngine::with_world(config, world, StdRng::seed_from_u64(seed))
    }

    fn point_world(config: &SimConfig) -> PointWorld {
        PointWorld::with_config(&config.world, &config.display, config.velocity.step_ms)
    }
}

impl<W: PhysicsWorld> FlowEngine<W> {
    pub fn with_world(config: SimConfig, world: W, rng: StdRng) -> HeartflowResult<Self> {
        config.validate()?;

        let mapper = CoordinateMapper::new(&config.display);
        Ok(FlowEngine {
            paths: PathBuilder::new(mapper, config.paths),
            velocity: VelocityEstimator::new(config.velocity),
            hands: HandEmitter::new(config.hands),
            mouth: MouthEmitter::new(config.mouth),
            eyes: EyeEmitter::new(config.eyes),
            legs: LegEmitter::new(config.legs),
            pool: TravelerPool::new(),
            world,
            rng,
            spawns: Vec::new(),
            stats: FlowStats::default(),
            frame_index: 0,
            last_generation: None,
            config,
        })
    }

    /// Run one frame. `frame` is `None` when the tracker has no result.
    pub fn tick<S, C>(
        &mut self,
        frame: Option<&LandmarkFrame>,
        now: FrameTime,
        sampler: &S,
        canvas: &mut C,
    ) -> FrameStats
    where
        S: ColorSampler + ?Sized,
        C: Canvas + ?Sized,
    {
        let start = Instant::now();
        let mut stats = FrameStats {
            frame: self.frame_index,
            fresh_input: true,
            ..Default::default()
        };

        // Stage 1: Paths
        stats.paths_rebuilt = self.paths.rebuild(frame);

        // Stage 2: Emission
        self.emit(frame, now);
        self.spawn_queued(&mut stats);

        // Stage 3: Travelers
        if let Some(frame) = frame {
            self.pool.follow_depth(frame, &self.config.depth);
        }
        let report = self.pool.step(
            self.paths.table(),
            &mut self.world,
            sampler,
            canvas,
            &self.config.traveler,
            &mut self.rng,
        );
        stats.drawn = report.drawn;
        stats.pruned = report.pruned;
        stats.faulted += report.faulted;
        stats.live = self.pool.len();

        // Stage 4: Physics
        self.world.step();

        stats.tick_duration = start.elapsed();
        self.record(&stats);
        self.frame_index += 1;
        stats
    }

    /// Run one frame from whatever the tracker published last
    pub fn tick_latest<S, C>(
        &mut self,
        feed: &LatestFrame,
        now: FrameTime,
        sampler: &S,
        canvas: &mut C,
    ) -> FrameStats
    where
        S: ColorSampler + ?Sized,
        C: Canvas + ?Sized,
    {
        let snapshot = feed.snapshot();
        let fresh = self.last_generation != Some(snapshot.generation);
        self.last_generation = Some(snapshot.generation);

        let mut stats = self.tick(snapshot.frame.as_deref(), now, sampler, canvas);
        stats.fresh_input = fresh;
        stats
    }

    fn emit(&mut self, frame: Option<&LandmarkFrame>, now: FrameTime) {
        self.spawns.clear();
        let mut ctx = EmitContext {
            mapper: self.paths.mapper(),
            velocity: &mut self.velocity,
            paths: self.paths.table(),
            now,
            rng: &mut self.rng,
            spawns: &mut self.spawns,
        };

        self.hands.emit(frame, &mut ctx);
        self.mouth.emit(frame, &mut ctx);
        self.eyes.emit(frame, &mut ctx);
        self.legs.emit(frame, &mut ctx);
    }

    fn spawn_queued(&mut self, stats: &mut FrameStats) {
        for spawn in self.spawns.drain(..) {
            let created = self.pool.spawn(
                &spawn,
                &mut self.world,
                self.paths.table(),
                &self.config.material,
                &self.config.depth,
                &self.config.traveler,
            );
            match created {
                Ok(()) => stats.spawned.add(spawn.region, 1),
                Err(err) => {
                    warn!(region = %spawn.region, error = %err, "failed to create traveler");
                    stats.faulted += 1;
                }
            }
        }

        if stats.spawned.total() > 0 {
            trace!(
                frame = stats.frame,
                spawned = stats.spawned.total(),
                live = self.pool.len(),
                "spawned travelers"
            );
        }
    }

    fn record(&mut self, frame: &FrameStats) {
        let stats = &mut self.stats;
        stats.ticks += 1;
        if frame.paths_rebuilt {
            stats.path_rebuilds += 1;
        }
        stats.spawned.merge(&frame.spawned);
        stats.pruned += frame.pruned as u64;
        stats.faulted += frame.faulted as u64;
        stats.peak_live = stats.peak_live.max(frame.live);
        stats.last_tick_duration = frame.tick_duration;
    }

    /// Remove every traveler; paths and velocity history are kept
    pub fn clear(&mut self) {
        self.pool.clear(&mut self.world);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> &FlowStats {
        &self.stats
    }

    pub fn paths(&self) -> &PathTable {
        self.paths.table()
    }

    pub fn pool(&self) -> &TravelerPool {
        &self.pool
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrawList, Rgba, SolidColor};
    use heartflow_core::hand_index;
    use heartflow_core::pose_index::*;
    use heartflow_core::{DetectedHand, DisplayConfig, Handedness, Landmark, Pose};

    fn config() -> SimConfig {
        SimConfig {
            display: DisplayConfig {
                width: 1000.0,
                height: 1000.0,
            },
            ..Default::default()
        }
    }

    fn skeleton() -> Pose {
        let mut lm = vec![Landmark::new(0.5, 0.5, 0.0); COUNT];
        lm[LEFT_EYE] = Landmark::new(0.53, 0.15, 0.0);
        lm[RIGHT_EYE] = Landmark::new(0.47, 0.15, 0.0);
        lm[MOUTH_LEFT] = Landmark::new(0.52, 0.2, 0.0);
        lm[MOUTH_RIGHT] = Landmark::new(0.48, 0.2, 0.0);
        lm[LEFT_SHOULDER] = Landmark::new(0.6, 0.3, 0.0);
        lm[RIGHT_SHOULDER] = Landmark::new(0.4, 0.3, 0.0);
        lm[LEFT_ELBOW] = Landmark::new(0.7, 0.45, 0.0);
        lm[RIGHT_ELBOW] = Landmark::new(0.3, 0.45, 0.0);
        lm[LEFT_WRIST] = Landmark::new(0.75, 0.6, 0.0);
        lm[RIGHT_WRIST] = Landmark::new(0.25, 0.6, 0.0);
        lm[LEFT_HIP] = Landmark::new(0.56, 0.6, 0.0);
        lm[RIGHT_HIP] = Landmark::new(0.44, 0.6, 0.0);
        lm[LEFT_KNEE] = Landmark::new(0.57, 0.75, 0.0);
        lm[RIGHT_KNEE] = Landmark::new(0.43, 0.75, 0.0);
        lm[LEFT_FOOT] = Landmark::new(0.58, 0.9, 0.0);
        lm[RIGHT_FOOT] = Landmark::new(0.42, 0.9, 0.0);
        Pose::new(lm)
    }

    fn full_frame() -> LandmarkFrame {
        let hand = |h, x| DetectedHand::new(h, vec![Landmark::new(x, 0.62, 0.0); hand_index::COUNT]);
        LandmarkFrame::empty()
            .with_pose(skeleton())
            .with_hands(vec![hand(Handedness::Left, 0.76), hand(Handedness::Right, 0.24)])
    }

    fn run(engine: &mut FlowEngine, frames: &[Option<LandmarkFrame>]) -> Vec<FrameStats> {
        let sampler = SolidColor(Rgba::WHITE);
        let mut canvas = DrawList::new();
        frames
            .iter()
            .enumerate()
            .map(|(i, f)| {
                engine.tick(f.as_ref(), FrameTime::from_millis(i as i64 * 16), &sampler, &mut canvas)
            })
            .collect()
    }

    #[test]
    fn test_no_input_no_travelers() {
        let mut engine = FlowEngine::with_seed(config(), 1).unwrap();
        let stats = run(&mut engine, &[None, None, None]);

        assert!(stats.iter().all(|s| s.spawned.total() == 0 && !s.paths_rebuilt));
        assert!(engine.paths().is_empty());
        assert_eq!(engine.world().body_count(), 0);
    }

    #[test]
    fn test_first_frame_spawns_every_region() {
        let mut engine = FlowEngine::with_seed(config(), 2).unwrap();
        let stats = run(&mut engine, &[Some(full_frame())]).remove(0);

        assert!(stats.paths_rebuilt);
        assert_eq!(stats.spawned.get(Region::LeftArm), 5);
        assert_eq!(stats.spawned.get(Region::RightArm), 5);
        assert_eq!(stats.spawned.get(Region::Mouth), 2);
        assert_eq!(stats.spawned.get(Region::Eyes), 4);
        assert_eq!(stats.spawned.get(Region::LeftLeg), 1);
        assert_eq!(stats.spawned.get(Region::RightLeg), 1);
        assert_eq!(stats.live, 18);
        assert_eq!(stats.drawn, 18);
        assert_eq!(engine.world().body_count(), 18);
    }

    #[test]
    fn test_cadence_over_frames() {
        let mut engine = FlowEngine::with_seed(config(), 3).unwrap();
        let frames: Vec<_> = (0..12).map(|_| Some(full_frame())).collect();
        run(&mut engine, &frames);

        let spawned = engine.stats().spawned;
        // hands every 2nd, mouth every frame, eyes every 3rd, legs every 4th
        assert_eq!(spawned.get(Region::LeftArm), 6 * 5);
        assert_eq!(spawned.get(Region::Mouth), 12 * 2);
        assert_eq!(spawned.get(Region::Eyes), 4 * 4);
        assert_eq!(spawned.get(Region::LeftLeg), 3);
        assert_eq!(engine.stats().ticks, 12);
    }

    #[test]
    fn test_pose_dropout_keeps_paths() {
        let mut engine = FlowEngine::with_seed(config(), 4).unwrap();
        run(&mut engine, &[Some(full_frame())]);
        let generation = engine.paths().generation();
        let heart = engine.paths().heart();

        let stats = run(&mut engine, &[None, Some(LandmarkFrame::empty()), None]);

        assert!(stats.iter().all(|s| !s.paths_rebuilt));
        assert_eq!(engine.paths().generation(), generation);
        assert_eq!(engine.paths().heart(), heart);
        assert!(!engine.pool().is_empty());
    }

    #[test]
    fn test_bodies_follow_leaning_performer() {
        let mut engine = FlowEngine::with_seed(config(), 8).unwrap();
        let mut leaning = full_frame();
        for pose in leaning.poses.iter_mut().flatten() {
            pose.landmarks.iter_mut().for_each(|l| l.z = -2.0);
        }
        for hand in leaning.hands.iter_mut().flatten() {
            hand.landmarks.iter_mut().for_each(|l| l.z = -2.0);
        }

        run(&mut engine, &[Some(full_frame())]);
        let upright: Vec<f32> = engine.pool().iter().filter_map(|t| engine.world().radius(t.body())).collect();
        assert_eq!(upright.len(), 18);
        assert!(upright.iter().all(|r| (r - 5.0).abs() < 1e-4), "{upright:?}");

        run(&mut engine, &[Some(leaning)]);
        let near = engine.config().depth.size_for(-0.2) / 2.0;
        let leaned: Vec<f32> = engine.pool().iter().filter_map(|t| engine.world().radius(t.body())).collect();
        assert!(leaned.len() >= 18);
        assert!(leaned.iter().all(|r| (r - near).abs() < 1e-4), "{leaned:?}");
    }

    #[test]
    fn test_seeded_runs_match() {
        let frames: Vec<_> = (0..20).map(|_| Some(full_frame())).collect();
        let draw = |seed| {
            let mut engine = FlowEngine::with_seed(config(), seed).unwrap();
            let mut canvas = DrawList::new();
            for (i, f) in frames.iter().enumerate() {
                canvas.clear();
                engine.tick(f.as_ref(), FrameTime::from_millis(i as i64 * 16), &SolidColor(Rgba::WHITE), &mut canvas);
            }
            canvas.discs().to_vec()
        };

        assert_eq!(draw(9), draw(9));
    }

    #[test]
    fn test_tick_latest_marks_stale_input() {
        let mut engine = FlowEngine::with_seed(config(), 5).unwrap();
        let feed = LatestFrame::new();
        let sampler = SolidColor(Rgba::WHITE);
        let mut canvas = DrawList::new();

        feed.publish(Some(full_frame()));
        let first = engine.tick_latest(&feed, FrameTime::from_millis(0), &sampler, &mut canvas);
        let second = engine.tick_latest(&feed, FrameTime::from_millis(16), &sampler, &mut canvas);

        assert!(first.fresh_input);
        assert!(!second.fresh_input);
        // The previous result is reused, so the mouth keeps emitting
        assert_eq!(second.spawned.get(Region::Mouth), 2);
    }

    #[test]
    fn test_clear_releases_bodies() {
        let mut engine = FlowEngine::with_seed(config(), 6).unwrap();
        run(&mut engine, &[Some(full_frame())]);

        engine.clear();
        assert!(engine.pool().is_empty());
        assert_eq!(engine.world().body_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = config();
        bad.display.width = 0.0;
        assert!(FlowEngine::with_seed(bad, 0).is_err());
    }
}
