//! Traveler - a particle following its region's path to the heart
//!
//! A traveler owns its physics body and walks a waypoint path leg by leg.
//! Each update it re-reads the live path for its region, pushes its body
//! toward the current waypoint, and moves on once it is close enough or
//! has spent its age budget on the leg.
//!
//! ```text
//! Seeking(0) ──close|stale──► Seeking(1) ──► ... ──► Seeking(n-1) ──close|stale──► Dead
//! ```

use heartflow_core::{remap, CanvasPoint, DepthScale, LandmarkFrame, Region, TravelerConfig};
use heartflow_physics::{BodyHandle, PhysicsError, PhysicsResult, PhysicsWorld};
use rand::Rng;

use crate::{path_for, DepthSource, PathTable};

/// Radius difference below which the body is left alone
const RESCALE_EPSILON: f32 = 1e-3;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelerState {
    /// Heading for the waypoint at this index
    Seeking(usize),
    /// Finished; waiting to be pruned
    Dead,
}

#[derive(Debug)]
pub struct Traveler {
    region: Region,
    body: BodyHandle,
    source: DepthSource,
    /// Diameter, derived from depth
    size: f32,
    age: u32,
    max_age: u32,
    target: CanvasPoint,
    state: TravelerState,
}

impl Traveler {
    /// Wrap a freshly created body.
    ///
    /// Mouth and eye travelers enter their path at index 1 when the path has
    /// more than one point. A traveler whose region has no path yet dies on
    /// its first update, and until then targets its own position.
    pub fn new(
        region: Region,
        body: BodyHandle,
        position: CanvasPoint,
        source: DepthSource,
        size: f32,
        paths: &PathTable,
        config: &TravelerConfig,
    ) -> Self {
        let path = path_for(region, paths);
        let entry = region.entry_index(path.map_or(0, |p| p.len()));
        Traveler {
            region,
            body,
            source,
            size,
            age: 0,
            max_age: config.max_age,
            target: path.and_then(|p| p.get(entry)).unwrap_or(position),
            state: TravelerState::Seeking(entry),
        }
    }

    /// Advance one step.
    ///
    /// Errors only when the world no longer knows this traveler's body.
    pub fn update<W, R>(
        &mut self,
        paths: &PathTable,
        world: &mut W,
        config: &TravelerConfig,
        rng: &mut R,
    ) -> PhysicsResult<TravelerState>
    where
        W: PhysicsWorld + ?Sized,
        R: Rng,
    {
        let TravelerState::Seeking(index) = self.state else {
            return Ok(TravelerState::Dead);
        };

        let Some(path) = path_for(self.region, paths) else {
            self.state = TravelerState::Dead;
            return Ok(self.state);
        };
        let Some(target) = path.get(index) else {
            self.state = TravelerState::Dead;
            return Ok(self.state);
        };
        self.target = target;

        let position = world
            .position(&self.body)
            .ok_or(PhysicsError::UnknownBody(self.body.id()))?;
        let to_target = target - position;
        let distance = to_target.length();

        if distance > config.min_pursuit_distance {
            let magnitude = config.force_for_distance(distance);
            world.apply_force(&self.body, position, to_target * (magnitude / distance))?;
        }

        self.sync_radius(world)?;

        if distance < config.close_threshold || self.age > self.max_age {
            let next = index + 1;
            if next >= path.len() {
                self.state = TravelerState::Dead;
            } else {
                self.state = TravelerState::Seeking(next);
                self.age = self.reset_age(config, rng);
            }
        }

        self.age = self.age.saturating_add(1);
        Ok(self.state)
    }

    fn sync_radius<W: PhysicsWorld + ?Sized>(&self, world: &mut W) -> PhysicsResult<()> {
        let wanted = self.size / 2.0;
        let current = world
            .radius(&self.body)
            .ok_or(PhysicsError::UnknownBody(self.body.id()))?;

        if current > 0.0 && wanted > 0.0 && (current - wanted).abs() > RESCALE_EPSILON {
            world.scale_body(&self.body, wanted / current)?;
        }
        Ok(())
    }

    fn reset_age<R: Rng>(&self, config: &TravelerConfig, rng: &mut R) -> u32 {
        let lo = config.age_reset_min.min(config.age_reset_max);
        let hi = config.age_reset_min.max(config.age_reset_max);
        let fraction = rng.gen_range(lo..=hi);
        (fraction * self.max_age as f32).round() as u32
    }

    /// Re-derive the size from a new depth; the body follows on the next update
    pub fn set_depth(&mut self, depth: f32, scale: &DepthScale) {
        self.size = scale.size_for(depth);
    }

    /// Pick up the current depth of the source landmark.
    ///
    /// Keeps the old size when `frame` no longer sees the source.
    pub fn follow_depth(&mut self, frame: &LandmarkFrame, scale: &DepthScale) -> bool {
        match self.source.depth_in(frame) {
            Some(depth) => {
                self.set_depth(depth, scale);
                true
            }
            None => false,
        }
    }

    /// Opacity fading from `max_alpha` at age 0 to 0 at `max_age`
    pub fn alpha(&self, max_alpha: f32) -> f32 {
        remap(self.age as f32, 0.0, self.max_age as f32, max_alpha, 0.0).clamp(0.0, max_alpha)
    }

    /// Drawn radius, shrinking with age
    pub fn display_radius(&self) -> f32 {
        let remaining = if self.max_age == 0 {
            0.0
        } else {
            1.0 - self.age as f32 / self.max_age as f32
        };
        self.size / 2.0 * remaining.clamp(0.0, 1.0)
    }

    /// Mark for pruning
    pub fn retire(&mut self) {
        self.state = TravelerState::Dead;
    }

    /// Give the body handle back so it can be deregistered
    pub fn into_body(self) -> BodyHandle {
        self.body
    }

    pub fn is_dead(&self) -> bool {
        self.state == TravelerState::Dead
    }

    pub fn waypoint_index(&self) -> Option<usize> {
        match self.state {
            TravelerState::Seeking(i) => Some(i),
            TravelerState::Dead => None,
        }
    }

    pub fn state(&self) -> TravelerState {
        self.state
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn body(&self) -> &BodyHandle {
        &self.body
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn source(&self) -> DepthSource {
        self.source
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn target(&self) -> CanvasPoint {
        self.target
    }
}
