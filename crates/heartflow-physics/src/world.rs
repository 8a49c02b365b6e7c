//! Physics world facade

use heartflow_core::{BodyMaterial, Vec2};

use crate::PhysicsResult;

/// Handle to a body registered in a [`PhysicsWorld`].
///
/// Neither `Clone` nor `Copy`: whoever holds the handle owns
/// the body, and giving the handle back to [`PhysicsWorld::remove_body`]
/// is the only way to deregister it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(u64);

impl BodyHandle {
    /// Only world implementations mint handles
    pub fn from_raw(id: u64) -> Self {
        BodyHandle(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The operations the simulation needs from a 2D rigid-body engine.
///
/// All velocities are in display units per step and forces are in the
/// engine's native units. Everything happens on the simulation thread.
pub trait PhysicsWorld {
    /// Create a circular body and register it in the world
    fn add_circle(
        &mut self,
        position: Vec2,
        radius: f32,
        material: &BodyMaterial,
    ) -> PhysicsResult<BodyHandle>;

    /// Deregister a body, consuming its handle
    fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<()>;

    fn set_velocity(&mut self, handle: &BodyHandle, velocity: Vec2) -> PhysicsResult<()>;

    /// Accumulate a force applied at `at` until the next step
    fn apply_force(&mut self, handle: &BodyHandle, at: Vec2, force: Vec2) -> PhysicsResult<()>;

    /// Scale the body's collision radius in place by `factor`
    fn scale_body(&mut self, handle: &BodyHandle, factor: f32) -> PhysicsResult<()>;

    fn position(&self, handle: &BodyHandle) -> Option<Vec2>;

    fn velocity(&self, handle: &BodyHandle) -> Option<Vec2>;

    fn radius(&self, handle: &BodyHandle) -> Option<f32>;

    /// Advance the world by one step
    fn step(&mut self);

    fn body_count(&self) -> usize;
}
