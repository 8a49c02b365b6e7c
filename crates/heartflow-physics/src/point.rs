//! Point-body world
//!
//! Bodies are circles integrated as point masses:
//!
//! ```text
//! v' = v * (1 - air_friction) + (F / m + g) * dt²
//! p' = p + v'
//! ```
//!
//! with `dt` the step duration in milliseconds and velocity expressed per
//! step. Mass is `density * π r²`. Rotation is not modelled, so the point a
//! force is applied at does not matter.

use std::collections::HashMap;
use std::f32::consts::PI;

use heartflow_core::{BodyMaterial, DisplayConfig, Vec2, WorldConfig};

use crate::{BodyHandle, PhysicsError, PhysicsResult, PhysicsWorld};

#[derive(Debug, Clone)]
struct PointBody {
    position: Vec2,
    velocity: Vec2,
    force: Vec2,
    radius: f32,
    mass: f32,
    material: BodyMaterial,
}

impl PointBody {
    fn mass_for(radius: f32, density: f32) -> f32 {
        (density * PI * radius * radius).max(f32::EPSILON)
    }
}

/// Axis-aligned walls enclosing the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walls {
    pub width: f32,
    pub height: f32,
}

/// Lightweight [`PhysicsWorld`] implementation
#[derive(Debug)]
pub struct PointWorld {
    bodies: HashMap<u64, PointBody>,
    next_id: u64,
    gravity: Vec2,
    walls: Option<Walls>,
    step_ms: f32,
    steps: u64,
}

impl PointWorld {
    /// Open world with no gravity, stepping at `step_ms`
    pub fn new(step_ms: f32) -> Self {
        PointWorld {
            bodies: HashMap::new(),
            next_id: 1,
            gravity: Vec2::ZERO,
            walls: None,
            step_ms,
            steps: 0,
        }
    }

    pub fn with_config(config: &WorldConfig, display: &DisplayConfig, step_ms: f32) -> Self {
        let mut world = Self::new(step_ms);
        world.gravity = config.gravity;
        if config.walls {
            world.walls = Some(Walls {
                width: display.width,
                height: display.height,
            });
        }
        world
    }

    pub fn with_walls(mut self, walls: Walls) -> Self {
        self.walls = Some(walls);
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Steps taken since creation
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn body_mut(&mut self, handle: &BodyHandle) -> PhysicsResult<&mut PointBody> {
        self.bodies
            .get_mut(&handle.id())
            .ok_or(PhysicsError::UnknownBody(handle.id()))
    }

    fn collide_walls(body: &mut PointBody, walls: Walls) {
        let r = body.radius;
        let bounce = body.material.restitution;
        let slide = 1.0 - body.material.friction;

        if body.position.x - r < 0.0 {
            body.position.x = r;
            body.velocity.x = -body.velocity.x * bounce;
            body.velocity.y *= slide;
        } else if body.position.x + r > walls.width {
            body.position.x = walls.width - r;
            body.velocity.x = -body.velocity.x * bounce;
            body.velocity.y *= slide;
        }

        if body.position.y - r < 0.0 {
            body.position.y = r;
            body.velocity.y = -body.velocity.y * bounce;
            body.velocity.x *= slide;
        } else if body.position.y + r > walls.height {
            body.position.y = walls.height - r;
            body.velocity.y = -body.velocity.y * bounce;
            body.velocity.x *= slide;
        }
    }
}

impl PhysicsWorld for PointWorld {
    fn add_circle(
        &mut self,
        position: Vec2,
        radius: f32,
        material: &BodyMaterial,
    ) -> PhysicsResult<BodyHandle> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(PhysicsError::InvalidRadius(radius));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.bodies.insert(
            id,
            PointBody {
                position,
                velocity: Vec2::ZERO,
                force: Vec2::ZERO,
                radius,
                mass: PointBody::mass_for(radius, material.density),
                material: *material,
            },
        );
        Ok(BodyHandle::from_raw(id))
    }

    fn remove_body(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        self.bodies
            .remove(&handle.id())
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(handle.id()))
    }

    fn set_velocity(&mut self, handle: &BodyHandle, velocity: Vec2) -> PhysicsResult<()> {
        self.body_mut(handle)?.velocity = velocity;
        Ok(())
    }

    fn apply_force(&mut self, handle: &BodyHandle, _at: Vec2, force: Vec2) -> PhysicsResult<()> {
        self.body_mut(handle)?.force += force;
        Ok(())
    }

    fn scale_body(&mut self, handle: &BodyHandle, factor: f32) -> PhysicsResult<()> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(PhysicsError::InvalidScale(factor));
        }
        let body = self.body_mut(handle)?;
        body.radius *= factor;
        body.mass = PointBody::mass_for(body.radius, body.material.density);
        Ok(())
    }

    fn position(&self, handle: &BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle.id()).map(|b| b.position)
    }

    fn velocity(&self, handle: &BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle.id()).map(|b| b.velocity)
    }

    fn radius(&self, handle: &BodyHandle) -> Option<f32> {
        self.bodies.get(&handle.id()).map(|b| b.radius)
    }

    fn step(&mut self) {
        let dt_sq = self.step_ms * self.step_ms;
        let gravity = self.gravity;
        let walls = self.walls;

        for body in self.bodies.values_mut() {
            let drag = 1.0 - body.material.air_friction;
            let accel = body.force * (1.0 / body.mass) + gravity;
            body.velocity = body.velocity * drag + accel * dt_sq;
            body.position += body.velocity;
            body.force = Vec2::ZERO;

            if let Some(walls) = walls {
                Self::collide_walls(body, walls);
            }
        }

        self.steps += 1;
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
