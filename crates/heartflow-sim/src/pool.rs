//! Traveler pool - owns every live traveler and its physics body

use heartflow_core::{BodyMaterial, DepthScale, LandmarkFrame, TravelerConfig};
use heartflow_physics::{PhysicsResult, PhysicsWorld};
use rand::Rng;
use tracing::{trace, warn};

use crate::{Canvas, ColorSampler, PathTable, Spawn, Traveler};

/// What one pool step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStep {
    pub updated: usize,
    pub drawn: usize,
    pub pruned: usize,
    /// Travelers retired because the world rejected their body
    pub faulted: usize,
}

#[derive(Debug, Default)]
pub struct TravelerPool {
    travelers: Vec<Traveler>,
}

impl TravelerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the body for `spawn` and start tracking it
    pub fn spawn<W: PhysicsWorld + ?Sized>(
        &mut self,
        spawn: &Spawn,
        world: &mut W,
        paths: &PathTable,
        material: &BodyMaterial,
        depth: &DepthScale,
        config: &TravelerConfig,
    ) -> PhysicsResult<()> {
        let size = depth.size_for(spawn.depth);
        let body = world.add_circle(spawn.position, size / 2.0, material)?;

        if let Err(err) = world.set_velocity(&body, spawn.velocity) {
            world.remove_body(body)?;
            return Err(err);
        }

        self.travelers.push(Traveler::new(
            spawn.region,
            body,
            spawn.position,
            spawn.source,
            size,
            paths,
            config,
        ));
        Ok(())
    }

    /// Re-size every traveler whose source landmark is in `frame`.
    ///
    /// Returns how many travelers picked up a depth.
    pub fn follow_depth(&mut self, frame: &LandmarkFrame, scale: &DepthScale) -> usize {
        self.travelers
            .iter_mut()
            .map(|t| t.follow_depth(frame, scale))
            .filter(|picked| *picked)
            .count()
    }

    /// Update, draw, then prune every traveler, newest first.
    pub fn step<W, R, S, C>(
        &mut self,
        paths: &PathTable,
        world: &mut W,
        sampler: &S,
        canvas: &mut C,
        config: &TravelerConfig,
        rng: &mut R,
    ) -> PoolStep
    where
        W: PhysicsWorld + ?Sized,
        R: Rng,
        S: ColorSampler + ?Sized,
        C: Canvas + ?Sized,
    {
        let mut report = PoolStep::default();

        for i in (0..self.travelers.len()).rev() {
            let traveler = &mut self.travelers[i];

            match traveler.update(paths, world, config, rng) {
                Ok(_) => report.updated += 1,
                Err(err) => {
                    warn!(region = %traveler.region(), error = %err, "retiring traveler");
                    traveler.retire();
                    report.faulted += 1;
                }
            }

            if let Some(position) = world.position(traveler.body()) {
                let color = sampler
                    .color_at(position.x, position.y)
                    .with_alpha(traveler.alpha(config.max_alpha));
                canvas.fill_disc(position, traveler.display_radius(), color);
                report.drawn += 1;
            }

            if traveler.is_dead() {
                // Everything past i has already been visited
                let dead = self.travelers.swap_remove(i);
                let region = dead.region();
                if let Err(err) = world.remove_body(dead.into_body()) {
                    warn!(%region, error = %err, "failed to deregister body");
                }
                report.pruned += 1;
            }
        }

        if report.pruned > 0 {
            trace!(pruned = report.pruned, live = self.travelers.len(), "pruned travelers");
        }
        report
    }

    /// Drop every traveler and deregister its body
    pub fn clear<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        for traveler in self.travelers.drain(..) {
            if let Err(err) = world.remove_body(traveler.into_body()) {
                warn!(error = %err, "failed to deregister body");
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Traveler> {
        self.travelers.iter()
    }

    pub fn len(&self) -> usize {
        self.travelers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.travelers.is_empty()
    }
}
