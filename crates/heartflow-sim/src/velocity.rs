//! Velocity estimation from per-point position samples
//!
//! One sample per tracked point, overwritten on every observation. The
//! estimate is a single finite difference between the previous sample and
//! the current one, converted to display units per physics step and
//! clamped to a maximum speed.

use std::collections::HashMap;

use heartflow_core::pose_index::{MOUTH_LEFT, MOUTH_RIGHT};
use heartflow_core::{CanvasPoint, FrameTime, Handedness, LandmarkFrame, Vec2, VelocityConfig};

/// Identity of a tracked point. This is the only key into the sample table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedPoint {
    /// A hand landmark (tip index) on the given hand
    Hand { handedness: Handedness, index: usize },
    /// A pose landmark by index
    Pose(usize),
    /// The derived midpoint between the mouth corners
    MouthCenter,
}

impl TrackedPoint {
    pub fn hand(handedness: Handedness, index: usize) -> Self {
        TrackedPoint::Hand { handedness, index }
    }

    /// Raw depth of this point in `frame`, if the frame still sees it
    pub fn z_in(&self, frame: &LandmarkFrame) -> Option<f32> {
        match *self {
            TrackedPoint::Hand { handedness, index } => frame
                .hands()
                .iter()
                .find(|hand| hand.handedness == handedness)
                .and_then(|hand| hand.landmark(index))
                .map(|l| l.z),
            TrackedPoint::Pose(index) => frame.primary_pose()?.landmark(index).map(|l| l.z),
            TrackedPoint::MouthCenter => {
                let pose = frame.primary_pose()?;
                let (left, right) = (pose.landmark(MOUTH_LEFT)?, pose.landmark(MOUTH_RIGHT)?);
                Some((left.z + right.z) / 2.0)
            }
        }
    }
}

/// Last observed position of a tracked point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipSample {
    pub position: CanvasPoint,
    pub time: FrameTime,
}

/// Per-point velocity estimator
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    config: VelocityConfig,
    samples: HashMap<TrackedPoint, TipSample>,
}

impl VelocityEstimator {
    pub fn new(config: VelocityConfig) -> Self {
        VelocityEstimator {
            config,
            samples: HashMap::new(),
        }
    }

    /// Estimate the velocity of `point` now that it is observed at `position`.
    ///
    /// Returns zero the first time a point is seen. The stored sample is
    /// replaced by the current one in every case.
    pub fn estimate(&mut self, point: TrackedPoint, position: CanvasPoint, now: FrameTime) -> Vec2 {
        let current = TipSample {
            position,
            time: now,
        };

        match self.samples.insert(point, current) {
            None => Vec2::ZERO,
            Some(prev) => {
                let dt = (now.millis_since(prev.time) as f32).max(self.config.min_dt_ms);
                let per_ms = (position - prev.position) * (1.0 / dt);
                (per_ms * self.config.step_ms).clamp_length(self.config.max_speed)
            }
        }
    }

    /// Last sample stored for `point`
    pub fn sample(&self, point: &TrackedPoint) -> Option<&TipSample> {
        self.samples.get(point)
    }

    /// Number of points ever observed
    pub fn tracked_count(&self) -> usize {
        self.samples.len()
    }

    pub fn config(&self) -> &VelocityConfig {
        &self.config
    }
}
