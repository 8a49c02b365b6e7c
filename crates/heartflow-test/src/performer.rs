//! Synthetic Performer - deterministic landmark frames without a camera
//!
//! Simulates:
//! - A standing figure swaying side to side
//! - Both hands waving around the wrists
//! - Per-landmark tracker noise
//! - Detection dropouts (whole frames and pose-only)

use std::f32::consts::TAU;

use heartflow_core::pose_index::*;
use heartflow_core::{hand_index, DetectedHand, Handedness, Landmark, LandmarkFrame, Pose};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Rest position of every pose landmark the pipeline reads
const REST_POSE: [(usize, f32, f32, f32); 16] = [
    (LEFT_EYE, 0.53, 0.15, -0.30),
    (RIGHT_EYE, 0.47, 0.15, -0.30),
    (MOUTH_LEFT, 0.52, 0.20, -0.28),
    (MOUTH_RIGHT, 0.48, 0.20, -0.28),
    (LEFT_SHOULDER, 0.60, 0.30, -0.10),
    (RIGHT_SHOULDER, 0.40, 0.30, -0.10),
    (LEFT_ELBOW, 0.70, 0.45, -0.05),
    (RIGHT_ELBOW, 0.30, 0.45, -0.05),
    (LEFT_WRIST, 0.75, 0.60, -0.10),
    (RIGHT_WRIST, 0.25, 0.60, -0.10),
    (LEFT_HIP, 0.56, 0.60, 0.0),
    (RIGHT_HIP, 0.44, 0.60, 0.0),
    (LEFT_KNEE, 0.57, 0.75, 0.05),
    (RIGHT_KNEE, 0.43, 0.75, 0.05),
    (LEFT_FOOT, 0.58, 0.90, 0.10),
    (RIGHT_FOOT, 0.42, 0.90, 0.10),
];

/// Performer behavior
#[derive(Clone, Debug)]
pub struct PerformerConfig {
    /// Horizontal sway, normalized units
    pub sway_amplitude: f32,
    /// Frames per full sway cycle
    pub sway_period: u32,
    /// Fingertip orbit radius around the wrist, normalized units
    pub wave_radius: f32,
    /// Uniform per-landmark noise, normalized units
    pub noise: f32,
    /// Probability a frame has no detection at all
    pub dropout_rate: f64,
    /// Probability a detected frame is missing the pose
    pub pose_dropout_rate: f64,
    pub show_hands: bool,
}

impl Default for PerformerConfig {
    fn default() -> Self {
        Self::dancing()
    }
}

impl PerformerConfig {
    /// Motionless, noiseless, always detected
    pub fn still() -> Self {
        PerformerConfig {
            sway_amplitude: 0.0,
            sway_period: 120,
            wave_radius: 0.0,
            noise: 0.0,
            dropout_rate: 0.0,
            pose_dropout_rate: 0.0,
            show_hands: true,
        }
    }

    /// Steady movement with light noise
    pub fn dancing() -> Self {
        PerformerConfig {
            sway_amplitude: 0.05,
            sway_period: 90,
            wave_radius: 0.03,
            noise: 0.002,
            dropout_rate: 0.0,
            pose_dropout_rate: 0.0,
            show_hands: true,
        }
    }

    /// Dancing, seen by an unreliable tracker
    pub fn flaky() -> Self {
        PerformerConfig {
            noise: 0.01,
            dropout_rate: 0.15,
            pose_dropout_rate: 0.2,
            ..Self::dancing()
        }
    }
}

/// Seeded landmark frame generator
pub struct SyntheticPerformer {
    config: PerformerConfig,
    rng: StdRng,
    frame: u64,
}

impl SyntheticPerformer {
    pub fn new(config: PerformerConfig, seed: u64) -> Self {
        SyntheticPerformer {
            config,
            rng: StdRng::seed_from_u64(seed),
            frame: 0,
        }
    }

    /// Produce the next tracker result; `None` is a frame with no detection
    pub fn next_frame(&mut self) -> Option<LandmarkFrame> {
        let t = self.frame;
        self.frame += 1;

        if self.rng.gen_bool(self.config.dropout_rate) {
            return None;
        }

        let sway = self.sway(t);
        let mut frame = LandmarkFrame::empty();
        if !self.rng.gen_bool(self.config.pose_dropout_rate) {
            frame = frame.with_pose(self.pose(sway));
        }
        if self.config.show_hands {
            let hands = vec![
                self.hand(Handedness::Left, 0.75 + sway, 0.62, t),
                self.hand(Handedness::Right, 0.25 + sway, 0.62, t),
            ];
            frame = frame.with_hands(hands);
        }
        Some(frame)
    }

    /// The rest skeleton shifted by `dx`, without noise
    pub fn rest_pose(dx: f32) -> Pose {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); COUNT];
        for &(index, x, y, z) in REST_POSE.iter() {
            landmarks[index] = Landmark::new(x + dx, y, z);
        }
        Pose::new(landmarks)
    }

    pub fn frames_generated(&self) -> u64 {
        self.frame
    }

    fn sway(&self, t: u64) -> f32 {
        let period = self.config.sway_period.max(1) as f32;
        let phase = (t % self.config.sway_period.max(1) as u64) as f32 / period;
        self.config.sway_amplitude * (phase * TAU).sin()
    }

    fn pose(&mut self, dx: f32) -> Pose {
        let mut pose = Self::rest_pose(dx);
        for &(index, _, _, _) in REST_POSE.iter() {
            let jitter = self.noise();
            let lm = &mut pose.landmarks[index];
            lm.x += jitter.0;
            lm.y += jitter.1;
        }
        pose
    }

    fn hand(&mut self, handedness: Handedness, wrist_x: f32, wrist_y: f32, t: u64) -> DetectedHand {
        let mut landmarks = vec![Landmark::new(wrist_x, wrist_y, -0.05); hand_index::COUNT];
        let wave = t as f32 * 0.15;

        for (finger, &tip) in hand_index::TIPS.iter().enumerate() {
            // Fan the fingers upward from the wrist
            let angle = wave + finger as f32 * 0.4;
            let (nx, ny) = self.noise();
            landmarks[tip] = Landmark::new(
                wrist_x + self.config.wave_radius * angle.cos() + nx,
                wrist_y - 0.08 + self.config.wave_radius * angle.sin() + ny,
                -0.05 - 0.01 * finger as f32,
            );
        }
        DetectedHand::new(handedness, landmarks)
    }

    fn noise(&mut self) -> (f32, f32) {
        let n = self.config.noise;
        if n <= 0.0 {
            return (0.0, 0.0);
        }
        (self.rng.gen_range(-n..=n), self.rng.gen_range(-n..=n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_performer_is_constant() {
        let mut performer = SyntheticPerformer::new(PerformerConfig::still(), 1);
        let a = performer.next_frame().unwrap();
        let b = performer.next_frame().unwrap();

        assert_eq!(a, b);
        assert_eq!(a.primary_pose(), Some(&SyntheticPerformer::rest_pose(0.0)));
        assert_eq!(a.hands().len(), 2);
        assert_eq!(performer.frames_generated(), 2);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = SyntheticPerformer::new(PerformerConfig::flaky(), 42);
        let mut b = SyntheticPerformer::new(PerformerConfig::flaky(), 42);

        for _ in 0..50 {
            assert_eq!(a.next_frame(), b.next_frame());
        }
    }

    #[test]
    fn test_flaky_drops_frames() {
        let mut performer = SyntheticPerformer::new(PerformerConfig::flaky(), 7);
        let frames: Vec<_> = (0..400).map(|_| performer.next_frame()).collect();

        let dropped = frames.iter().filter(|f| f.is_none()).count();
        let no_pose = frames.iter().flatten().filter(|f| f.primary_pose().is_none()).count();
        assert!(dropped > 20 && dropped < 120, "dropped {dropped}");
        assert!(no_pose > 20, "no pose {no_pose}");
    }

    #[test]
    fn test_sway_moves_the_figure() {
        let mut performer = SyntheticPerformer::new(
            PerformerConfig {
                noise: 0.0,
                ..PerformerConfig::dancing()
            },
            3,
        );
        let xs: Vec<f32> = (0..90)
            .filter_map(|_| performer.next_frame())
            .filter_map(|f| f.primary_pose().map(|p| p.landmarks[LEFT_SHOULDER].x))
            .collect();

        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 0.09);
        assert!(min > 0.54 && max < 0.66);
    }
}
