//! Landmark frames - what the external tracker hands us each frame
//!
//! Coordinates are normalized: x and y in [0, 1] relative to the camera
//! image, z a signed relative depth (negative = nearer the camera).
//! Every set is optional. A missing set means "no detection this frame",
//! which is different from a detection at the origin.

use serde::{Deserialize, Serialize};

/// Pose landmark indices (33-point body model)
pub mod pose_index {
    pub const NOSE: usize = 0;
    pub const LEFT_EYE: usize = 2;
    pub const RIGHT_EYE: usize = 5;
    pub const MOUTH_LEFT: usize = 9;
    pub const MOUTH_RIGHT: usize = 10;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_FOOT: usize = 27;
    pub const RIGHT_FOOT: usize = 28;

    /// Total landmarks in a full pose
    pub const COUNT: usize = 33;
}

/// Hand landmark indices (21-point hand model)
pub mod hand_index {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;

    /// Thumb plus the four fingertips
    pub const TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

    /// Total landmarks in a hand
    pub const COUNT: usize = 21;
}

/// A single tracked anatomical point (normalized coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Which hand the tracker believes it saw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

/// One detected hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub landmarks: Vec<Landmark>,
}

impl DetectedHand {
    pub fn new(handedness: Handedness, landmarks: Vec<Landmark>) -> Self {
        Self {
            handedness,
            landmarks,
        }
    }

    /// Landmark by index, `None` if the tracker returned fewer points
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}

/// One detected body pose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose {
    pub landmarks: Vec<Landmark>,
}

impl Pose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}

/// One detected face mesh
///
/// Carried through for collaborators that want it; the particle
/// simulation reads eyes and mouth from the pose instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceMesh {
    pub landmarks: Vec<Landmark>,
}

/// Everything the tracker produced for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Detected hands (`None` = hand tracking produced no result)
    #[serde(default)]
    pub hands: Option<Vec<DetectedHand>>,

    /// Detected poses (`None` = pose tracking produced no result)
    #[serde(default)]
    pub poses: Option<Vec<Pose>>,

    /// Detected face meshes
    #[serde(default)]
    pub faces: Option<Vec<FaceMesh>>,
}

impl LandmarkFrame {
    /// A frame with no detections at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hands(mut self, hands: Vec<DetectedHand>) -> Self {
        self.hands = Some(hands);
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.poses.get_or_insert_with(Vec::new).push(pose);
        self
    }

    pub fn with_faces(mut self, faces: Vec<FaceMesh>) -> Self {
        self.faces = Some(faces);
        self
    }

    /// The first detected pose.
    ///
    /// Only a single subject is tracked: additional poses are accepted
    /// as input but ignored.
    pub fn primary_pose(&self) -> Option<&Pose> {
        self.poses.as_ref().and_then(|poses| poses.first())
    }

    /// Detected hands, empty when hand tracking produced nothing
    pub fn hands(&self) -> &[DetectedHand] {
        self.hands.as_deref().unwrap_or(&[])
    }

    pub fn has_hands(&self) -> bool {
        !self.hands().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_pose_absent() {
        let frame = LandmarkFrame::empty();
        assert!(frame.primary_pose().is_none());

        let zero_poses = LandmarkFrame {
            poses: Some(Vec::new()),
            ..Default::default()
        };
        assert!(zero_poses.primary_pose().is_none());
    }

    #[test]
    fn test_primary_pose_is_first() {
        let first = Pose::new(vec![Landmark::new(0.1, 0.1, 0.0)]);
        let second = Pose::new(vec![Landmark::new(0.9, 0.9, 0.0)]);
        let frame = LandmarkFrame::empty().with_pose(first.clone()).with_pose(second);

        assert_eq!(frame.primary_pose(), Some(&first));
    }

    #[test]
    fn test_missing_landmark_is_none() {
        let hand = DetectedHand::new(Handedness::Left, vec![Landmark::default(); 5]);
        assert!(hand.landmark(hand_index::THUMB_TIP).is_some());
        assert!(hand.landmark(hand_index::INDEX_TIP).is_none());
    }

    #[test]
    fn test_frame_json_shape() {
        let json = r#"{
            "hands": [{"handedness": "Right", "landmarks": [{"x": 0.5, "y": 0.25}]}],
            "poses": [[{"x": 0.1, "y": 0.2, "z": -0.3}]]
        }"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.hands()[0].handedness, Handedness::Right);
        assert_eq!(frame.hands()[0].landmarks[0].z, 0.0);
        assert_eq!(
            frame.primary_pose().unwrap().landmark(0),
            Some(&Landmark::new(0.1, 0.2, -0.3))
        );
        assert!(frame.faces.is_none());
    }
}
