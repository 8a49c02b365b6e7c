//! Waypoint paths - the routes travelers follow toward the heart
//!
//! Every frame with a detected pose rebuilds all paths from that single
//! pose, so every path ends at the same heart point. Frames without a pose
//! leave the table untouched: travelers already in flight keep a target.

use std::collections::HashMap;
use std::sync::Arc;

use heartflow_core::pose_index::*;
use heartflow_core::{CanvasPoint, LandmarkFrame, PathConfig, PathKey, Pose, Region};
use tracing::{debug, trace};

use crate::CoordinateMapper;

/// An ordered, immutable list of waypoints (never empty).
///
/// Cloning shares the points; a rebuild produces a new allocation, so
/// [`WaypointPath::ptr_eq`] tells whether a path was replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPath {
    points: Arc<[CanvasPoint]>,
}

impl WaypointPath {
    /// `None` if `points` is empty
    pub fn new(points: Vec<CanvasPoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(WaypointPath {
            points: points.into(),
        })
    }

    pub fn get(&self, index: usize) -> Option<CanvasPoint> {
        self.points.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> CanvasPoint {
        self.points[self.points.len() - 1]
    }

    pub fn points(&self) -> &[CanvasPoint] {
        &self.points
    }

    /// Same allocation (not just equal values)
    pub fn ptr_eq(&self, other: &WaypointPath) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }
}

/// All current paths plus the heart they converge on
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    paths: HashMap<PathKey, WaypointPath>,
    heart: Option<CanvasPoint>,
    generation: u64,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: PathKey) -> Option<&WaypointPath> {
        self.paths.get(&key)
    }

    pub fn heart(&self) -> Option<CanvasPoint> {
        self.heart
    }

    /// Number of rebuilds applied so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Install a complete set of paths at once
    pub fn replace(&mut self, heart: CanvasPoint, paths: HashMap<PathKey, WaypointPath>) {
        self.heart = Some(heart);
        self.paths = paths;
        self.generation += 1;
    }
}

/// Path a traveler from `region` currently follows
pub fn path_for(region: Region, table: &PathTable) -> Option<&WaypointPath> {
    table.get(region.path_key())
}

/// Heart point: midway between the shoulders, pushed down by `offset_y`
pub fn heart_point(left_shoulder: CanvasPoint, right_shoulder: CanvasPoint, offset_y: f32) -> CanvasPoint {
    let mid = left_shoulder.midpoint(&right_shoulder);
    CanvasPoint::new(mid.x, mid.y + offset_y)
}

/// Canvas positions of the joints the paths are made of
struct Skeleton {
    left_shoulder: CanvasPoint,
    right_shoulder: CanvasPoint,
    left_elbow: CanvasPoint,
    right_elbow: CanvasPoint,
    left_wrist: CanvasPoint,
    right_wrist: CanvasPoint,
    left_hip: CanvasPoint,
    right_hip: CanvasPoint,
    left_knee: CanvasPoint,
    right_knee: CanvasPoint,
    left_foot: CanvasPoint,
    right_foot: CanvasPoint,
    mouth_left: CanvasPoint,
    mouth_right: CanvasPoint,
}

impl Skeleton {
    /// `None` if the pose is missing any joint a path needs
    fn from_pose(pose: &Pose, mapper: &CoordinateMapper) -> Option<Self> {
        let at = |index: usize| pose.landmark(index).map(|lm| mapper.to_canvas(lm));

        Some(Skeleton {
            left_shoulder: at(LEFT_SHOULDER)?,
            right_shoulder: at(RIGHT_SHOULDER)?,
            left_elbow: at(LEFT_ELBOW)?,
            right_elbow: at(RIGHT_ELBOW)?,
            left_wrist: at(LEFT_WRIST)?,
            right_wrist: at(RIGHT_WRIST)?,
            left_hip: at(LEFT_HIP)?,
            right_hip: at(RIGHT_HIP)?,
            left_knee: at(LEFT_KNEE)?,
            right_knee: at(RIGHT_KNEE)?,
            left_foot: at(LEFT_FOOT)?,
            right_foot: at(RIGHT_FOOT)?,
            mouth_left: at(MOUTH_LEFT)?,
            mouth_right: at(MOUTH_RIGHT)?,
        })
    }
}

/// Rebuilds the path table from landmark frames
#[derive(Debug, Clone)]
pub struct PathBuilder {
    mapper: CoordinateMapper,
    config: PathConfig,
    table: PathTable,
}

impl PathBuilder {
    pub fn new(mapper: CoordinateMapper, config: PathConfig) -> Self {
        PathBuilder {
            mapper,
            config,
            table: PathTable::new(),
        }
    }

    /// Rebuild every path from the frame's first pose.
    ///
    /// Returns `false` (table unchanged) when the frame has no usable pose.
    pub fn rebuild(&mut self, frame: Option<&LandmarkFrame>) -> bool {
        let Some(pose) = frame.and_then(|f| f.primary_pose()) else {
            debug!(generation = self.table.generation(), "no pose detected, keeping paths");
            return false;
        };

        let Some((heart, paths)) = Self::build(pose, &self.mapper, &self.config) else {
            debug!("pose is missing path joints, keeping paths");
            return false;
        };

        self.table.replace(heart, paths);
        trace!(generation = self.table.generation(), ?heart, "paths rebuilt");
        true
    }

    fn build(
        pose: &Pose,
        mapper: &CoordinateMapper,
        config: &PathConfig,
    ) -> Option<(CanvasPoint, HashMap<PathKey, WaypointPath>)> {
        let s = Skeleton::from_pose(pose, mapper)?;
        let heart = heart_point(s.left_shoulder, s.right_shoulder, config.heart_offset_y);
        let mouth_center = s.mouth_left.midpoint(&s.mouth_right);

        let routes = [
            (
                PathKey::LeftArm,
                vec![s.left_wrist, s.left_elbow, s.left_shoulder, heart],
            ),
            (
                PathKey::RightArm,
                vec![s.right_wrist, s.right_elbow, s.right_shoulder, heart],
            ),
            (PathKey::Face, vec![mouth_center, heart]),
            (
                PathKey::LeftLeg,
                vec![s.left_foot, s.left_knee, s.left_hip, s.left_shoulder, heart],
            ),
            (
                PathKey::RightLeg,
                vec![s.right_foot, s.right_knee, s.right_hip, s.right_shoulder, heart],
            ),
        ];

        let paths = routes
            .into_iter()
            .filter_map(|(key, points)| WaypointPath::new(points).map(|p| (key, p)))
            .collect();

        Some((heart, paths))
    }

    pub fn table(&self) -> &PathTable {
        &self.table
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }
}
