//! Regions - the logical source of a traveler

use serde::{Deserialize, Serialize};

use crate::Handedness;

/// Where a traveler was spawned from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    LeftArm,
    RightArm,
    Mouth,
    Eyes,
    LeftLeg,
    RightLeg,
}

/// Which waypoint path a region follows.
///
/// Mouth and eyes share one path; everything else has its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathKey {
    LeftArm,
    RightArm,
    Face,
    LeftLeg,
    RightLeg,
}

impl PathKey {
    pub fn all() -> &'static [PathKey] {
        &[
            PathKey::LeftArm,
            PathKey::RightArm,
            PathKey::Face,
            PathKey::LeftLeg,
            PathKey::RightLeg,
        ]
    }
}

impl Region {
    pub fn all() -> &'static [Region] {
        &[
            Region::LeftArm,
            Region::RightArm,
            Region::Mouth,
            Region::Eyes,
            Region::LeftLeg,
            Region::RightLeg,
        ]
    }

    /// Number of regions
    pub fn count() -> usize {
        6
    }

    /// Position in [`Region::all`]
    pub fn index(&self) -> usize {
        match self {
            Region::LeftArm => 0,
            Region::RightArm => 1,
            Region::Mouth => 2,
            Region::Eyes => 3,
            Region::LeftLeg => 4,
            Region::RightLeg => 5,
        }
    }

    /// Arm region for a tracked hand
    pub fn arm(handedness: Handedness) -> Region {
        match handedness {
            Handedness::Left => Region::LeftArm,
            Handedness::Right => Region::RightArm,
        }
    }

    pub fn path_key(&self) -> PathKey {
        match self {
            Region::LeftArm => PathKey::LeftArm,
            Region::RightArm => PathKey::RightArm,
            Region::Mouth | Region::Eyes => PathKey::Face,
            Region::LeftLeg => PathKey::LeftLeg,
            Region::RightLeg => PathKey::RightLeg,
        }
    }

    /// Waypoint index a fresh traveler starts at, given its path length.
    ///
    /// Face travelers are spawned at the mouth or eyes already, so they
    /// skip the first waypoint when there is somewhere else to go.
    pub fn entry_index(&self, path_len: usize) -> usize {
        match self {
            Region::Mouth | Region::Eyes if path_len > 1 => 1,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::LeftArm => "left-arm",
            Region::RightArm => "right-arm",
            Region::Mouth => "mouth",
            Region::Eyes => "eyes",
            Region::LeftLeg => "left-leg",
            Region::RightLeg => "right-leg",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_regions_share_path() {
        assert_eq!(Region::Mouth.path_key(), PathKey::Face);
        assert_eq!(Region::Eyes.path_key(), PathKey::Face);
        assert_ne!(Region::LeftArm.path_key(), Region::RightArm.path_key());
    }

    #[test]
    fn test_entry_index() {
        assert_eq!(Region::Mouth.entry_index(2), 1);
        assert_eq!(Region::Eyes.entry_index(2), 1);
        assert_eq!(Region::Eyes.entry_index(1), 0);
        assert_eq!(Region::LeftArm.entry_index(4), 0);
        assert_eq!(Region::RightLeg.entry_index(5), 0);
    }

    #[test]
    fn test_arm_from_handedness() {
        assert_eq!(Region::arm(Handedness::Left), Region::LeftArm);
        assert_eq!(Region::arm(Handedness::Right), Region::RightArm);
        assert_eq!(Region::all().len(), Region::count());
    }

    #[test]
    fn test_index_matches_all() {
        for (i, region) in Region::all().iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }
}
