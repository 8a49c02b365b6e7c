//! Simulation configuration
//!
//! Every section carries the tuned defaults, so a JSON file only needs to
//! name the values it overrides.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{remap, HeartflowError, HeartflowResult, Vec2};

/// Display (canvas) dimensions
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 960.0,
            height: 720.0,
        }
    }
}

/// Fingertip/landmark velocity estimation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Duration of one physics step in milliseconds
    pub step_ms: f32,
    /// Maximum spawn speed in display units per step
    pub max_speed: f32,
    /// Floor for the sample interval in milliseconds
    pub min_dt_ms: f32,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        VelocityConfig {
            step_ms: 1000.0 / 60.0,
            max_speed: 15.0,
            min_dt_ms: 1.0,
        }
    }
}

/// Waypoint path geometry
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// How far below the shoulder line the heart sits
    pub heart_offset_y: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        PathConfig {
            heart_offset_y: 50.0,
        }
    }
}

/// Traveler lifecycle and pursuit force
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelerConfig {
    /// Steps a traveler may spend on one leg before it is stale
    pub max_age: u32,
    /// A leg is finished once the traveler is closer than this
    pub close_threshold: f32,
    /// No force is applied inside this distance
    pub min_pursuit_distance: f32,
    /// Distance at which the pursuit force saturates
    pub force_distance_max: f32,
    pub min_force: f32,
    pub max_force: f32,
    /// Fraction of `max_age` a traveler restarts at after each leg
    pub age_reset_min: f32,
    pub age_reset_max: f32,
    /// Alpha of a freshly spawned traveler (fades to 0 at `max_age`)
    pub max_alpha: f32,
}

impl Default for TravelerConfig {
    fn default() -> Self {
        TravelerConfig {
            max_age: 100,
            close_threshold: 10.0,
            min_pursuit_distance: 1.0,
            force_distance_max: 800.0,
            min_force: 0.0001,
            max_force: 0.005,
            age_reset_min: 0.4,
            age_reset_max: 0.6,
            max_alpha: 180.0,
        }
    }
}

impl TravelerConfig {
    /// Pursuit force magnitude for a given distance to target
    pub fn force_for_distance(&self, distance: f32) -> f32 {
        let d = distance.clamp(0.0, self.force_distance_max);
        remap(d, 0.0, self.force_distance_max, self.min_force, self.max_force)
    }
}

/// Physics body material
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyMaterial {
    pub friction: f32,
    /// Fraction of velocity lost per step to drag
    pub air_friction: f32,
    pub restitution: f32,
    pub density: f32,
}

impl Default for BodyMaterial {
    fn default() -> Self {
        BodyMaterial {
            friction: 0.01,
            air_friction: 0.03,
            restitution: 0.7,
            density: 0.01,
        }
    }
}

/// Physics world settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Acceleration applied to every body, integrated like force over mass
    pub gravity: Vec2,
    /// Enclose the canvas with static walls
    pub walls: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            gravity: Vec2::ZERO,
            walls: false,
        }
    }
}

/// Maps a relative depth to a traveler size (diameter)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthScale {
    pub near_z: f32,
    pub far_z: f32,
    pub near_size: f32,
    pub far_size: f32,
}

impl Default for DepthScale {
    fn default() -> Self {
        DepthScale {
            near_z: -0.2,
            far_z: 0.2,
            near_size: 14.0,
            far_size: 6.0,
        }
    }
}

impl DepthScale {
    /// Nearer points (more negative z) give larger travelers
    pub fn size_for(&self, z: f32) -> f32 {
        let (lo, hi) = if self.near_size < self.far_size {
            (self.near_size, self.far_size)
        } else {
            (self.far_size, self.near_size)
        };
        remap(z, self.near_z, self.far_z, self.near_size, self.far_size).clamp(lo, hi)
    }
}

/// Fingertip emission
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandEmitterConfig {
    pub enabled: bool,
    pub every_n_frames: u32,
    pub depth_gain: f32,
}

impl Default for HandEmitterConfig {
    fn default() -> Self {
        HandEmitterConfig {
            enabled: true,
            every_n_frames: 2,
            depth_gain: 1.0,
        }
    }
}

/// Mouth emission
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouthEmitterConfig {
    pub enabled: bool,
    pub count: u32,
    /// Half-width of the uniform spawn position jitter
    pub position_jitter: f32,
    /// Half-width of the uniform spawn velocity jitter
    pub velocity_jitter: f32,
    pub depth_gain: f32,
}

impl Default for MouthEmitterConfig {
    fn default() -> Self {
        MouthEmitterConfig {
            enabled: true,
            count: 2,
            position_jitter: 4.0,
            velocity_jitter: 0.5,
            depth_gain: 0.1,
        }
    }
}

/// Eye emission
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeEmitterConfig {
    pub enabled: bool,
    pub every_n_frames: u32,
    pub count_per_eye: u32,
    pub position_jitter: f32,
    pub velocity_jitter: f32,
    pub depth_gain: f32,
}

impl Default for EyeEmitterConfig {
    fn default() -> Self {
        EyeEmitterConfig {
            enabled: true,
            every_n_frames: 3,
            count_per_eye: 2,
            position_jitter: 3.0,
            velocity_jitter: 0.5,
            depth_gain: 0.1,
        }
    }
}

/// Foot emission along the leg paths
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegEmitterConfig {
    pub enabled: bool,
    pub every_n_frames: u32,
    pub count_per_foot: u32,
    pub position_jitter: f32,
    pub velocity_jitter: f32,
    pub depth_gain: f32,
}

impl Default for LegEmitterConfig {
    fn default() -> Self {
        LegEmitterConfig {
            enabled: true,
            every_n_frames: 4,
            count_per_foot: 1,
            position_jitter: 5.0,
            velocity_jitter: 0.5,
            depth_gain: 0.1,
        }
    }
}

/// Complete simulation configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub display: DisplayConfig,
    pub velocity: VelocityConfig,
    pub paths: PathConfig,
    pub traveler: TravelerConfig,
    pub material: BodyMaterial,
    pub world: WorldConfig,
    pub depth: DepthScale,
    pub hands: HandEmitterConfig,
    pub mouth: MouthEmitterConfig,
    pub eyes: EyeEmitterConfig,
    pub legs: LegEmitterConfig,
}

impl SimConfig {
    /// Fewer travelers for slow machines
    pub fn sparse() -> Self {
        let mut config = SimConfig::default();
        config.hands.every_n_frames = 4;
        config.mouth.count = 1;
        config.eyes.every_n_frames = 6;
        config.eyes.count_per_eye = 1;
        config.legs.every_n_frames = 8;
        config.traveler.max_age = 80;
        config
    }

    /// Full-HD canvas
    pub fn hd() -> Self {
        SimConfig {
            display: DisplayConfig {
                width: 1920.0,
                height: 1080.0,
            },
            ..SimConfig::default()
        }
    }

    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json_str(json: &str) -> HeartflowResult<Self> {
        SimConfig::default().overlay_json(json)
    }

    /// Apply a (possibly partial) JSON config on top of `self`.
    ///
    /// Fields the JSON names replace the ones in `self`, nested sections
    /// are merged key by key, and the result is validated.
    pub fn overlay_json(&self, json: &str) -> HeartflowResult<Self> {
        let parse = |e: serde_json::Error| HeartflowError::ConfigParse(e.to_string());

        let overrides: Value = serde_json::from_str(json).map_err(parse)?;
        if !overrides.is_object() {
            return Err(HeartflowError::ConfigParse("expected a JSON object".into()));
        }
        let mut merged = serde_json::to_value(self).map_err(parse)?;
        merge_json(&mut merged, overrides);

        let config: SimConfig = serde_json::from_value(merged).map_err(parse)?;
        if let Err(err) = config.validate() {
            warn!(error = %err, "rejected configuration");
            return Err(err);
        }
        Ok(config)
    }

    pub fn validate(&self) -> HeartflowResult<()> {
        let d = &self.display;
        if !(d.width > 0.0 && d.height > 0.0) {
            return Err(HeartflowError::InvalidDisplaySize {
                width: d.width,
                height: d.height,
            });
        }

        let v = &self.velocity;
        if !(v.step_ms > 0.0) {
            return Err(HeartflowError::config("velocity.step_ms", "must be positive"));
        }
        if !(v.max_speed > 0.0) {
            return Err(HeartflowError::config("velocity.max_speed", "must be positive"));
        }
        if !(v.min_dt_ms > 0.0) {
            return Err(HeartflowError::config("velocity.min_dt_ms", "must be positive"));
        }

        let t = &self.traveler;
        if t.max_age == 0 {
            return Err(HeartflowError::config("traveler.max_age", "must be non-zero"));
        }
        if !(t.force_distance_max > 0.0) {
            return Err(HeartflowError::config(
                "traveler.force_distance_max",
                "must be positive",
            ));
        }
        if !(t.min_force >= 0.0 && t.min_force <= t.max_force) {
            return Err(HeartflowError::config(
                "traveler.min_force",
                format!("need 0 <= min_force <= max_force, got {} > {}", t.min_force, t.max_force),
            ));
        }
        if !(t.age_reset_min > 0.0 && t.age_reset_min <= t.age_reset_max && t.age_reset_max <= 1.0)
        {
            return Err(HeartflowError::config(
                "traveler.age_reset_min",
                "need 0 < age_reset_min <= age_reset_max <= 1",
            ));
        }

        let m = &self.material;
        if !(m.density > 0.0) {
            return Err(HeartflowError::config("material.density", "must be positive"));
        }
        if !(0.0..=1.0).contains(&m.air_friction) {
            return Err(HeartflowError::config("material.air_friction", "must be within [0, 1]"));
        }

        if self.depth.near_size <= 0.0 || self.depth.far_size <= 0.0 {
            return Err(HeartflowError::config("depth", "sizes must be positive"));
        }

        for (field, every) in [
            ("hands.every_n_frames", self.hands.every_n_frames),
            ("eyes.every_n_frames", self.eyes.every_n_frames),
            ("legs.every_n_frames", self.legs.every_n_frames),
        ] {
            if every == 0 {
                return Err(HeartflowError::config(field, "must be non-zero"));
            }
        }

        Ok(())
    }
}

fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(SimConfig::sparse().validate().is_ok());
        assert!(SimConfig::hd().validate().is_ok());
    }

    #[test]
    fn test_force_mapping() {
        let t = TravelerConfig::default();

        assert!((t.force_for_distance(0.0) - 0.0001).abs() < 1e-9);
        assert!((t.force_for_distance(800.0) - 0.005).abs() < 1e-9);
        // Saturates beyond the distance range
        assert!((t.force_for_distance(5000.0) - 0.005).abs() < 1e-9);
        assert!(t.force_for_distance(200.0) < t.force_for_distance(400.0));
    }

    #[test]
    fn test_depth_scale() {
        let depth = DepthScale::default();

        assert!((depth.size_for(0.0) - 10.0).abs() < 1e-5);
        assert_eq!(depth.size_for(-1.0), 14.0);
        assert_eq!(depth.size_for(1.0), 6.0);
        assert!(depth.size_for(-0.1) > depth.size_for(0.1));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = SimConfig::from_json_str(
            r#"{ "display": { "width": 640 }, "eyes": { "count_per_eye": 5 } }"#,
        )
        .unwrap();

        assert_eq!(config.display.width, 640.0);
        assert_eq!(config.display.height, 720.0);
        assert_eq!(config.eyes.count_per_eye, 5);
        assert_eq!(config.eyes.every_n_frames, 3);
    }

    #[test]
    fn test_overlay_keeps_preset_values() {
        let config = SimConfig::hd()
            .overlay_json(r#"{ "mouth": { "count": 4 }, "display": { "height": 1200 } }"#)
            .unwrap();

        assert_eq!(config.display.width, 1920.0);
        assert_eq!(config.display.height, 1200.0);
        assert_eq!(config.mouth.count, 4);
        assert_eq!(config.hands, SimConfig::hd().hands);

        let sparse = SimConfig::sparse().overlay_json("{}").unwrap();
        assert_eq!(sparse, SimConfig::sparse());
    }

    #[test]
    fn test_overlay_validates_result() {
        assert!(matches!(
            SimConfig::hd().overlay_json(r#"{ "display": { "width": 0 } }"#),
            Err(HeartflowError::InvalidDisplaySize { .. })
        ));
        assert!(matches!(
            SimConfig::default().overlay_json("[1, 2]"),
            Err(HeartflowError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = SimConfig::default();
        config.display.width = 0.0;
        assert!(matches!(
            config.validate(),
            Err(HeartflowError::InvalidDisplaySize { .. })
        ));

        let mut config = SimConfig::default();
        config.hands.every_n_frames = 0;
        assert!(matches!(
            config.validate(),
            Err(HeartflowError::InvalidConfig { field: "hands.every_n_frames", .. })
        ));

        let mut config = SimConfig::default();
        config.traveler.min_force = 1.0;
        assert!(config.validate().is_err());

        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(HeartflowError::ConfigParse(_))
        ));
    }
}
