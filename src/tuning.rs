//! Global movement tuning (decoupled from the per-profile navigation flags)

use bevy::log::warn;
use bevy::prelude::{Resource, Vec2};
use serde::{Deserialize, Serialize};

use crate::ai::SensorConfig;
use crate::constants::*;
use crate::world::{LAYER_GROUND, LAYER_HAZARD, LAYER_WALL};

fn default_move_speed() -> f32 {
    MOVE_SPEED
}
fn default_air_control() -> f32 {
    AIR_CONTROL_MULTIPLIER
}
fn default_jump_force() -> f32 {
    JUMP_FORCE
}
fn default_gravity() -> f32 {
    GRAVITY
}
fn default_fall_multiplier() -> f32 {
    FALL_MULTIPLIER
}
fn default_wall_check_distance() -> f32 {
    WALL_CHECK_DISTANCE
}
fn default_edge_check_distance() -> f32 {
    EDGE_CHECK_DISTANCE
}
fn default_platform_check_forward() -> f32 {
    PLATFORM_CHECK_FORWARD_DIST
}
fn default_platform_check_upward() -> f32 {
    PLATFORM_CHECK_UPWARD_DIST
}
fn default_hazard_check_distance() -> f32 {
    HAZARD_CHECK_DISTANCE
}
fn default_collection_radius() -> f32 {
    COLLECTION_RADIUS
}

/// Serializable movement and sensor tuning stored in config
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct NavTuning {
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_air_control")]
    pub air_control_multiplier: f32,
    #[serde(default = "default_jump_force")]
    pub jump_force: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_fall_multiplier")]
    pub fall_multiplier: f32,
    #[serde(default = "default_wall_check_distance")]
    pub wall_check_distance: f32,
    #[serde(default = "default_edge_check_distance")]
    pub edge_check_distance: f32,
    #[serde(default = "default_platform_check_forward")]
    pub platform_check_forward_dist: f32,
    #[serde(default = "default_platform_check_upward")]
    pub platform_check_upward_dist: f32,
    #[serde(default = "default_hazard_check_distance")]
    pub hazard_check_distance: f32,
    #[serde(default = "default_collection_radius")]
    pub collection_radius: f32,
}

impl Default for NavTuning {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            air_control_multiplier: default_air_control(),
            jump_force: default_jump_force(),
            gravity: default_gravity(),
            fall_multiplier: default_fall_multiplier(),
            wall_check_distance: default_wall_check_distance(),
            edge_check_distance: default_edge_check_distance(),
            platform_check_forward_dist: default_platform_check_forward(),
            platform_check_upward_dist: default_platform_check_upward(),
            hazard_check_distance: default_hazard_check_distance(),
            collection_radius: default_collection_radius(),
        }
    }
}

impl NavTuning {
    /// Load from the config file, or fall back to defaults
    pub fn load_or_default() -> Self {
        match load_nav_tuning_from_file(NAV_TUNING_FILE) {
            Ok(tuning) => tuning,
            Err(err) => {
                warn!("{}, using default tuning", err);
                Self::default()
            }
        }
    }

    /// Sensor configuration with the tuned probe distances and the
    /// standard layer assignment
    pub fn sensor_config(&self) -> SensorConfig {
        SensorConfig {
            ground_layer: LAYER_GROUND,
            wall_layer: LAYER_WALL,
            hazard_layer: LAYER_HAZARD,
            ground_check_offset: Vec2::new(0.0, -AGENT_SIZE.y / 2.0),
            ground_check_radius: GROUND_CHECK_RADIUS,
            wall_check_distance: self.wall_check_distance,
            edge_check_distance: self.edge_check_distance,
            platform_check_forward_dist: self.platform_check_forward_dist,
            platform_check_upward_dist: self.platform_check_upward_dist,
            hazard_check_distance: self.hazard_check_distance,
            platform_min_clearance: PLATFORM_MIN_CLEARANCE,
            platform_max_reach: PLATFORM_MAX_REACH,
        }
    }
}

pub fn load_nav_tuning_from_file(path: &str) -> Result<NavTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults_for_missing_fields() {
        let tuning: NavTuning = serde_json::from_str(r#"{"move_speed": 7.5}"#).unwrap();
        assert_eq!(tuning.move_speed, 7.5);
        assert_eq!(tuning.jump_force, JUMP_FORCE);
        assert_eq!(tuning.hazard_check_distance, HAZARD_CHECK_DISTANCE);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_nav_tuning_from_file("does/not/exist.json").is_err());
    }

    #[test]
    fn test_sensor_config_carries_tuned_distances() {
        let tuning = NavTuning {
            wall_check_distance: 9.0,
            ..NavTuning::default()
        };
        let config = tuning.sensor_config();
        assert_eq!(config.wall_check_distance, 9.0);
        assert_eq!(config.ground_layer, LAYER_GROUND);
        assert_eq!(config.hazard_layer, LAYER_HAZARD);
    }
}
