//! Navigation profiles - configurable behavior flags and tunables.
//!
//! Each profile defines the feature flags and numeric thresholds for one
//! navigation style. Loaded from assets/nav_profiles.txt at startup.

use std::fs;

use bevy::prelude::*;

use crate::constants::*;

/// Behavior parameters for one agent, loaded from the profiles file
#[derive(Debug, Clone)]
pub struct NavProfile {
    /// Profile name for display
    pub name: String,
    /// Route through the waypoint graph instead of walking straight at targets
    pub use_pathfinding: bool,
    /// Jump in place when the target sits almost directly overhead
    pub enable_jump_up_to_target_above: bool,
    /// Walk off ledges instead of jumping gaps when heading to a finish below
    pub enable_drop_down_at_finish: bool,
    /// Seconds between A* recomputes
    pub path_update_interval: f32,
    /// Distance at which a path waypoint counts as reached
    pub waypoint_reached_distance: f32,
    /// Seconds between jumps
    pub jump_cooldown: f32,
    /// Run-up required before a locked platform jump fires
    pub min_wall_clearance: f32,
    /// How long a platform lock may hold before expiring
    pub platform_lock_duration: f32,
    /// Height difference that counts as "target is above me"
    pub vertical_jump_threshold: f32,
    /// Seconds between stuck checks
    pub stuck_check_time: f32,
    /// Displacement below which the agent counts as stuck
    pub stuck_distance: f32,
    /// Seconds an objective may be held before rotating to the next
    pub target_switch_time: f32,
    /// Horizontal deadband before steering toward an objective
    pub direction_deadband: f32,
    /// Horizontal window for the jump-straight-up move
    pub jump_up_threshold: f32,
    /// Minimum height above for the jump-straight-up move
    pub jump_up_vertical_min: f32,
    /// Depth below which a finish triggers drop-down behavior
    pub drop_down_threshold: f32,
}

impl Default for NavProfile {
    fn default() -> Self {
        Self {
            name: "pathfinder".to_string(),
            use_pathfinding: true,
            enable_jump_up_to_target_above: false,
            enable_drop_down_at_finish: false,
            path_update_interval: PATH_UPDATE_INTERVAL,
            waypoint_reached_distance: WAYPOINT_REACHED_DISTANCE,
            jump_cooldown: JUMP_COOLDOWN,
            min_wall_clearance: MIN_WALL_CLEARANCE,
            platform_lock_duration: PLATFORM_LOCK_DURATION,
            vertical_jump_threshold: VERTICAL_JUMP_THRESHOLD,
            stuck_check_time: STUCK_CHECK_TIME,
            stuck_distance: STUCK_DISTANCE,
            target_switch_time: TARGET_SWITCH_TIME,
            direction_deadband: DIRECTION_DEADBAND,
            jump_up_threshold: JUMP_UP_THRESHOLD,
            jump_up_vertical_min: JUMP_UP_VERTICAL_MIN,
            drop_down_threshold: DROP_DOWN_THRESHOLD,
        }
    }
}

impl NavProfile {
    /// Sensor-driven profile that jumps at overhead targets and drops
    /// off ledges toward a finish below
    pub fn rulebased() -> Self {
        Self {
            name: "rulebased".to_string(),
            use_pathfinding: false,
            enable_jump_up_to_target_above: true,
            enable_drop_down_at_finish: true,
            ..Self::default()
        }
    }

    /// Bare nearest-target chaser with every optional behavior off
    pub fn greedy() -> Self {
        Self {
            name: "greedy".to_string(),
            use_pathfinding: false,
            ..Self::default()
        }
    }
}

/// Database of navigation profiles loaded from file
#[derive(Resource)]
pub struct NavProfileDatabase {
    profiles: Vec<NavProfile>,
}

impl Default for NavProfileDatabase {
    fn default() -> Self {
        Self::load_from_file(NAV_PROFILES_FILE)
    }
}

impl NavProfileDatabase {
    /// Load profiles from file, or return built-ins if it cannot be read
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read nav profiles file: {}, using built-ins", e);
                return Self::builtin();
            }
        };

        let profiles = parse_profiles(&content);
        if profiles.is_empty() {
            warn!("No profiles parsed from {}, using built-ins", path);
            return Self::builtin();
        }

        info!("Loaded {} nav profiles from {}", profiles.len(), path);
        Self { profiles }
    }

    fn builtin() -> Self {
        Self {
            profiles: vec![
                NavProfile::default(),
                NavProfile::rulebased(),
                NavProfile::greedy(),
            ],
        }
    }

    /// Get profile by name, falling back to the first profile
    pub fn by_name(&self, name: &str) -> &NavProfile {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .unwrap_or(&self.profiles[0])
    }

    /// Get profile by index, wrapping around if out of bounds
    pub fn get(&self, index: usize) -> &NavProfile {
        &self.profiles[index % self.profiles.len()]
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Parse profiles from file content
fn parse_profiles(content: &str) -> Vec<NavProfile> {
    let mut profiles = Vec::new();
    let mut current: Option<NavProfile> = None;

    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // New profile starts
        if let Some(name) = line.strip_prefix("profile:") {
            // Save previous profile if any
            if let Some(p) = current.take() {
                profiles.push(p);
            }
            current = Some(NavProfile {
                name: name.trim().to_string(),
                ..default()
            });
            continue;
        }

        // Parse key: value pairs
        let Some(profile) = current.as_mut() else {
            continue;
        };

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();

            match key {
                "use_pathfinding" => set_bool(value, &mut profile.use_pathfinding),
                "enable_jump_up_to_target_above" => {
                    set_bool(value, &mut profile.enable_jump_up_to_target_above)
                }
                "enable_drop_down_at_finish" => {
                    set_bool(value, &mut profile.enable_drop_down_at_finish)
                }
                "path_update_interval" => set_f32(value, &mut profile.path_update_interval),
                "waypoint_reached_distance" => {
                    set_f32(value, &mut profile.waypoint_reached_distance)
                }
                "jump_cooldown" => set_f32(value, &mut profile.jump_cooldown),
                "min_wall_clearance" => set_f32(value, &mut profile.min_wall_clearance),
                "platform_lock_duration" => set_f32(value, &mut profile.platform_lock_duration),
                "vertical_jump_threshold" => set_f32(value, &mut profile.vertical_jump_threshold),
                "stuck_check_time" => set_f32(value, &mut profile.stuck_check_time),
                "stuck_distance" => set_f32(value, &mut profile.stuck_distance),
                "target_switch_time" => set_f32(value, &mut profile.target_switch_time),
                "direction_deadband" => set_f32(value, &mut profile.direction_deadband),
                "jump_up_threshold" => set_f32(value, &mut profile.jump_up_threshold),
                "jump_up_vertical_min" => set_f32(value, &mut profile.jump_up_vertical_min),
                "drop_down_threshold" => set_f32(value, &mut profile.drop_down_threshold),
                _ => {}
            }
        }
    }

    // Don't forget the last profile
    if let Some(p) = current {
        profiles.push(p);
    }

    profiles
}

fn set_f32(value: &str, target: &mut f32) {
    if let Ok(v) = value.parse() {
        *target = v;
    }
}

fn set_bool(value: &str, target: &mut bool) {
    if let Ok(v) = value.parse() {
        *target = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_profiles() {
        let content = "\
# comment line
profile: careful
use_pathfinding: true
jump_cooldown: 1.5
stuck_distance: 0.2

profile: reckless
use_pathfinding: false
enable_jump_up_to_target_above: true
";
        let profiles = parse_profiles(content);
        assert_eq!(profiles.len(), 2);

        assert_eq!(profiles[0].name, "careful");
        assert!(profiles[0].use_pathfinding);
        assert_eq!(profiles[0].jump_cooldown, 1.5);
        assert_eq!(profiles[0].stuck_distance, 0.2);
        // Untouched keys keep their defaults
        assert_eq!(profiles[0].target_switch_time, TARGET_SWITCH_TIME);

        assert_eq!(profiles[1].name, "reckless");
        assert!(!profiles[1].use_pathfinding);
        assert!(profiles[1].enable_jump_up_to_target_above);
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let content = "\
profile: broken
jump_cooldown: not_a_number
use_pathfinding: maybe
";
        let profiles = parse_profiles(content);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].jump_cooldown, JUMP_COOLDOWN);
        assert!(profiles[0].use_pathfinding);
    }

    #[test]
    fn test_keys_before_any_profile_are_skipped() {
        let content = "jump_cooldown: 9.0\nprofile: only\n";
        let profiles = parse_profiles(content);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].jump_cooldown, JUMP_COOLDOWN);
    }

    #[test]
    fn test_missing_file_falls_back_to_builtins() {
        let db = NavProfileDatabase::load_from_file("does/not/exist.txt");
        assert_eq!(db.len(), 3);
        assert!(db.by_name("rulebased").enable_drop_down_at_finish);
        // Unknown names fall back to the first profile
        assert_eq!(db.by_name("nope").name, "pathfinder");
    }

    #[test]
    fn test_get_wraps_index() {
        let db = NavProfileDatabase::load_from_file("does/not/exist.txt");
        assert_eq!(db.get(0).name, db.get(3).name);
    }
}
