//! Environment sensor - directional ray and overlap probes.
//!
//! Wraps the raw physics queries into the handful of questions the
//! locomotion controller actually asks: am I grounded, is there a wall,
//! a ledge, a gap, a hazard in the direction I'm walking. All probes are
//! pure reads of the current physics snapshot.

use bevy::prelude::*;

use crate::constants::*;
use crate::world::{LayerMask, PhysicsProbe};

/// Layer masks and probe distances for one agent's sensors.
///
/// Unset layer masks are allowed; any probe filtered by an empty mask
/// simply reports its neutral answer.
#[derive(Clone, Debug)]
pub struct SensorConfig {
    pub ground_layer: LayerMask,
    pub wall_layer: LayerMask,
    pub hazard_layer: LayerMask,
    /// Ground-check point relative to the agent position
    pub ground_check_offset: Vec2,
    pub ground_check_radius: f32,
    pub wall_check_distance: f32,
    pub edge_check_distance: f32,
    pub platform_check_forward_dist: f32,
    pub platform_check_upward_dist: f32,
    pub hazard_check_distance: f32,
    /// Reachable-ledge height band above the agent
    pub platform_min_clearance: f32,
    pub platform_max_reach: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ground_layer: LayerMask::NONE,
            wall_layer: LayerMask::NONE,
            hazard_layer: LayerMask::NONE,
            ground_check_offset: Vec2::new(0.0, -AGENT_SIZE.y / 2.0),
            ground_check_radius: GROUND_CHECK_RADIUS,
            wall_check_distance: WALL_CHECK_DISTANCE,
            edge_check_distance: EDGE_CHECK_DISTANCE,
            platform_check_forward_dist: PLATFORM_CHECK_FORWARD_DIST,
            platform_check_upward_dist: PLATFORM_CHECK_UPWARD_DIST,
            hazard_check_distance: HAZARD_CHECK_DISTANCE,
            platform_min_clearance: PLATFORM_MIN_CLEARANCE,
            platform_max_reach: PLATFORM_MAX_REACH,
        }
    }
}

/// Stateless probe bundle; all per-tick state lives in the controller
#[derive(Clone, Debug, Default)]
pub struct EnvironmentSensor {
    pub config: SensorConfig,
}

impl EnvironmentSensor {
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    /// Overlap test at the ground-check point
    pub fn is_grounded(&self, world: &dyn PhysicsProbe, pos: Vec2) -> bool {
        world.overlap_circle(
            pos + self.config.ground_check_offset,
            self.config.ground_check_radius,
            self.config.ground_layer,
        )
    }

    /// Horizontal ray from chest height; walls and ground both block
    pub fn has_wall_ahead(&self, world: &dyn PhysicsProbe, pos: Vec2, direction: f32) -> bool {
        if direction == 0.0 {
            return false;
        }
        let origin = pos + Vec2::Y * WALL_PROBE_HEIGHT;
        world
            .raycast(
                origin,
                Vec2::X * direction.signum(),
                self.config.wall_check_distance,
                self.config.wall_layer | self.config.ground_layer,
            )
            .is_some()
    }

    /// Distance to the nearest wall ahead, probing twice as far as the
    /// wall check. Returns [`WALL_DISTANCE_NONE`] when nothing is hit.
    pub fn wall_distance(&self, world: &dyn PhysicsProbe, pos: Vec2, direction: f32) -> f32 {
        if direction == 0.0 {
            return WALL_DISTANCE_NONE;
        }
        let origin = pos + Vec2::Y * WALL_PROBE_HEIGHT;
        world
            .raycast(
                origin,
                Vec2::X * direction.signum(),
                self.config.wall_check_distance * 2.0,
                self.config.wall_layer | self.config.ground_layer,
            )
            .map_or(WALL_DISTANCE_NONE, |hit| hit.distance)
    }

    /// Short downward ray one step ahead; false means a gap is coming.
    /// With no direction there is nothing to fall into, so this is true.
    pub fn has_ground_ahead(&self, world: &dyn PhysicsProbe, pos: Vec2, direction: f32) -> bool {
        if direction == 0.0 {
            return true;
        }
        let origin = pos + Vec2::X * direction.signum() * self.config.edge_check_distance;
        world
            .raycast(origin, Vec2::NEG_Y, DROP_PROBE_DEPTH, self.config.ground_layer)
            .is_some()
    }

    /// Upward ray from a point ahead of the agent. Only a hit inside the
    /// configured height band counts: anything lower is not a ledge worth
    /// mounting, anything higher cannot be reached with a jump.
    pub fn has_platform_above(&self, world: &dyn PhysicsProbe, pos: Vec2, direction: f32) -> bool {
        if direction == 0.0 {
            return false;
        }
        let origin = pos + Vec2::X * direction.signum() * self.config.platform_check_forward_dist;
        let Some(hit) = world.raycast(
            origin,
            Vec2::Y,
            self.config.platform_check_upward_dist,
            self.config.ground_layer,
        ) else {
            return false;
        };

        let height = hit.point.y - pos.y;
        height > self.config.platform_min_clearance && height < self.config.platform_max_reach
    }

    /// Scan downward rays at increasing forward offsets until a hazard is
    /// found or the scan range runs out
    pub fn has_hazard_ahead(&self, world: &dyn PhysicsProbe, pos: Vec2, direction: f32) -> bool {
        if direction == 0.0 {
            return false;
        }
        let step_dir = Vec2::X * direction.signum();
        let mut dist = HAZARD_SCAN_STEP;
        while dist <= self.config.hazard_check_distance {
            let origin = pos + step_dir * dist;
            if world
                .raycast(origin, Vec2::NEG_Y, DROP_PROBE_DEPTH, self.config.hazard_layer)
                .is_some()
            {
                return true;
            }
            dist += HAZARD_SCAN_STEP;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Collider, LAYER_GROUND, LAYER_HAZARD, LAYER_WALL, LevelGeometry};

    fn sensor() -> EnvironmentSensor {
        EnvironmentSensor::new(SensorConfig {
            ground_layer: LAYER_GROUND,
            wall_layer: LAYER_WALL,
            hazard_layer: LAYER_HAZARD,
            ..SensorConfig::default()
        })
    }

    /// Floor under the agent, wall 2 units to the right, spikes on the left
    fn fixture_world() -> LevelGeometry {
        LevelGeometry::new(vec![
            Collider::from_center_size(Vec2::new(0.0, -0.5), Vec2::new(20.0, 1.0), LAYER_GROUND),
            Collider::from_center_size(Vec2::new(2.5, 1.5), Vec2::new(1.0, 3.0), LAYER_WALL),
            Collider::from_center_size(Vec2::new(-2.0, 0.1), Vec2::new(1.0, 0.2), LAYER_HAZARD),
        ])
    }

    // Agent standing on the floor: feet at y=0, center at half height
    fn agent_pos() -> Vec2 {
        Vec2::new(0.0, AGENT_SIZE.y / 2.0)
    }

    #[test]
    fn test_grounded_on_floor() {
        let world = fixture_world();
        let sensor = sensor();
        assert!(sensor.is_grounded(&world, agent_pos()));
        assert!(!sensor.is_grounded(&world, agent_pos() + Vec2::Y * 3.0));
    }

    #[test]
    fn test_wall_ahead_only_toward_wall() {
        let world = fixture_world();
        let sensor = sensor();
        assert!(sensor.has_wall_ahead(&world, agent_pos(), 1.0));
        assert!(!sensor.has_wall_ahead(&world, agent_pos(), -1.0));
        assert!(!sensor.has_wall_ahead(&world, agent_pos(), 0.0));
    }

    #[test]
    fn test_wall_distance_and_sentinel() {
        let world = fixture_world();
        let sensor = sensor();
        let dist = sensor.wall_distance(&world, agent_pos(), 1.0);
        assert!((dist - 2.0).abs() < 1e-3);
        assert_eq!(sensor.wall_distance(&world, agent_pos(), -1.0), WALL_DISTANCE_NONE);
        assert_eq!(sensor.wall_distance(&world, agent_pos(), 0.0), WALL_DISTANCE_NONE);
    }

    #[test]
    fn test_ground_ahead_and_gap() {
        let world = LevelGeometry::new(vec![Collider::from_center_size(
            Vec2::new(0.0, -0.5),
            Vec2::new(4.0, 1.0),
            LAYER_GROUND,
        )]);
        let sensor = sensor();
        let pos = Vec2::new(0.0, AGENT_SIZE.y / 2.0);
        assert!(sensor.has_ground_ahead(&world, pos, 1.0));
        // Standing at the right edge, the probe pokes past the floor
        let edge = Vec2::new(1.8, AGENT_SIZE.y / 2.0);
        assert!(!sensor.has_ground_ahead(&world, edge, 1.0));
        assert!(sensor.has_ground_ahead(&world, edge, 0.0));
    }

    #[test]
    fn test_platform_above_height_band() {
        let sensor = sensor();
        let pos = agent_pos();
        // Ledge 3 units up: inside the (1, 6) band
        let reachable = LevelGeometry::new(vec![Collider::from_center_size(
            Vec2::new(2.0, pos.y + 3.0),
            Vec2::new(4.0, 0.4),
            LAYER_GROUND,
        )]);
        assert!(sensor.has_platform_above(&reachable, pos, 1.0));
        assert!(!sensor.has_platform_above(&reachable, pos, 0.0));

        // Ceiling 8 units up: too high to mount
        let too_high = LevelGeometry::new(vec![Collider::from_center_size(
            Vec2::new(2.0, pos.y + 8.0),
            Vec2::new(4.0, 0.4),
            LAYER_GROUND,
        )]);
        assert!(!sensor.has_platform_above(&too_high, pos, 1.0));
    }

    #[test]
    fn test_hazard_scan_finds_spikes() {
        let world = fixture_world();
        let sensor = sensor();
        assert!(sensor.has_hazard_ahead(&world, agent_pos(), -1.0));
        assert!(!sensor.has_hazard_ahead(&world, agent_pos(), 1.0));
        assert!(!sensor.has_hazard_ahead(&world, agent_pos(), 0.0));
    }

    #[test]
    fn test_unconfigured_masks_degrade_to_neutral() {
        let world = fixture_world();
        let bare = EnvironmentSensor::default();
        let pos = agent_pos();
        assert!(!bare.is_grounded(&world, pos));
        assert!(!bare.has_wall_ahead(&world, pos, 1.0));
        assert_eq!(bare.wall_distance(&world, pos, 1.0), WALL_DISTANCE_NONE);
        assert!(!bare.has_ground_ahead(&world, pos, 1.0));
        assert!(!bare.has_platform_above(&world, pos, 1.0));
        assert!(!bare.has_hazard_ahead(&world, pos, -1.0));
    }
}
