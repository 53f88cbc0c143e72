//! Tunable constants for kiwirun
//!
//! All gameplay and navigation values are defined here for easy tweaking.
//! Probe distances that look similar on purpose stay separately named:
//! each one was tuned against a different failure mode in playtesting.

use bevy::prelude::*;

// =============================================================================
// AGENT BODY
// =============================================================================

/// Agent collision box (width, height) in world units
pub const AGENT_SIZE: Vec2 = Vec2::new(0.9, 1.8);

// =============================================================================
// MOVEMENT / PHYSICS
// =============================================================================

pub const MOVE_SPEED: f32 = 5.0;
pub const AIR_CONTROL_MULTIPLIER: f32 = 0.8; // Horizontal speed retained while airborne
pub const JUMP_FORCE: f32 = 14.0; // Vertical velocity applied on jump
pub const GRAVITY: f32 = 30.0;
pub const FALL_MULTIPLIER: f32 = 2.5; // Extra gravity while falling, for a snappier arc

// =============================================================================
// GROUND / WALL / EDGE PROBES
// =============================================================================

pub const GROUND_CHECK_RADIUS: f32 = 0.2;
/// Probe rays for walls start at chest height, not at the feet
pub const WALL_PROBE_HEIGHT: f32 = 0.5;
pub const WALL_CHECK_DISTANCE: f32 = 3.5;
pub const EDGE_CHECK_DISTANCE: f32 = 1.0;
/// Downward range of the edge/hazard probes
pub const DROP_PROBE_DEPTH: f32 = 2.0;
/// Sentinel returned by the wall-distance probe when nothing is hit
pub const WALL_DISTANCE_NONE: f32 = 999.0;

// =============================================================================
// PLATFORM-ABOVE PROBE
// =============================================================================

pub const PLATFORM_CHECK_FORWARD_DIST: f32 = 2.0;
pub const PLATFORM_CHECK_UPWARD_DIST: f32 = 5.0;
/// A ledge qualifies only inside this height band above the agent
pub const PLATFORM_MIN_CLEARANCE: f32 = 1.0;
pub const PLATFORM_MAX_REACH: f32 = 6.0;

// =============================================================================
// HAZARD PROBE
// =============================================================================

pub const HAZARD_CHECK_DISTANCE: f32 = 4.0;
pub const HAZARD_SCAN_STEP: f32 = 0.5;

// =============================================================================
// JUMP / PLATFORM LOCK
// =============================================================================

pub const JUMP_COOLDOWN: f32 = 1.0;
/// Minimum run-up before firing a locked platform jump
pub const MIN_WALL_CLEARANCE: f32 = 1.8;
pub const PLATFORM_LOCK_DURATION: f32 = 3.0;
pub const VERTICAL_JUMP_THRESHOLD: f32 = 2.0;

// =============================================================================
// OBJECTIVES
// =============================================================================

pub const COLLECTION_RADIUS: f32 = 1.0;
pub const TARGET_SWITCH_TIME: f32 = 6.0;
/// Horizontal deadband before steering toward an objective
pub const DIRECTION_DEADBAND: f32 = 0.3;
/// Tighter deadband used while tracking path waypoints
pub const WAYPOINT_DEADBAND: f32 = 0.1;
pub const JUMP_UP_THRESHOLD: f32 = 0.5;
pub const JUMP_UP_VERTICAL_MIN: f32 = 1.0;
pub const DROP_DOWN_THRESHOLD: f32 = 2.0;

// =============================================================================
// ANTI-STUCK
// =============================================================================

pub const STUCK_CHECK_TIME: f32 = 2.5;
pub const STUCK_DISTANCE: f32 = 0.4;

// =============================================================================
// PATHFINDING
// =============================================================================

pub const MAX_JUMP_DISTANCE: f32 = 5.0;
pub const MAX_JUMP_HEIGHT: f32 = 4.0;
pub const PATH_UPDATE_INTERVAL: f32 = 0.5;
pub const WAYPOINT_REACHED_DISTANCE: f32 = 1.5;

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// "Long ago" initial value for cooldown timestamps so the first check passes
pub const TIMESTAMP_NEVER: f32 = -999.0;

// =============================================================================
// CONFIG FILES
// =============================================================================

pub const NAV_PROFILES_FILE: &str = "assets/nav_profiles.txt";
pub const NAV_TUNING_FILE: &str = "config/nav_tuning.json";
pub const DEFAULT_LEVEL_FILE: &str = "assets/levels/meadow.toml";
