//! Kiwirun - an autonomous platformer agent built with Bevy
//!
//! This crate provides the navigation controller, pathfinding, and
//! level simulation systems organized into modules.

// Core modules
pub mod constants;
pub mod session;
pub mod spawn;
pub mod tuning;

// Game logic modules
pub mod ai;
pub mod levels;
pub mod player;
pub mod world;

// Re-export commonly used types for convenience
pub use ai::{
    AgentInput, EnvironmentSensor, NavController, NavGraph, NavPath, NavProfile,
    NavProfileDatabase, Objective, SensorConfig, TargetSelector, agent_decision_update,
};
pub use constants::*;
pub use levels::{BlockDef, BlockLayer, LevelData};
pub use player::{
    Agent, Facing, Grounded, Velocity, apply_agent_input, apply_gravity, integrate_and_collide,
};
pub use session::{
    LevelSession, check_finish, check_hazard, collect_targets, exit_when_done, tick_session,
};
pub use spawn::{SelectedProfile, spawn_level};
pub use tuning::NavTuning;
pub use world::{
    Collectible, Collider, EntityKind, FinishFlag, LAYER_GROUND, LAYER_HAZARD, LAYER_WALL,
    LayerMask, LevelGeometry, PhysicsProbe, RayHit, SnapshotEntity, WorldSnapshot,
};
